use http::Uri;
use http::uri::Scheme;
use transit_core::{Result, validation};

/// Derive the live update endpoint from the page origin.
///
/// `http` maps to `ws` and `https` to `wss`; host and port are kept and the
/// origin's own path is replaced by `path`.
///
/// # Errors
///
/// Returns a validation error when the origin is not an absolute `http` or
/// `https` URI, or when `path` is not a valid URI path.
pub fn live_endpoint(origin: &str, path: &str) -> Result<String> {
    let uri: Uri =
        origin.parse().map_err(|err| validation!("invalid origin `{origin}`: {err}"))?;

    let scheme = match uri.scheme() {
        Some(scheme) if *scheme == Scheme::HTTP => "ws",
        Some(scheme) if *scheme == Scheme::HTTPS => "wss",
        Some(scheme) => return Err(validation!("unsupported origin scheme `{scheme}`")),
        None => return Err(validation!("origin `{origin}` has no scheme")),
    };
    let Some(authority) = uri.authority() else {
        return Err(validation!("origin `{origin}` has no host"));
    };

    let path = if path.starts_with('/') { path.to_string() } else { format!("/{path}") };
    let endpoint = Uri::builder()
        .scheme(scheme)
        .authority(authority.as_str())
        .path_and_query(path.as_str())
        .build()
        .map_err(|err| validation!("invalid live path `{path}`: {err}"))?;

    Ok(endpoint.to_string())
}
