//! Loads the transit map once and prints its geometry as GeoJSON, or
//! follows the backend's live route updates with `watch`.
//!
//! ```text
//! transit-map
//! transit-map route <origin> <destination>
//! transit-map coverage <area>
//! transit-map watch
//! ```

use std::sync::Arc;

use anyhow::{Result, bail};
use live_channel::LiveChannel;
use tracing::{error, info, warn};
use transit_api::Repository;
use transit_map::{Config, HttpClient, MapSession, WsConnector, telemetry};
use view_model::ViewModelStore;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    telemetry::init()?;

    let config = Config::from_env();
    info!(base_url = %config.repository.base_url, "starting transit map");

    let http = HttpClient::new(config.repository.timeout)?;
    let repository = Repository::new(Arc::new(http), config.repository);
    let session = MapSession::new(repository, ViewModelStore::new(config.store));

    session.mount().await;

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        [] => {}
        ["route", origin, destination] => {
            session.query_alternatives(origin, destination).await;
        }
        ["coverage", area] => {
            session.query_coverage(area).await;
        }
        ["watch"] => {
            let mut channel =
                LiveChannel::new(Arc::new(WsConnector), session.store().clone(), &config.channel)?;
            channel.connect().await?;
            info!(endpoint = %channel.endpoint(), "watching live updates");

            tokio::select! {
                () = channel.run() => warn!("live channel closed"),
                _ = tokio::signal::ctrl_c() => info!("interrupted"),
            }
            channel.teardown().await?;
        }
        _ => bail!("usage: transit-map [route <origin> <destination> | coverage <area> | watch]"),
    }

    let snapshot = session.snapshot();
    for (kind, err) in snapshot.failures() {
        error!(%kind, error = %err, "resource unavailable");
    }
    if let Some(stats) = snapshot.stats.value() {
        info!(
            areas = stats.total_areas,
            stops = stats.total_stops,
            routes = stats.total_routes,
            capacity = stats.total_capacity,
            "system stats"
        );
    }
    if let Some(analysis) = snapshot.coverage.value() {
        info!(area = %analysis.area_id, flow = analysis.flow, capacity = analysis.capacity, "coverage");
    }

    println!("{}", serde_json::to_string_pretty(&snapshot.geometry().to_feature_collection())?);

    session.unmount();
    Ok(())
}
