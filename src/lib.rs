//! # Transit Map
//!
//! Wires the transit repository, view model store and live channel into a
//! map session, with the host HTTP transport and configuration.

mod config;
mod provider;
mod session;
pub mod telemetry;

pub use self::config::Config;
pub use self::provider::{HttpClient, WsConnector};
pub use self::session::MapSession;
