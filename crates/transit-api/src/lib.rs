//! # Transit API
//!
//! Typed access to the transit backend: stops, routes, alternative routes,
//! coverage analysis and system statistics.

mod config;
mod envelope;
mod models;
mod repository;

pub use self::config::{Endpoints, RepositoryConfig};
pub use self::models::*;
pub use self::repository::Repository;
