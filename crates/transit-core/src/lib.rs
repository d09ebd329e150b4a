//! # Transit Core
//!
//! Error taxonomy and host provider interfaces shared by the transit map
//! client crates.

mod error;
mod provider;

pub use crate::error::*;
pub use crate::provider::*;
