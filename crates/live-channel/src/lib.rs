//! # Live Channel
//!
//! Push updates from the transit backend. Inbound messages are parsed into
//! view model deltas and merged into the store as they arrive.

mod channel;
mod endpoint;
mod message;

pub use self::channel::{ChannelConfig, ChannelState, LiveChannel};
pub use self::endpoint::live_endpoint;
pub use self::message::{RouteStatusUpdate, parse_message};
