//! Network layer: accept loop and per-connection tasks.

mod connection;
mod gateway;
mod throttle;

pub use connection::Connection;
pub use gateway::{wait_closed, Gateway};
pub use throttle::Throttle;
