//! Local stand-in for a hosted WebRTC signaling data plane.
//!
//! Relays signaling messages between one master and one viewer so SDK
//! integration tests can run their signaling paths against a deterministic
//! local service.

pub mod config;
pub mod error;
pub mod model;
pub mod peer;
pub mod relay;
pub mod server;
pub mod util;

pub use config::RelayConfig;
pub use error::RelayError;
pub use relay::RelayContext;
pub use server::RelayServer;
