//! Relay error types

use thiserror::Error;
use tokio_tungstenite::tungstenite;

use crate::model::registry::ConnectionId;

/// Errors that can occur while relaying signaling messages.
///
/// None of these are ever reported back to the peers; each one is handled
/// (logged and dropped) by the component that observed it.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Binding the listener or accepting a socket failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// WebSocket handshake, read or write failure
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),

    /// The writer for a connection is gone, the message was not sent
    #[error("connection {0} is closed")]
    ConnectionClosed(ConnectionId),

    /// A text message could not be rewritten into a peer event
    #[error("malformed peer request: {0}")]
    Envelope(#[from] serde_json::Error),

    /// Configuration rejected before starting
    #[error("invalid configuration: {0}")]
    Config(String),
}
