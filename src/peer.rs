//! Probe peer
//!
//! A minimal signaling client for smoke-testing a relay by hand. It connects
//! as master or viewer, sends a fixed list of messages and logs whatever the
//! relay delivers back within a listening window.

use std::time::Duration;

use clap::Args;
use futures_util::{SinkExt, StreamExt};
use tokio::time::{timeout_at, Instant};
use tokio_tungstenite::connect_async;
use tracing::{info, warn};

use crate::error::RelayError;
use crate::model::payload::Payload;
use crate::model::role::DEFAULT_CLIENT_ID_ATTRIBUTE;

#[derive(Debug, Args)]
pub struct PeerArgs {
    /// Relay address
    #[arg(long, default_value = "ws://127.0.0.1:8765")]
    pub url: String,

    /// Join as a viewer with this client id; omit to join as master
    #[arg(long)]
    pub client_id: Option<String>,

    /// Query parameter that carries the client id
    #[arg(long, default_value = DEFAULT_CLIENT_ID_ATTRIBUTE)]
    pub client_id_attribute: String,

    /// Message to send after connecting, may be repeated
    #[arg(long = "send")]
    pub messages: Vec<String>,

    /// Seconds to keep listening for relayed messages
    #[arg(long, default_value_t = 5)]
    pub listen_secs: u64,
}

/// Build the connect URL, adding the client id parameter for viewers.
pub fn peer_url(base: &str, attribute: &str, client_id: Option<&str>) -> String {
    match client_id {
        None => base.to_string(),
        Some(id) => {
            let separator = if base.contains('?') { '&' } else { '?' };
            format!("{base}{separator}{attribute}={id}")
        }
    }
}

/// Connect, send, listen. Returns everything received before the window closed.
pub async fn run(args: PeerArgs) -> Result<Vec<Payload>, RelayError> {
    let url = peer_url(
        &args.url,
        &args.client_id_attribute,
        args.client_id.as_deref(),
    );
    let role = if args.client_id.is_some() { "viewer" } else { "master" };

    let (ws_stream, _) = connect_async(url.as_str()).await?;
    let (mut ws_tx, mut ws_rx) = ws_stream.split();
    info!("Connected to {} as {}", url, role);

    for message in args.messages {
        info!("📤 Sending: {}", message);
        ws_tx.send(Payload::Text(message).into_message()).await?;
    }

    let deadline = Instant::now() + Duration::from_secs(args.listen_secs);
    let mut received = vec![];

    while let Ok(frame) = timeout_at(deadline, ws_rx.next()).await {
        match frame {
            Some(Ok(message)) => {
                if let Some(payload) = Payload::from_message(message) {
                    match &payload {
                        Payload::Text(text) => info!("📥 Received: {}", text),
                        Payload::Binary(data) => info!("📥 Received {} bytes", data.len()),
                    }
                    received.push(payload);
                }
            }
            Some(Err(e)) => {
                warn!("Relay connection failed: {}", e);
                break;
            }
            None => {
                info!("Relay closed the connection");
                break;
            }
        }
    }

    let _ = ws_tx.close().await;
    Ok(received)
}
