//! WebSocket front end of the relay
//!
//! Every accepted socket gets two tasks: the inbound handler, which reads
//! frames and queues them for the opposite role, and a writer, which sends
//! whatever the dispatcher hands to the connection.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{accept_hdr_async, WebSocketStream};
use tracing::{debug, error, info, warn};

use crate::config::RelayConfig;
use crate::error::RelayError;
use crate::model::envelope;
use crate::model::payload::Payload;
use crate::model::registry::Connection;
use crate::model::role;
use crate::relay::{run_dispatcher, RelayContext};

/// Pause after a failed accept so a persistent error (e.g. out of file
/// descriptors) does not spin the loop.
const ACCEPT_RETRY_DELAY: Duration = Duration::from_millis(100);

type WsSink = SplitSink<WebSocketStream<TcpStream>, Message>;

pub struct RelayServer {
    listener: TcpListener,
    context: Arc<RelayContext>,
    config: Arc<RelayConfig>,
}

impl RelayServer {
    /// Validate `config` and bind the listening socket.
    pub async fn bind(config: RelayConfig) -> Result<RelayServer, RelayError> {
        config.validate()?;
        let listener = TcpListener::bind(config.bind_addr()).await?;

        Ok(RelayServer {
            listener,
            context: Arc::new(RelayContext::new()),
            config: Arc::new(config),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, RelayError> {
        Ok(self.listener.local_addr()?)
    }

    pub fn context(&self) -> Arc<RelayContext> {
        Arc::clone(&self.context)
    }

    /// Start the dispatcher and accept connections until the future is dropped.
    pub async fn run(self) -> Result<(), RelayError> {
        let addr = self.local_addr()?;
        info!("📡 Signaling relay listening on ws://{}", addr);

        let dispatcher = tokio::spawn(run_dispatcher(
            Arc::clone(&self.context),
            self.config.dispatch_interval,
        ));
        let _guard = AbortOnDrop(dispatcher);

        loop {
            match self.listener.accept().await {
                Ok((stream, peer_addr)) => {
                    let context = Arc::clone(&self.context);
                    let config = Arc::clone(&self.config);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, context, config).await {
                            warn!("Connection from {} ended with error: {}", peer_addr, e);
                        }
                    });
                }
                Err(e) => {
                    error!("Failed to accept connection: {}", e);
                    tokio::time::sleep(ACCEPT_RETRY_DELAY).await;
                }
            }
        }
    }
}

/// Stops the dispatcher together with the accept loop.
struct AbortOnDrop(tokio::task::JoinHandle<()>);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Inbound handler for one peer socket.
///
/// Classifies and registers the peer during the handshake, then queues each
/// frame it sends for the opposite role. Read errors end this connection
/// only; the registry entry is cleared on the way out.
pub async fn handle_connection(
    stream: TcpStream,
    context: Arc<RelayContext>,
    config: Arc<RelayConfig>,
) -> Result<(), RelayError> {
    let peer_addr = stream.peer_addr()?;

    let mut target = String::new();
    let ws_stream = accept_hdr_async(
        stream,
        |request: &Request, response: Response| -> Result<Response, ErrorResponse> {
            target = request.uri().to_string();
            Ok(response)
        },
    )
    .await?;

    let role = role::classify(&target, &config.client_id_attribute);
    let (ws_tx, mut ws_rx) = ws_stream.split();
    let (tx, rx) = mpsc::unbounded_channel();

    let connection = Connection::new(role, tx);
    let id = connection.id;
    info!(%role, connection = *id, "Peer connected from {}", peer_addr);

    let writer = tokio::spawn(write_loop(ws_tx, rx));
    let _ = context.registry.register(connection);

    let mut result = Ok(());
    while let Some(frame) = ws_rx.next().await {
        let message = match frame {
            Ok(message) => message,
            Err(e) => {
                result = Err(RelayError::from(e));
                break;
            }
        };

        if message.is_close() {
            debug!(%role, connection = *id, "Close frame received");
            break;
        }

        let Some(payload) = Payload::from_message(message) else {
            continue;
        };

        if !context.registry.is_current(role, id) {
            debug!(%role, connection = *id, "Ignoring message from evicted connection");
            continue;
        }

        let payload = if config.envelope {
            match envelope::rewrite(payload) {
                Ok(payload) => payload,
                Err(e) => {
                    warn!(%role, connection = *id, "Dropping message: {}", e);
                    continue;
                }
            }
        } else {
            payload
        };

        debug!(%role, connection = *id, bytes = payload.len(), "Queued message");
        context.enqueue_from(role, payload);
    }

    if context.registry.unregister(role, id) {
        info!(%role, connection = *id, "Peer disconnected");
    } else {
        info!(%role, connection = *id, "Evicted peer disconnected");
    }
    writer.abort();

    result
}

/// Forward everything sent to this connection onto its socket.
async fn write_loop(mut ws_tx: WsSink, mut rx: UnboundedReceiver<Payload>) {
    while let Some(payload) = rx.recv().await {
        if let Err(e) = ws_tx.send(payload.into_message()).await {
            warn!("Failed to write to peer socket: {}", e);
            break;
        }
    }
}
