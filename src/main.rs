use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;

use signaling_relay::config::ServerArgs;
use signaling_relay::peer::{self, PeerArgs};
use signaling_relay::util::init_log;
use signaling_relay::{RelayConfig, RelayServer};

/// Signaling relay for WebRTC SDK integration tests
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Start the relay
    Server(ServerArgs),
    /// Connect a probe peer to a running relay
    Peer(PeerArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    init_log();

    match Cli::parse().command {
        Command::Server(args) => {
            let server = RelayServer::bind(RelayConfig::from(args)).await?;
            tokio::select! {
                result = server.run() => result?,
                _ = tokio::signal::ctrl_c() => info!("Shutting down, pending messages are dropped"),
            }
        }
        Command::Peer(args) => {
            let received = peer::run(args).await?;
            info!("Peer finished, {} message(s) received", received.len());
        }
    }

    Ok(())
}
