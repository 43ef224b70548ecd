//! Relay configuration.

use std::time::Duration;

use clap::Args;
use serde::{Deserialize, Serialize};

use crate::error::RelayError;
use crate::model::role::DEFAULT_CLIENT_ID_ATTRIBUTE;

/// Settings for one relay instance.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Host to bind (default `"127.0.0.1"`).
    pub host: String,
    /// Port to bind (default `8765`, `0` for auto-assign).
    pub port: u16,
    /// Time between two dispatch ticks.
    pub dispatch_interval: Duration,
    /// Query parameter that marks a viewer connection.
    pub client_id_attribute: String,
    /// Rewrite peer requests into peer events before relaying.
    pub envelope: bool,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8765,
            dispatch_interval: Duration::from_millis(1000),
            client_id_attribute: DEFAULT_CLIENT_ID_ATTRIBUTE.into(),
            envelope: false,
        }
    }
}

impl RelayConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn validate(&self) -> Result<(), RelayError> {
        if self.dispatch_interval.is_zero() {
            return Err(RelayError::Config(
                "dispatch interval must be greater than zero".into(),
            ));
        }
        if self.client_id_attribute.is_empty() {
            return Err(RelayError::Config(
                "client id attribute must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Command line flags for `signaling-relay server`.
#[derive(Debug, Args)]
pub struct ServerArgs {
    /// Address to listen on
    #[arg(long, env = "RELAY_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on, 0 picks a free one
    #[arg(long, env = "RELAY_PORT", default_value_t = 8765)]
    pub port: u16,

    /// Milliseconds between dispatch ticks
    #[arg(long, env = "RELAY_DISPATCH_INTERVAL_MS", default_value_t = 1000)]
    pub dispatch_interval_ms: u64,

    /// Query parameter that identifies viewer connections
    #[arg(long, env = "RELAY_CLIENT_ID_ATTRIBUTE", default_value = DEFAULT_CLIENT_ID_ATTRIBUTE)]
    pub client_id_attribute: String,

    /// Rewrite peer requests into peer events
    #[arg(long, env = "RELAY_ENVELOPE")]
    pub envelope: bool,
}

impl From<ServerArgs> for RelayConfig {
    fn from(args: ServerArgs) -> Self {
        Self {
            host: args.host,
            port: args.port,
            dispatch_interval: Duration::from_millis(args.dispatch_interval_ms),
            client_id_attribute: args.client_id_attribute,
            envelope: args.envelope,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = RelayConfig::default();
        assert_eq!(cfg.host, "127.0.0.1");
        assert_eq!(cfg.port, 8765);
        assert_eq!(cfg.dispatch_interval, Duration::from_secs(1));
        assert_eq!(cfg.client_id_attribute, "X-Amz-ClientId");
        assert!(!cfg.envelope);
        assert_eq!(cfg.bind_addr(), "127.0.0.1:8765");
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn zero_interval_is_rejected() {
        let cfg = RelayConfig {
            dispatch_interval: Duration::ZERO,
            ..RelayConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(RelayError::Config(_))));
    }

    #[test]
    fn empty_attribute_is_rejected() {
        let cfg = RelayConfig {
            client_id_attribute: String::new(),
            ..RelayConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(RelayError::Config(_))));
    }

    #[test]
    fn args_convert_to_config() {
        let args = ServerArgs {
            host: "0.0.0.0".into(),
            port: 0,
            dispatch_interval_ms: 2000,
            client_id_attribute: "peer".into(),
            envelope: true,
        };
        let cfg = RelayConfig::from(args);
        assert_eq!(cfg.bind_addr(), "0.0.0.0:0");
        assert_eq!(cfg.dispatch_interval, Duration::from_secs(2));
        assert_eq!(cfg.client_id_attribute, "peer");
        assert!(cfg.envelope);
    }

    #[test]
    fn serde_roundtrip() {
        let cfg = RelayConfig::default();
        let json = serde_json::to_string(&cfg).unwrap();
        let back: RelayConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.host, cfg.host);
        assert_eq!(back.dispatch_interval, cfg.dispatch_interval);
    }
}
