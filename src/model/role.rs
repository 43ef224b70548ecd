//! Role classification
//!
//! A signaling session has exactly one master and one viewer. Viewers join
//! with a client identifier in the handshake query string while the master
//! connects without one, so the presence of that parameter is the only
//! signal needed to tell them apart.

use std::fmt;

/// Query parameter carried by viewer connections.
pub const DEFAULT_CLIENT_ID_ATTRIBUTE: &str = "X-Amz-ClientId";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Master,
    Viewer,
}

impl Role {
    /// The role on the other end of the session.
    pub fn opposite(self) -> Role {
        match self {
            Role::Master => Role::Viewer,
            Role::Viewer => Role::Master,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Master => f.write_str("master"),
            Role::Viewer => f.write_str("viewer"),
        }
    }
}

/// Classify a connection from its handshake request target.
///
/// `target` is the path and query of the upgrade request, e.g.
/// `/?X-Amz-ChannelARN=arn&X-Amz-ClientId=viewer-1`. A query parameter whose
/// name equals `attribute` marks a viewer, with or without a value. Anything
/// else is the master.
///
/// This is stricter than a plain substring search of the target: the name
/// showing up in the path or as another parameter's value does not make a
/// viewer.
pub fn classify(target: &str, attribute: &str) -> Role {
    let Some((_, query)) = target.split_once('?') else {
        return Role::Master;
    };

    let has_attribute = query
        .split('&')
        .map(|pair| pair.split_once('=').map_or(pair, |(name, _)| name))
        .any(|name| name == attribute);

    if has_attribute {
        Role::Viewer
    } else {
        Role::Master
    }
}
