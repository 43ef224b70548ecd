//! Data models for the signaling relay
//!
//! Roles, the per-direction queues, the connection registry and the
//! payloads that flow between them.

pub mod envelope;
pub mod payload;
pub mod queue;
pub mod registry;
pub mod role;
