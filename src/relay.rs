//! Relay context and dispatcher
//!
//! [`RelayContext`] owns everything the relay shares between tasks: the
//! connection registry and one queue per direction. It is built once at
//! startup and handed to every connection task and to the dispatcher.
//!
//! The dispatcher drains each queue once per tick and forwards the drained
//! messages to whoever currently holds the receiving role. Messages drained
//! while nobody holds that role are discarded: delivery is best effort and
//! only guaranteed while the receiving peer is connected.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::model::payload::Payload;
use crate::model::queue::DirectionalQueue;
use crate::model::registry::ConnectionRegistry;
use crate::model::role::Role;

#[derive(Debug, Default)]
pub struct RelayContext {
    pub registry: ConnectionRegistry,
    to_master: DirectionalQueue,
    to_viewer: DirectionalQueue,
}

/// What happened to the messages drained for one destination in one tick.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FlushOutcome {
    pub delivered: usize,
    /// Drained while no connection held the destination role.
    pub discarded: usize,
    /// The destination's writer went away mid-flush.
    pub failed: usize,
}

impl FlushOutcome {
    pub fn drained(&self) -> usize {
        self.delivered + self.discarded + self.failed
    }
}

/// Outcome of a full dispatch tick, one entry per direction.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DispatchReport {
    pub to_viewer: FlushOutcome,
    pub to_master: FlushOutcome,
}

impl RelayContext {
    pub fn new() -> RelayContext {
        RelayContext::default()
    }

    /// The queue holding messages waiting for `destination`.
    pub fn queue_for(&self, destination: Role) -> &DirectionalQueue {
        match destination {
            Role::Master => &self.to_master,
            Role::Viewer => &self.to_viewer,
        }
    }

    /// Queue a message sent by `sender` for the opposite role.
    pub fn enqueue_from(&self, sender: Role, payload: Payload) {
        self.queue_for(sender.opposite()).enqueue(payload);
    }

    /// Drain the queue for `destination` and send it on.
    ///
    /// The registry lock is released before the first send.
    pub fn flush(&self, destination: Role) -> FlushOutcome {
        let pending = self.queue_for(destination).drain();
        let mut outcome = FlushOutcome::default();

        if pending.is_empty() {
            return outcome;
        }

        let Some(connection) = self.registry.get(destination) else {
            outcome.discarded = pending.len();
            debug!(
                role = %destination,
                discarded = outcome.discarded,
                "No connection registered, discarding drained messages"
            );
            return outcome;
        };

        for payload in pending {
            match connection.send(payload) {
                Ok(()) => outcome.delivered += 1,
                Err(e) => {
                    outcome.failed += 1;
                    warn!(role = %destination, "Dropping message: {}", e);
                }
            }
        }

        outcome
    }

    /// One dispatch tick: master-originated messages first, then viewer-originated.
    pub fn dispatch_once(&self) -> DispatchReport {
        DispatchReport {
            to_viewer: self.flush(Role::Viewer),
            to_master: self.flush(Role::Master),
        }
    }
}

/// Run the dispatcher until the task is dropped or aborted.
pub async fn run_dispatcher(context: Arc<RelayContext>, period: Duration) {
    info!("Dispatcher running every {:?}", period);

    let mut ticker = time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        let report = context.dispatch_once();
        if report.to_viewer.drained() > 0 || report.to_master.drained() > 0 {
            debug!(
                to_viewer = report.to_viewer.delivered,
                to_master = report.to_master.delivered,
                discarded = report.to_viewer.discarded + report.to_master.discarded,
                failed = report.to_viewer.failed + report.to_master.failed,
                "Dispatch tick"
            );
        }
    }
}
