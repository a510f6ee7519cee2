// SPDX-License-Identifier: MIT

//! Outbound status-change events.
//!
//! Instances publish onto an unbounded channel instead of invoking listeners
//! directly: the publish happens after the instance lock is released, so a
//! consumer that reads agent state back cannot deadlock.

use gaffer_core::{AgentRuntimeStatus, AgentStatus};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// One observable change to an agent's status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentStatusEvent {
    pub uuid: String,
    pub status: AgentStatus,
    pub runtime_status: AgentRuntimeStatus,
    pub at_ms: u64,
}

/// Sender half every instance publishes into.
///
/// Cloneable; a `sink()` feed drops events for callers that don't observe
/// changes (tests, one-shot tools).
#[derive(Debug, Clone)]
pub struct StatusFeed {
    tx: Option<mpsc::UnboundedSender<AgentStatusEvent>>,
}

impl StatusFeed {
    /// Feed + receiver pair for consumers that watch the fleet.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<AgentStatusEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx: Some(tx) }, rx)
    }

    /// Feed that discards every event.
    pub fn sink() -> Self {
        Self { tx: None }
    }

    pub fn publish(&self, event: AgentStatusEvent) {
        if let Some(tx) = &self.tx {
            if tx.send(event).is_err() {
                // Receiver gone; status events are advisory.
                tracing::debug!("status feed receiver dropped, discarding event");
            }
        }
    }
}

#[cfg(test)]
#[path = "events_tests.rs"]
mod tests;
