// SPDX-License-Identifier: MIT

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! gaffer-fleet: agent lifecycle tracking and job-to-agent scheduling.
//!
//! One `AgentInstance` per agent uuid owns that agent's identity and latest
//! heartbeat snapshot and applies the lifecycle transition rules. The
//! `AgentRegistry` routes heartbeats and config syncs to instances and runs
//! the lost-contact sweep. `SchedulingContext` matches resolved job plans
//! against an immutable snapshot of the pool.
//!
//! Locking model: each instance has its own mutex; heartbeats for different
//! agents never contend. Status events are queued while the lock is held and
//! published after release, so a listener can touch agent state without
//! deadlocking.

pub mod events;
pub mod instance;
pub mod matcher;
pub mod registry;

pub use events::{AgentStatusEvent, StatusFeed};
pub use instance::{AgentInstance, AgentKind};
pub use matcher::SchedulingContext;
pub use registry::AgentRegistry;
