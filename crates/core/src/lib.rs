// SPDX-License-Identifier: MIT

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! gaffer-core: value types shared by the agent fleet and artifact fetch crates.
//!
//! Everything here is plain data: agent identity and heartbeat snapshots,
//! derived status, job plans, and the settings structs the server passes
//! into the components that need them.

pub mod agent;
pub mod clock;
pub mod disk_space;
pub mod job;
pub mod resources;
pub mod settings;
pub mod snapshot;
pub mod status;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use agent::{AgentIdentity, ElasticMetadata};
pub use clock::{Clock, SystemClock, TestClock};
pub use disk_space::DiskSpace;
pub use job::{ElasticProfile, JobPlan};
pub use resources::Resources;
pub use settings::{FetchSettings, FleetSettings, SettingsError};
pub use snapshot::{AgentRuntimeSnapshot, AgentRuntimeStatus, BuildingInfo};
pub use status::{AgentConfigStatus, AgentStatus};
