// SPDX-License-Identifier: MIT

//! Builders for tests in this crate and downstream crates.
//!
//! Gated behind the `test-support` feature so release builds never carry
//! them.

use crate::agent::AgentIdentity;
use crate::job::JobPlan;
use crate::resources::Resources;
use crate::snapshot::{AgentRuntimeSnapshot, AgentRuntimeStatus, BuildingInfo};

pub const DEFAULT_UUID: &str = "uuid2";
pub const DEFAULT_HOSTNAME: &str = "CCeDev01";
pub const DEFAULT_IP: &str = "10.18.5.1";

/// An enabled, non-elastic identity with the default coordinates.
pub fn identity() -> AgentIdentity {
    AgentIdentity::new(DEFAULT_UUID, DEFAULT_HOSTNAME, DEFAULT_IP)
}

pub fn identity_with_resources(list: &str) -> AgentIdentity {
    identity().with_resources(Resources::parse(list))
}

pub fn elastic_identity() -> AgentIdentity {
    identity().with_elastic("i-123456", "com.example.aws")
}

/// An idle heartbeat for the default identity.
pub fn idle_snapshot() -> AgentRuntimeSnapshot {
    AgentRuntimeSnapshot::new(DEFAULT_UUID, AgentRuntimeStatus::Idle).with_cookie("cookie")
}

/// A building heartbeat carrying the default building info.
pub fn building_snapshot() -> AgentRuntimeSnapshot {
    let mut snapshot = idle_snapshot();
    snapshot.busy(default_building_info());
    snapshot
}

/// A heartbeat reporting a cancelled build, building info preserved.
pub fn cancelled_snapshot() -> AgentRuntimeSnapshot {
    let mut snapshot = building_snapshot();
    snapshot.cancel();
    snapshot
}

pub fn default_building_info() -> BuildingInfo {
    BuildingInfo::new("running pipeline/stage/build", "buildLocator")
}

/// A plan requiring the given comma-separated resources.
pub fn plan(pipeline: &str, resources: &str) -> JobPlan {
    JobPlan::new(pipeline, "stage1", "job1").with_resources(resources)
}
