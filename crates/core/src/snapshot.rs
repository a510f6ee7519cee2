// SPDX-License-Identifier: MIT

//! Heartbeat snapshots reported by running agents.
//!
//! An agent periodically pushes an `AgentRuntimeSnapshot` to the server. The
//! snapshot is replaced wholesale on every heartbeat; the only in-place
//! mutation the server side performs is through the `idle`/`busy`/`cancel`
//! transition helpers, which maintain the building-info invariant.

use serde::{Deserialize, Serialize};
use std::fmt;

/// What the agent itself reports it is doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgentRuntimeStatus {
    Unknown,
    Idle,
    Building,
    Cancelled,
    LostContact,
    Missing,
}

impl fmt::Display for AgentRuntimeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Unknown => "unknown",
            Self::Idle => "idle",
            Self::Building => "building",
            Self::Cancelled => "cancelled",
            Self::LostContact => "lost contact",
            Self::Missing => "missing",
        };
        write!(f, "{}", s)
    }
}

/// The job an agent is currently running, for display and cancel reporting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildingInfo {
    /// Human-readable description ("running pipeline/stage/build").
    pub description: String,
    /// Locator of the build being run ("pipeline/1/stage/1/job").
    pub build_locator: String,
}

impl BuildingInfo {
    /// Sentinel for "not running anything". Invariant: a snapshot carries
    /// this value unless its status is Building or Cancelled.
    pub const NOT_BUILDING: BuildingInfo = BuildingInfo {
        description: String::new(),
        build_locator: String::new(),
    };

    pub fn new(description: impl Into<String>, build_locator: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            build_locator: build_locator.into(),
        }
    }

    pub fn is_building(&self) -> bool {
        *self != Self::NOT_BUILDING
    }
}

/// Point-in-time report from a running agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentRuntimeSnapshot {
    /// Uuid of the reporting agent.
    pub uuid: String,
    pub status: AgentRuntimeStatus,
    #[serde(default)]
    pub building_info: BuildingInfo,
    /// Free disk space on the agent, in bytes. None = not reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usable_space: Option<u64>,
    /// Address the heartbeat arrived from; reconciled into the identity for
    /// registered agents (machines move networks).
    #[serde(default)]
    pub ip_address: String,
    /// Install location of the agent process.
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub operating_system: String,
    /// Opaque session token assigned by the server; a changed cookie means
    /// the agent process restarted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cookie: Option<String>,
    /// Epoch ms the server last heard from this agent. None = never.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_heard_ms: Option<u64>,
}

impl AgentRuntimeSnapshot {
    pub fn new(uuid: impl Into<String>, status: AgentRuntimeStatus) -> Self {
        Self {
            uuid: uuid.into(),
            status,
            building_info: BuildingInfo::NOT_BUILDING,
            usable_space: None,
            ip_address: String::new(),
            location: String::new(),
            operating_system: String::new(),
            cookie: None,
            last_heard_ms: None,
        }
    }

    pub fn with_cookie(mut self, cookie: impl Into<String>) -> Self {
        self.cookie = Some(cookie.into());
        self
    }

    pub fn with_usable_space(mut self, bytes: u64) -> Self {
        self.usable_space = Some(bytes);
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn with_ip_address(mut self, ip: impl Into<String>) -> Self {
        self.ip_address = ip.into();
        self
    }

    /// Clear building state and report Idle.
    pub fn idle(&mut self) {
        self.status = AgentRuntimeStatus::Idle;
        self.building_info = BuildingInfo::NOT_BUILDING;
    }

    /// Report Building with the given info.
    pub fn busy(&mut self, info: BuildingInfo) {
        self.status = AgentRuntimeStatus::Building;
        self.building_info = info;
    }

    /// Report Cancelled, keeping the building info so callers can show what
    /// was cancelled.
    pub fn cancel(&mut self) {
        self.status = AgentRuntimeStatus::Cancelled;
    }

    pub fn is_cancelled(&self) -> bool {
        self.status == AgentRuntimeStatus::Cancelled
    }
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;
