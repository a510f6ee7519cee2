// SPDX-License-Identifier: MIT

//! Derived agent status and the registration axis it folds in.

use crate::snapshot::AgentRuntimeStatus;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Registration state of an agent, orthogonal to what it is doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgentConfigStatus {
    /// Self-registered, awaiting operator approval.
    Pending,
    Enabled,
    Disabled,
}

/// Composite status shown to operators, derived from config + runtime state.
///
/// Never stored; recomputed from `AgentConfigStatus` and
/// `AgentRuntimeStatus`. The variant order below is the display sort order
/// (problem states first) and carries no transition meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AgentStatus {
    Pending,
    LostContact,
    Missing,
    Building,
    Cancelled,
    Idle,
    Disabled,
}

impl AgentStatus {
    /// Fold config and runtime state into the displayed status. Config state
    /// wins: a pending or disabled agent shows as such no matter what its
    /// runtime status says.
    pub fn derive(config: AgentConfigStatus, runtime: AgentRuntimeStatus) -> Self {
        match config {
            AgentConfigStatus::Pending => AgentStatus::Pending,
            AgentConfigStatus::Disabled => AgentStatus::Disabled,
            AgentConfigStatus::Enabled => match runtime {
                AgentRuntimeStatus::Idle => AgentStatus::Idle,
                AgentRuntimeStatus::Building => AgentStatus::Building,
                AgentRuntimeStatus::Cancelled => AgentStatus::Cancelled,
                AgentRuntimeStatus::LostContact => AgentStatus::LostContact,
                AgentRuntimeStatus::Missing | AgentRuntimeStatus::Unknown => AgentStatus::Missing,
            },
        }
    }
}

impl fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AgentStatus::Pending => "pending",
            AgentStatus::LostContact => "lost contact",
            AgentStatus::Missing => "missing",
            AgentStatus::Building => "building",
            AgentStatus::Cancelled => "cancelled",
            AgentStatus::Idle => "idle",
            AgentStatus::Disabled => "disabled",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
