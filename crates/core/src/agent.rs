// SPDX-License-Identifier: MIT

//! Agent identity records.
//!
//! `AgentIdentity` is the authoritative registration record for one agent:
//! stable identity (uuid), network coordinates, advertised resources, and the
//! enabled/disabled flag toggled by operators. Mutation always goes through
//! the owning `AgentInstance`; the identity itself carries no locking.

use crate::resources::Resources;
use serde::{Deserialize, Serialize};

/// Registration record for a single agent, keyed by uuid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentIdentity {
    /// Stable identity; never changes for the lifetime of the agent.
    pub uuid: String,
    pub hostname: String,
    pub ip_address: String,
    /// Resource labels this agent advertises.
    #[serde(default)]
    pub resources: Resources,
    /// Present iff the agent was provisioned by an elastic-agent plugin.
    /// Carrying both ids in one struct keeps the both-or-neither invariant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elastic: Option<ElasticMetadata>,
    /// False when an operator has denied the agent. A disabled agent keeps
    /// reporting heartbeats but is never assigned work.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

/// Provenance of an elastic (plugin-provisioned) agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElasticMetadata {
    /// Plugin-assigned instance id (e.g. an EC2 instance id).
    pub agent_id: String,
    /// Id of the plugin that provisioned the agent.
    pub plugin_id: String,
}

impl AgentIdentity {
    pub fn new(
        uuid: impl Into<String>,
        hostname: impl Into<String>,
        ip_address: impl Into<String>,
    ) -> Self {
        Self {
            uuid: uuid.into(),
            hostname: hostname.into(),
            ip_address: ip_address.into(),
            resources: Resources::new(),
            elastic: None,
            enabled: true,
        }
    }

    pub fn with_resources(mut self, resources: Resources) -> Self {
        self.resources = resources;
        self
    }

    pub fn with_elastic(mut self, agent_id: impl Into<String>, plugin_id: impl Into<String>) -> Self {
        self.elastic = Some(ElasticMetadata {
            agent_id: agent_id.into(),
            plugin_id: plugin_id.into(),
        });
        self
    }

    pub fn is_elastic(&self) -> bool {
        self.elastic.is_some()
    }

    pub fn enable(&mut self) {
        self.enabled = true;
    }

    pub fn disable(&mut self) {
        self.enabled = false;
    }
}

#[cfg(test)]
#[path = "agent_tests.rs"]
mod tests;
