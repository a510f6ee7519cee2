// SPDX-License-Identifier: MIT

//! Resource-based job-to-agent matching over an immutable pool snapshot.
//!
//! A `SchedulingContext` is built once per scheduling attempt from a snapshot
//! of the fleet and never mutated; narrowing operations return new contexts.
//! It performs no I/O and never blocks, so concurrent scheduling attempts can
//! each carry their own context safely.
//!
//! There are no error cases here: an empty match result means "nothing
//! eligible yet" and the outer scheduler loop retries on its own cadence.

use gaffer_core::{AgentIdentity, Resources};
use indexmap::IndexMap;

/// Immutable matching context for one scheduling attempt.
#[derive(Debug, Clone)]
pub struct SchedulingContext {
    approved_by: String,
    agents: Vec<AgentIdentity>,
    env: IndexMap<String, String>,
    is_rerun: bool,
}

impl SchedulingContext {
    pub fn new(approved_by: impl Into<String>, agents: Vec<AgentIdentity>) -> Self {
        Self {
            approved_by: approved_by.into(),
            agents,
            env: IndexMap::new(),
            is_rerun: false,
        }
    }

    /// Enabled, non-elastic agents advertising every required label.
    ///
    /// An empty requirement matches all enabled non-elastic agents. Disabled
    /// agents never match, whatever their resources; elastic agents are
    /// placed by the plugin layer, not by resources.
    pub fn find_agents_matching(&self, required: &Resources) -> Vec<AgentIdentity> {
        self.agents
            .iter()
            .filter(|agent| {
                agent.enabled && !agent.is_elastic() && required.is_subset_of(&agent.resources)
            })
            .cloned()
            .collect()
    }

    /// New context with `vars` layered on top of the existing mapping;
    /// incoming values win on key collision (last-applied-wins).
    pub fn override_environment_variables<I>(&self, vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut next = self.clone();
        for (key, value) in vars {
            next.env.insert(key, value);
        }
        next
    }

    /// New context scoped to exactly one agent uuid.
    ///
    /// Used for job reruns, which may only consider the agent that ran the
    /// original job. An unknown uuid yields an empty pool — the scheduler
    /// treats that as "nothing eligible" and retries, rather than silently
    /// widening back to the whole fleet.
    pub fn permitted_agent(&self, uuid: &str) -> Self {
        let mut next = self.clone();
        next.agents.retain(|agent| agent.uuid == uuid);
        next
    }

    /// New context flagged as a rerun; pool, approver and variables carry
    /// over unchanged.
    pub fn rerun_context(&self) -> Self {
        let mut next = self.clone();
        next.is_rerun = true;
        next
    }

    pub fn approved_by(&self) -> &str {
        &self.approved_by
    }

    pub fn agents(&self) -> &[AgentIdentity] {
        &self.agents
    }

    pub fn environment_variables(&self) -> &IndexMap<String, String> {
        &self.env
    }

    pub fn is_rerun(&self) -> bool {
        self.is_rerun
    }
}

#[cfg(test)]
#[path = "matcher_tests.rs"]
mod tests;
