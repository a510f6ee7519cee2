// SPDX-License-Identifier: MIT

//! Fleet-wide agent registry.
//!
//! Routes heartbeats and config syncs to per-uuid `AgentInstance`s and runs
//! the periodic lost-contact sweep. The map lock is held only to look up or
//! insert instances, never across an instance operation, so heartbeat
//! ingestion for different agents proceeds in parallel.

use crate::events::StatusFeed;
use crate::instance::{AgentInstance, AgentKind};
use gaffer_core::{
    AgentIdentity, AgentRuntimeSnapshot, Clock, FleetSettings, JobPlan, SystemClock,
};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

pub struct AgentRegistry<C: Clock = SystemClock> {
    settings: FleetSettings,
    clock: C,
    feed: StatusFeed,
    agents: RwLock<HashMap<String, Arc<AgentInstance<C>>>>,
}

impl<C: Clock> AgentRegistry<C> {
    pub fn new(settings: FleetSettings, clock: C, feed: StatusFeed) -> Self {
        Self {
            settings,
            clock,
            feed,
            agents: RwLock::new(HashMap::new()),
        }
    }

    pub fn get(&self, uuid: &str) -> Option<Arc<AgentInstance<C>>> {
        self.agents.read().get(uuid).cloned()
    }

    pub fn len(&self) -> usize {
        self.agents.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.read().is_empty()
    }

    /// Route one heartbeat to its instance, registering an unknown uuid as a
    /// pending live agent first.
    pub fn heartbeat(&self, snapshot: AgentRuntimeSnapshot) {
        let instance = self.get_or_register(snapshot.clone(), AgentKind::Remote);
        instance.update(snapshot);
    }

    /// Register an agent that announced itself directly (local agents are
    /// auto-approved, remote ones stay pending).
    pub fn register_live(
        &self,
        snapshot: AgentRuntimeSnapshot,
        kind: AgentKind,
    ) -> Arc<AgentInstance<C>> {
        self.get_or_register(snapshot, kind)
    }

    fn get_or_register(
        &self,
        snapshot: AgentRuntimeSnapshot,
        kind: AgentKind,
    ) -> Arc<AgentInstance<C>> {
        if let Some(existing) = self.get(&snapshot.uuid) {
            return existing;
        }
        let mut agents = self.agents.write();
        // Re-check under the write lock; a concurrent heartbeat may have won.
        if let Some(existing) = agents.get(&snapshot.uuid) {
            return existing.clone();
        }
        tracing::info!(uuid = %snapshot.uuid, "registering live agent");
        let instance = Arc::new(AgentInstance::from_live(
            snapshot.clone(),
            kind,
            self.settings.clone(),
            self.clock.clone(),
            self.feed.clone(),
        ));
        agents.insert(snapshot.uuid, instance.clone());
        instance
    }

    /// Reconcile the fleet against the authoritative registry records.
    ///
    /// Known uuids get their identity synced; new uuids appear as Missing
    /// instances awaiting first contact; registered instances absent from the
    /// records are deregistered. Pending live agents are kept — they were
    /// never in the records to begin with.
    pub fn sync_from_config(&self, records: &[AgentIdentity]) {
        for record in records {
            if let Some(instance) = self.get(&record.uuid) {
                instance.sync_identity(record);
            } else {
                let instance = Arc::new(AgentInstance::from_registry(
                    record.clone(),
                    AgentKind::Remote,
                    self.settings.clone(),
                    self.clock.clone(),
                    self.feed.clone(),
                ));
                self.agents.write().insert(record.uuid.clone(), instance);
            }
        }

        let keep: Vec<String> = records.iter().map(|r| r.uuid.clone()).collect();
        let removed: Vec<Arc<AgentInstance<C>>> = {
            let mut agents = self.agents.write();
            let stale: Vec<String> = agents
                .iter()
                .filter(|(uuid, instance)| !keep.contains(uuid) && instance.is_registered())
                .map(|(uuid, _)| uuid.clone())
                .collect();
            stale.iter().filter_map(|uuid| agents.remove(uuid)).collect()
        };
        for instance in removed {
            tracing::info!(uuid = %instance.uuid(), "deregistered agent removed from fleet");
        }
    }

    /// Lost-contact sweep; called on the server's liveness cadence.
    pub fn refresh_all(&self) {
        for instance in self.instances() {
            instance.refresh();
        }
    }

    pub fn enable(&self, uuid: &str) -> bool {
        match self.get(uuid) {
            Some(instance) => {
                instance.enable();
                true
            }
            None => false,
        }
    }

    pub fn deny(&self, uuid: &str) -> bool {
        match self.get(uuid) {
            Some(instance) => {
                instance.deny();
                true
            }
            None => false,
        }
    }

    pub fn assign_cookie(&self, uuid: &str) -> Option<String> {
        self.get(uuid).map(|instance| instance.assign_cookie())
    }

    /// Identity snapshot of the whole fleet, for building a
    /// `SchedulingContext`.
    pub fn identities(&self) -> Vec<AgentIdentity> {
        self.instances().iter().map(|i| i.identity()).collect()
    }

    /// Instances in display order (by hostname, case-sensitive).
    pub fn sorted(&self) -> Vec<Arc<AgentInstance<C>>> {
        let mut instances = self.instances();
        instances.sort_by_key(|instance| instance.hostname());
        instances
    }

    /// First (agent uuid, plan) pairing across the fleet, walking agents in
    /// display order and plans in list order.
    pub fn find_first_matching(&self, plans: &[JobPlan]) -> Option<(String, JobPlan)> {
        for instance in self.sorted() {
            if let Some(plan) = instance.first_matching(plans) {
                return Some((instance.uuid(), plan.clone()));
            }
        }
        None
    }

    fn instances(&self) -> Vec<Arc<AgentInstance<C>>> {
        self.agents.read().values().cloned().collect()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
