// SPDX-License-Identifier: MIT

//! Per-agent status machine.
//!
//! One `AgentInstance` owns one agent's identity and latest heartbeat
//! snapshot and applies every lifecycle transition. All state sits behind a
//! per-instance mutex; the registry never takes a lock across agents, so a
//! slow heartbeat for one agent cannot stall the rest of the fleet.
//!
//! Two transition rules here are deliberate special cases and must not be
//! "simplified":
//!
//! * Cancellation is sticky across a stale heartbeat: a cancel issued on the
//!   server survives one delayed building report and is only cleared by an
//!   explicit idle report from the agent.
//! * Re-approving an agent does not make it Idle. A never-approved (Pending)
//!   agent becomes Idle on its first config sync, because the live snapshot
//!   that created it is current; any previously approved agent keeps its
//!   runtime status and shows Missing until the next heartbeat.

use crate::events::{AgentStatusEvent, StatusFeed};
use gaffer_core::{
    AgentConfigStatus, AgentIdentity, AgentRuntimeSnapshot, AgentRuntimeStatus, AgentStatus,
    BuildingInfo, Clock, DiskSpace, FleetSettings, JobPlan, SystemClock,
};
use parking_lot::Mutex;

/// How the agent reached the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentKind {
    /// Runs on the server host; auto-approved on registration.
    Local,
    Remote,
}

struct Inner {
    identity: AgentIdentity,
    config_status: AgentConfigStatus,
    snapshot: AgentRuntimeSnapshot,
    /// Server-recorded session cookie; a heartbeat carrying a different one
    /// came from a restarted agent process.
    cookie: Option<String>,
}

impl Inner {
    fn status(&self) -> AgentStatus {
        AgentStatus::derive(self.config_status, self.snapshot.status)
    }

    fn event(&self, at_ms: u64) -> AgentStatusEvent {
        AgentStatusEvent {
            uuid: self.identity.uuid.clone(),
            status: self.status(),
            runtime_status: self.snapshot.status,
            at_ms,
        }
    }
}

/// State machine for one agent uuid.
pub struct AgentInstance<C: Clock = SystemClock> {
    kind: AgentKind,
    settings: FleetSettings,
    clock: C,
    feed: StatusFeed,
    inner: Mutex<Inner>,
}

impl<C: Clock> AgentInstance<C> {
    /// Instance for an agent known from the registry/config: approved (or
    /// disabled), but never contacted yet.
    pub fn from_registry(
        identity: AgentIdentity,
        kind: AgentKind,
        settings: FleetSettings,
        clock: C,
        feed: StatusFeed,
    ) -> Self {
        let config_status = if identity.enabled {
            AgentConfigStatus::Enabled
        } else {
            AgentConfigStatus::Disabled
        };
        let snapshot = AgentRuntimeSnapshot::new(&identity.uuid, AgentRuntimeStatus::Missing);
        Self {
            kind,
            settings,
            clock,
            feed,
            inner: Mutex::new(Inner {
                identity,
                config_status,
                snapshot,
                cookie: None,
            }),
        }
    }

    /// Instance for an agent that announced itself before being approved.
    /// Local agents are trusted and auto-approved; remote ones stay Pending
    /// until an operator enables them or a config sync arrives.
    pub fn from_live(
        snapshot: AgentRuntimeSnapshot,
        kind: AgentKind,
        settings: FleetSettings,
        clock: C,
        feed: StatusFeed,
    ) -> Self {
        let identity = AgentIdentity::new(&snapshot.uuid, "", &snapshot.ip_address);
        let config_status = match kind {
            AgentKind::Local => AgentConfigStatus::Enabled,
            AgentKind::Remote => AgentConfigStatus::Pending,
        };
        let cookie = snapshot.cookie.clone();
        let mut snapshot = snapshot;
        snapshot.last_heard_ms = None;
        Self {
            kind,
            settings,
            clock,
            feed,
            inner: Mutex::new(Inner {
                identity,
                config_status,
                snapshot,
                cookie,
            }),
        }
    }

    /// Replace the current snapshot with a fresh heartbeat.
    ///
    /// Special cases, in order: a changed cookie means the agent process
    /// restarted, so any reported building state is stale and reset; a
    /// server-side cancel sticks until the agent explicitly reports idle; the
    /// identity's ip follows the heartbeat for registered agents. Always
    /// stamps `last_heard` and always notifies.
    pub fn update(&self, snapshot: AgentRuntimeSnapshot) {
        let event = {
            let mut inner = self.inner.lock();
            let mut incoming = snapshot;

            let fresh_process = match (&inner.cookie, &incoming.cookie) {
                (Some(old), Some(new)) => old != new,
                _ => false,
            };
            if fresh_process {
                incoming.building_info = BuildingInfo::NOT_BUILDING;
                if incoming.status == AgentRuntimeStatus::Building
                    || incoming.status == AgentRuntimeStatus::Cancelled
                {
                    incoming.status = AgentRuntimeStatus::Idle;
                }
            } else if inner.snapshot.is_cancelled()
                && !incoming.is_cancelled()
                && incoming.status != AgentRuntimeStatus::Idle
            {
                // Sticky cancellation: ignore a stale non-idle report.
                incoming.status = AgentRuntimeStatus::Cancelled;
                incoming.building_info = inner.snapshot.building_info.clone();
            }

            if inner.config_status != AgentConfigStatus::Pending
                && !incoming.ip_address.is_empty()
                && incoming.ip_address != inner.identity.ip_address
            {
                tracing::info!(
                    uuid = %inner.identity.uuid,
                    old = %inner.identity.ip_address,
                    new = %incoming.ip_address,
                    "agent ip changed"
                );
                inner.identity.ip_address = incoming.ip_address.clone();
            }

            if incoming.cookie.is_some() {
                inner.cookie = incoming.cookie.clone();
            }
            incoming.last_heard_ms = Some(self.clock.now_ms());
            inner.snapshot = incoming;
            inner.event(self.clock.now_ms())
        };
        self.feed.publish(event);
    }

    /// Re-evaluate liveness with no new data.
    ///
    /// Pending agents are left alone (they have nothing to lose contact
    /// with). A never-heard agent is marked Missing and gets its first
    /// `last_heard` stamp so the timeout countdown starts. Past the
    /// connection timeout the runtime status becomes LostContact; for a
    /// disabled agent the displayed status stays Disabled while the runtime
    /// status still flips (the two diverge by design).
    pub fn refresh(&self) {
        let event = {
            let mut inner = self.inner.lock();
            if inner.config_status == AgentConfigStatus::Pending {
                return;
            }
            let now = self.clock.now_ms();
            match inner.snapshot.last_heard_ms {
                None => {
                    inner.snapshot.status = AgentRuntimeStatus::Missing;
                    inner.snapshot.last_heard_ms = Some(now);
                    Some(inner.event(now))
                }
                Some(heard) => {
                    let timeout_ms = self.settings.connection_timeout().as_millis() as u64;
                    if now.saturating_sub(heard) > timeout_ms
                        && inner.snapshot.status != AgentRuntimeStatus::LostContact
                    {
                        tracing::warn!(
                            uuid = %inner.identity.uuid,
                            silent_ms = now.saturating_sub(heard),
                            "agent lost contact"
                        );
                        inner.snapshot.status = AgentRuntimeStatus::LostContact;
                        Some(inner.event(now))
                    } else {
                        None
                    }
                }
            }
        };
        if let Some(event) = event {
            self.feed.publish(event);
        }
    }

    /// Force the lost-contact transition (sweepers, admin tooling). No-op
    /// for Pending; runtime-only for Disabled.
    pub fn lost_contact(&self) {
        let event = {
            let mut inner = self.inner.lock();
            if inner.config_status == AgentConfigStatus::Pending
                || inner.snapshot.status == AgentRuntimeStatus::LostContact
            {
                return;
            }
            inner.snapshot.status = AgentRuntimeStatus::LostContact;
            inner.event(self.clock.now_ms())
        };
        self.feed.publish(event);
    }

    /// Record that the agent started running a job.
    pub fn building(&self, info: BuildingInfo) {
        let event = {
            let mut inner = self.inner.lock();
            inner.snapshot.busy(info);
            inner.event(self.clock.now_ms())
        };
        self.feed.publish(event);
    }

    /// Cancel whatever the agent is doing. The building info is kept so
    /// callers can show what was cancelled.
    pub fn cancel(&self) {
        let event = {
            let mut inner = self.inner.lock();
            inner.snapshot.cancel();
            inner.event(self.clock.now_ms())
        };
        self.feed.publish(event);
    }

    /// Report the agent idle, clearing building state.
    pub fn idle(&self) {
        let event = {
            let mut inner = self.inner.lock();
            inner.snapshot.idle();
            inner.event(self.clock.now_ms())
        };
        self.feed.publish(event);
    }

    /// Approve the agent for work.
    pub fn enable(&self) {
        let event = {
            let mut inner = self.inner.lock();
            inner.identity.enable();
            inner.config_status = AgentConfigStatus::Enabled;
            inner.event(self.clock.now_ms())
        };
        self.feed.publish(event);
    }

    /// Deny the agent. Always succeeds, even mid-build: a running job is not
    /// interrupted, the agent just receives no further assignments.
    pub fn deny(&self) {
        let event = {
            let mut inner = self.inner.lock();
            inner.identity.disable();
            inner.config_status = AgentConfigStatus::Disabled;
            inner.event(self.clock.now_ms())
        };
        self.feed.publish(event);
    }

    /// Reconcile identity fields from the authoritative registry record.
    ///
    /// The two re-approval branches below are intentionally distinct; see the
    /// module docs.
    pub fn sync_identity(&self, incoming: &AgentIdentity) {
        let event = {
            let mut inner = self.inner.lock();
            let was_pending = inner.config_status == AgentConfigStatus::Pending;
            inner.identity = incoming.clone();
            if !incoming.enabled {
                inner.config_status = AgentConfigStatus::Disabled;
            } else if was_pending {
                // First approval of a live agent: its snapshot is current, so
                // it is immediately available.
                inner.config_status = AgentConfigStatus::Enabled;
                inner.snapshot.idle();
            } else {
                // Previously approved (or disabled) agent: keep the runtime
                // status; it stays Missing until the next heartbeat.
                inner.config_status = AgentConfigStatus::Enabled;
            }
            inner.event(self.clock.now_ms())
        };
        self.feed.publish(event);
    }

    /// First plan in list order this agent can run.
    ///
    /// Plans wanting an elastic profile never match here (elastic placement
    /// is owned by the plugin layer), and elastic agents match nothing. A
    /// plan pinned to an agent uuid matches on the uuid alone; otherwise the
    /// plan's resources must all be advertised by this agent.
    pub fn first_matching<'a>(&self, plans: &'a [JobPlan]) -> Option<&'a JobPlan> {
        let inner = self.inner.lock();
        if inner.identity.is_elastic() {
            return None;
        }
        plans.iter().find(|plan| {
            if plan.requires_elastic_agent() {
                return false;
            }
            match &plan.agent_uuid {
                Some(uuid) => *uuid == inner.identity.uuid,
                None => plan.resources.is_subset_of(&inner.identity.resources),
            }
        })
    }

    /// True when the agent reports less free space than the configured limit.
    /// Unknown space never counts as low.
    pub fn is_low_disk_space(&self) -> bool {
        let inner = self.inner.lock();
        match inner.snapshot.usable_space {
            Some(space) => space < self.settings.low_space_limit_bytes(),
            None => false,
        }
    }

    /// Free space for display: Unknown when unreported or when the agent is
    /// not reachable (Missing/LostContact report nothing current).
    pub fn free_disk_space(&self) -> DiskSpace {
        let inner = self.inner.lock();
        match inner.snapshot.status {
            AgentRuntimeStatus::Missing
            | AgentRuntimeStatus::LostContact
            | AgentRuntimeStatus::Unknown => DiskSpace::unknown(),
            _ => DiskSpace::from(inner.snapshot.usable_space),
        }
    }

    /// Assign a fresh session cookie, replacing any recorded one.
    pub fn assign_cookie(&self) -> String {
        let cookie = nanoid::nanoid!();
        self.inner.lock().cookie = Some(cookie.clone());
        cookie
    }

    pub fn status(&self) -> AgentStatus {
        self.inner.lock().status()
    }

    pub fn runtime_status(&self) -> AgentRuntimeStatus {
        self.inner.lock().snapshot.status
    }

    pub fn config_status(&self) -> AgentConfigStatus {
        self.inner.lock().config_status
    }

    /// Registered means the registry knows this agent: everything except a
    /// Pending self-registration.
    pub fn is_registered(&self) -> bool {
        self.config_status() != AgentConfigStatus::Pending
    }

    pub fn is_missing(&self) -> bool {
        self.status() == AgentStatus::Missing
    }

    /// Deny is permitted from every state.
    pub fn can_disable(&self) -> bool {
        true
    }

    /// A registered agent heartbeating from a new address needs its identity
    /// updated; pending agents don't (their record isn't authoritative yet).
    pub fn is_ip_change_required(&self, new_ip: &str) -> bool {
        let inner = self.inner.lock();
        inner.config_status != AgentConfigStatus::Pending && inner.identity.ip_address != new_ip
    }

    pub fn identity(&self) -> AgentIdentity {
        self.inner.lock().identity.clone()
    }

    pub fn uuid(&self) -> String {
        self.inner.lock().identity.uuid.clone()
    }

    pub fn hostname(&self) -> String {
        self.inner.lock().identity.hostname.clone()
    }

    pub fn ip_address(&self) -> String {
        self.inner.lock().identity.ip_address.clone()
    }

    pub fn kind(&self) -> AgentKind {
        self.kind
    }

    pub fn building_info(&self) -> BuildingInfo {
        self.inner.lock().snapshot.building_info.clone()
    }

    pub fn build_locator(&self) -> String {
        self.inner.lock().snapshot.building_info.build_locator.clone()
    }

    pub fn location(&self) -> String {
        self.inner.lock().snapshot.location.clone()
    }

    pub fn operating_system(&self) -> String {
        self.inner.lock().snapshot.operating_system.clone()
    }

    pub fn usable_space(&self) -> Option<u64> {
        self.inner.lock().snapshot.usable_space
    }

    pub fn last_heard_ms(&self) -> Option<u64> {
        self.inner.lock().snapshot.last_heard_ms
    }

    pub fn cookie(&self) -> Option<String> {
        self.inner.lock().cookie.clone()
    }
}

#[cfg(test)]
#[path = "instance_tests.rs"]
mod tests;
