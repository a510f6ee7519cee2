// SPDX-License-Identifier: MIT

//! Shared imports and helpers for the workspace specs.

pub use gaffer_core::test_support::*;
pub use gaffer_core::{
    AgentConfigStatus, AgentIdentity, AgentRuntimeSnapshot, AgentRuntimeStatus, AgentStatus,
    FetchSettings, FleetSettings, Resources, TestClock,
};
pub use gaffer_fleet::{AgentRegistry, AgentStatusEvent, StatusFeed};

use tokio::sync::mpsc::UnboundedReceiver;

/// A registry on a controllable clock with an attached event receiver.
pub fn watched_registry() -> (
    AgentRegistry<TestClock>,
    TestClock,
    UnboundedReceiver<AgentStatusEvent>,
) {
    let clock = TestClock::new();
    let (feed, rx) = StatusFeed::channel();
    let registry = AgentRegistry::new(FleetSettings::default(), clock.clone(), feed);
    (registry, clock, rx)
}

pub fn drain(rx: &mut UnboundedReceiver<AgentStatusEvent>) -> Vec<AgentStatusEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// An idle heartbeat for an arbitrary uuid.
pub fn heartbeat_for(uuid: &str) -> AgentRuntimeSnapshot {
    AgentRuntimeSnapshot::new(uuid, AgentRuntimeStatus::Idle)
        .with_cookie("cookie")
        .with_ip_address(DEFAULT_IP)
}
