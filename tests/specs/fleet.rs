// SPDX-License-Identifier: MIT

//! Whole-fleet lifecycle scenarios: registration, approval, liveness,
//! reconciliation against registry records, and job matching.

use crate::prelude::*;
use gaffer_core::JobPlan;
use std::time::Duration;

#[test]
fn remote_agent_registers_pending_and_becomes_idle_on_approval() {
    let (registry, _clock, mut rx) = watched_registry();

    registry.heartbeat(heartbeat_for("agent-1"));
    let instance = registry.get("agent-1").unwrap();
    assert_eq!(instance.status(), AgentStatus::Pending);
    assert!(!instance.is_registered());

    assert!(registry.enable("agent-1"));
    assert_eq!(instance.status(), AgentStatus::Idle);
    assert!(instance.is_registered());

    let events = drain(&mut rx);
    assert!(!events.is_empty());
    assert_eq!(events.last().unwrap().status, AgentStatus::Idle);
}

#[test]
fn cancelled_build_stays_cancelled_until_agent_reports_idle() {
    let (registry, _clock, _rx) = watched_registry();
    registry.heartbeat(heartbeat_for("agent-1"));
    registry.enable("agent-1");
    let instance = registry.get("agent-1").unwrap();

    instance.building(default_building_info());
    assert_eq!(instance.status(), AgentStatus::Building);

    instance.cancel();
    assert_eq!(instance.status(), AgentStatus::Cancelled);

    // A stale building heartbeat must not clear the cancellation.
    let mut stale = heartbeat_for("agent-1");
    stale.busy(default_building_info());
    registry.heartbeat(stale);
    assert_eq!(instance.status(), AgentStatus::Cancelled);

    // The explicit idle report does.
    registry.heartbeat(heartbeat_for("agent-1"));
    assert_eq!(instance.status(), AgentStatus::Idle);
}

#[test]
fn silent_agent_goes_lost_contact_and_recovers_on_next_heartbeat() {
    let (registry, clock, _rx) = watched_registry();
    registry.heartbeat(heartbeat_for("agent-1"));
    registry.enable("agent-1");
    let instance = registry.get("agent-1").unwrap();

    clock.advance(Duration::from_secs(299));
    registry.refresh_all();
    assert_eq!(instance.status(), AgentStatus::Idle);

    clock.advance(Duration::from_secs(2));
    registry.refresh_all();
    assert_eq!(instance.status(), AgentStatus::LostContact);

    registry.heartbeat(heartbeat_for("agent-1"));
    assert_eq!(instance.status(), AgentStatus::Idle);
}

#[test]
fn reconciliation_creates_missing_prunes_absent_and_keeps_pending() {
    let (registry, _clock, _rx) = watched_registry();

    // A live pending agent and a live approved agent.
    registry.heartbeat(heartbeat_for("pending-1"));
    registry.heartbeat(heartbeat_for("approved-1"));
    registry.enable("approved-1");

    // Records know approved-1 and a never-seen configured-1.
    let records = vec![
        AgentIdentity::new("approved-1", DEFAULT_HOSTNAME, DEFAULT_IP),
        AgentIdentity::new("configured-1", "cold-host", "10.18.5.2"),
    ];
    registry.sync_from_config(&records);

    assert_eq!(registry.len(), 3);
    assert!(registry.get("pending-1").is_some());
    let cold = registry.get("configured-1").unwrap();
    assert_eq!(cold.status(), AgentStatus::Missing);

    // approved-1 drops out of the records: it gets deregistered.
    registry.sync_from_config(&records[1..]);
    assert!(registry.get("approved-1").is_none());
    assert!(registry.get("pending-1").is_some());
}

#[test]
fn denied_agent_keeps_its_building_info() {
    let (registry, _clock, _rx) = watched_registry();
    registry.heartbeat(heartbeat_for("agent-1"));
    registry.enable("agent-1");
    let instance = registry.get("agent-1").unwrap();
    instance.building(default_building_info());

    assert!(registry.deny("agent-1"));
    assert_eq!(instance.status(), AgentStatus::Disabled);
    assert_eq!(instance.build_locator(), "buildLocator");
}

#[test]
fn first_matching_assigns_work_across_the_fleet() {
    let (registry, _clock, _rx) = watched_registry();

    registry.heartbeat(heartbeat_for("plain-agent"));
    registry.enable("plain-agent");

    let linux = registry.get("plain-agent").unwrap();
    linux.sync_identity(
        &AgentIdentity::new("plain-agent", DEFAULT_HOSTNAME, DEFAULT_IP)
            .with_resources(Resources::parse("linux, java")),
    );

    let plans = vec![
        JobPlan::new("deploy", "stage1", "job1").with_resources("windows"),
        JobPlan::new("build", "stage1", "job1").with_resources("linux"),
        JobPlan::new("pinned", "stage1", "job1").assigned_to("some-other-agent"),
    ];
    let (uuid, plan) = registry.find_first_matching(&plans).unwrap();
    assert_eq!(uuid, "plain-agent");
    assert_eq!(plan.pipeline, "build");
}

#[test]
fn uuid_pinned_plan_matches_only_its_agent() {
    let (registry, _clock, _rx) = watched_registry();
    registry.heartbeat(heartbeat_for("agent-a"));
    registry.enable("agent-a");
    registry.heartbeat(heartbeat_for("agent-b"));
    registry.enable("agent-b");

    let plans = vec![JobPlan::new("hotfix", "stage1", "job1")
        .with_resources("gpu")
        .assigned_to("agent-b")];

    let (uuid, _) = registry.find_first_matching(&plans).unwrap();
    // Resource requirements are ignored for a pinned plan.
    assert_eq!(uuid, "agent-b");
}

#[test]
fn fresh_agent_process_resets_building_state() {
    let (registry, _clock, _rx) = watched_registry();
    registry.heartbeat(heartbeat_for("agent-1"));
    registry.enable("agent-1");
    let instance = registry.get("agent-1").unwrap();
    instance.building(default_building_info());
    assert_eq!(instance.status(), AgentStatus::Building);

    // Same uuid, different cookie: the agent process restarted.
    let restarted = AgentRuntimeSnapshot::new("agent-1", AgentRuntimeStatus::Idle)
        .with_cookie("fresh-cookie")
        .with_ip_address(DEFAULT_IP);
    registry.heartbeat(restarted);

    assert_eq!(instance.status(), AgentStatus::Idle);
    assert_eq!(instance.build_locator(), "");
}

#[test]
fn sorted_lists_agents_by_hostname() {
    let (registry, _clock, _rx) = watched_registry();
    registry.heartbeat(heartbeat_for("agent-z").with_location("/var/z"));
    registry.heartbeat(heartbeat_for("agent-a").with_location("/var/a"));
    registry
        .get("agent-z")
        .unwrap()
        .sync_identity(&AgentIdentity::new("agent-z", "zeta", DEFAULT_IP));
    registry
        .get("agent-a")
        .unwrap()
        .sync_identity(&AgentIdentity::new("agent-a", "alpha", DEFAULT_IP));

    let hostnames: Vec<String> = registry.sorted().iter().map(|a| a.hostname()).collect();
    assert_eq!(hostnames, vec!["alpha".to_string(), "zeta".to_string()]);
}
