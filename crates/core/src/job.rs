// SPDX-License-Identifier: MIT

//! Resolved job plans handed to the fleet by the scheduler.
//!
//! A `JobPlan` is immutable for the duration of one scheduling attempt. The
//! fleet never sees pipeline configuration; upstream layers resolve templates
//! and materials before a plan reaches us.

use crate::resources::Resources;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ready-to-schedule description of one job's placement requirements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobPlan {
    pub pipeline: String,
    pub stage: String,
    pub job: String,
    /// Labels an agent must advertise to run this job.
    #[serde(default)]
    pub resources: Resources,
    /// When set, the job may only run on this agent (job reruns).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_uuid: Option<String>,
    /// When set, placement is owned by the elastic-agent plugin, not the
    /// resource matcher.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elastic_profile: Option<ElasticProfile>,
}

/// Reference to an elastic-agent profile a job wants to run under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElasticProfile {
    pub id: String,
    pub plugin_id: String,
}

impl JobPlan {
    pub fn new(
        pipeline: impl Into<String>,
        stage: impl Into<String>,
        job: impl Into<String>,
    ) -> Self {
        Self {
            pipeline: pipeline.into(),
            stage: stage.into(),
            job: job.into(),
            resources: Resources::new(),
            agent_uuid: None,
            elastic_profile: None,
        }
    }

    pub fn with_resources(mut self, resources: impl Into<Resources>) -> Self {
        self.resources = resources.into();
        self
    }

    pub fn assigned_to(mut self, agent_uuid: impl Into<String>) -> Self {
        self.agent_uuid = Some(agent_uuid.into());
        self
    }

    pub fn with_elastic_profile(
        mut self,
        id: impl Into<String>,
        plugin_id: impl Into<String>,
    ) -> Self {
        self.elastic_profile = Some(ElasticProfile {
            id: id.into(),
            plugin_id: plugin_id.into(),
        });
        self
    }

    pub fn requires_elastic_agent(&self) -> bool {
        self.elastic_profile.is_some()
    }

    /// True when the plan is pinned to a specific agent uuid.
    pub fn assigned_to_agent(&self) -> bool {
        self.agent_uuid.is_some()
    }
}

impl fmt::Display for JobPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.pipeline, self.stage, self.job)
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
