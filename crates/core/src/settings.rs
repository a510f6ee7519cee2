// SPDX-License-Identifier: MIT

//! Fleet and fetch tunables.
//!
//! Both structs are TOML-loadable for embedding in a server config file.
//! They are passed explicitly into the components that need them; nothing
//! reads process-wide state.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed settings file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// Fleet-side tunables: liveness timeout and the low-disk threshold.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FleetSettings {
    /// Seconds without a heartbeat before an agent is marked lost-contact.
    pub connection_timeout_secs: u64,
    /// Agents reporting less free space than this are flagged low-disk.
    pub low_space_limit_mb: u64,
}

impl Default for FleetSettings {
    fn default() -> Self {
        Self {
            connection_timeout_secs: 300,
            low_space_limit_mb: 100,
        }
    }
}

impl FleetSettings {
    pub fn connection_timeout(&self) -> Duration {
        Duration::from_secs(self.connection_timeout_secs)
    }

    pub fn low_space_limit_bytes(&self) -> u64 {
        self.low_space_limit_mb * 1024 * 1024
    }

    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        load(path)
    }
}

/// Agent-side fetch tunables. The attempt ceiling is the pipeline's only
/// notion of a timeout; each individual attempt relies on the transport's.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FetchSettings {
    /// Total fetch attempts before giving up.
    pub max_attempts: u32,
    /// Immediate re-polls allowed when the server answers 202 (still building).
    pub accepted_repolls: u32,
    /// Base seconds added to the backoff per failed attempt.
    pub backoff_step_secs: u64,
    /// Width of the random jitter window added to each backoff.
    pub jitter_secs: u64,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            accepted_repolls: 3,
            backoff_step_secs: 10,
            jitter_secs: 10,
        }
    }
}

impl FetchSettings {
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        load(path)
    }
}

fn load<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, SettingsError> {
    let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
        path: path.display().to_string(),
        source,
    })?;
    toml::from_str(&text).map_err(|source| SettingsError::Parse {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
#[path = "settings_tests.rs"]
mod tests;
