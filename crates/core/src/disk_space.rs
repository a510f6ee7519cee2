// SPDX-License-Identifier: MIT

//! Free-disk-space value with an Unknown sentinel.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Free space on an agent, in bytes, or Unknown when the agent has not
/// reported (or cannot be reached).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DiskSpace(Option<u64>);

const KB: u64 = 1024;
const MB: u64 = KB * 1024;
const GB: u64 = MB * 1024;

impl DiskSpace {
    pub const UNKNOWN: DiskSpace = DiskSpace(None);

    pub fn bytes(bytes: u64) -> Self {
        Self(Some(bytes))
    }

    pub fn unknown() -> Self {
        Self::UNKNOWN
    }

    pub fn is_unknown(&self) -> bool {
        self.0.is_none()
    }

    pub fn as_bytes(&self) -> Option<u64> {
        self.0
    }
}

impl From<Option<u64>> for DiskSpace {
    fn from(bytes: Option<u64>) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for DiskSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            None => write!(f, "Unknown"),
            Some(b) if b >= GB => write!(f, "{:.1} GB", b as f64 / GB as f64),
            Some(b) if b >= MB => write!(f, "{:.1} MB", b as f64 / MB as f64),
            Some(b) if b >= KB => write!(f, "{:.1} KB", b as f64 / KB as f64),
            Some(b) => write!(f, "{} bytes", b),
        }
    }
}

#[cfg(test)]
#[path = "disk_space_tests.rs"]
mod tests;
