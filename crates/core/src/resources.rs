// SPDX-License-Identifier: MIT

//! Resource labels an agent advertises and a job may require.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::collections::BTreeSet;
use std::fmt;

/// An ordered set of resource labels ("linux", "mercurial", ...).
///
/// Labels are free-form strings assigned by operators; matching is exact and
/// case-sensitive. The empty set is valid: an empty requirement matches every
/// agent, and an agent with no labels satisfies only empty requirements.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Resources(BTreeSet<SmolStr>);

impl Resources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a comma-separated label list ("linux, mercurial").
    ///
    /// Labels are trimmed; empty segments are dropped.
    pub fn parse(list: &str) -> Self {
        Self(
            list.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(SmolStr::new)
                .collect(),
        )
    }

    pub fn add(&mut self, label: impl AsRef<str>) {
        self.0.insert(SmolStr::new(label.as_ref().trim()));
    }

    pub fn contains(&self, label: &str) -> bool {
        self.0.contains(label)
    }

    /// True when every label in `self` is present in `other`.
    pub fn is_subset_of(&self, other: &Resources) -> bool {
        self.0.is_subset(&other.0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(SmolStr::as_str)
    }
}

impl fmt::Display for Resources {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for label in &self.0 {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{}", label)?;
            first = false;
        }
        Ok(())
    }
}

impl FromIterator<SmolStr> for Resources {
    fn from_iter<I: IntoIterator<Item = SmolStr>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<&str> for Resources {
    fn from(list: &str) -> Self {
        Self::parse(list)
    }
}

#[cfg(test)]
#[path = "resources_tests.rs"]
mod tests;
