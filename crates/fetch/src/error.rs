// SPDX-License-Identifier: MIT

//! Fetch pipeline error taxonomy.
//!
//! The first two display strings are load-bearing: external log-scraping
//! tooling matches on them, so they must not change shape.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    /// The written bytes do not match the server-published MD5.
    /// Never retried in place; the caller must re-fetch from scratch.
    #[error("Artifact download failed for [{0}]")]
    ChecksumMismatch(String),

    /// Retry budget exhausted.
    #[error("Giving up fetching resource '{url}'. Tried {attempts} times and failed.")]
    GivingUp { url: String, attempts: u32 },

    /// The server refused the artifact (403 and other hard statuses).
    #[error("Failed to download artifact [{path}]. Server returned status {status}.")]
    Unavailable { path: String, status: u16 },

    #[error("artifact i/o error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to expand artifact archive into [{dest}]: {source}")]
    Archive {
        dest: String,
        #[source]
        source: zip::result::ZipError,
    },

    /// Malformed manifest file; fatal at load time.
    #[error("malformed checksum manifest {path}: {reason}")]
    Manifest { path: String, reason: String },
}

impl FetchError {
    pub(crate) fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
