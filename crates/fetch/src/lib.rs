// SPDX-License-Identifier: MIT

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! gaffer-fetch: the agent-side artifact fetch and verification pipeline.
//!
//! `DownloadAction` drives a transport through up to four attempts with
//! jittered backoff, streaming bytes into a destination handler (single file
//! or zipped directory tree). On success the handler verifies every written
//! file against the server's MD5 manifest; an integrity failure is always
//! fatal and never silently retried.
//!
//! This runs inside an agent's single build-execution thread: backoff waits
//! suspend that task only, and the destination path is assumed exclusively
//! owned by the fetch in progress.

pub mod checksum;
pub mod download;
pub mod error;
pub mod handler;
pub mod publisher;
pub mod transport;

pub use checksum::{md5_hex, ChecksumManifest, Verification};
pub use download::{DownloadAction, Sleeper, TokioSleeper};
pub use error::FetchError;
pub use handler::{DirHandler, FetchHandler, FileHandler};
pub use publisher::{BufferPublisher, FetchPublisher, Level, TracingPublisher};
pub use transport::{FetchTransport, HttpTransport, TransportError};
