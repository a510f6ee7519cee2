// SPDX-License-Identifier: MIT

//! Retry loop for artifact fetches.
//!
//! A fetch makes up to `max_attempts` transport attempts. Failed attempts
//! back off for `step * failures` seconds plus uniform jitter from
//! `[0, jitter)`, so with defaults the waits land in [10,20), [20,30) and
//! [30,40) seconds. A 202 from the server means the artifact is still being
//! prepared: it is re-polled immediately a few times and only then counted
//! as a failed attempt. A 304 means the cached local copy is current and
//! ends the fetch without touching the handler.

use crate::error::FetchError;
use crate::handler::FetchHandler;
use crate::publisher::FetchPublisher;
use crate::transport::{FetchTransport, TransportError};
use async_trait::async_trait;
use gaffer_core::settings::FetchSettings;
use rand::Rng;
use std::time::Duration;
use thiserror::Error;

/// Backoff wait seam; tests substitute a recorder so nothing really sleeps.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// One attempt's failure, before retry accounting.
#[derive(Debug, Error)]
enum AttemptError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("server is still preparing the artifact (HTTP 202)")]
    StillBuilding,
}

pub struct DownloadAction<T, S = TokioSleeper> {
    transport: T,
    sleeper: S,
    settings: FetchSettings,
}

impl<T: FetchTransport> DownloadAction<T> {
    pub fn new(transport: T, settings: FetchSettings) -> Self {
        Self {
            transport,
            sleeper: TokioSleeper,
            settings,
        }
    }
}

impl<T: FetchTransport, S: Sleeper> DownloadAction<T, S> {
    pub fn with_sleeper(transport: T, sleeper: S, settings: FetchSettings) -> Self {
        Self {
            transport,
            sleeper,
            settings,
        }
    }

    /// Fetch `url` into `handler`, retrying per the settings. Checksum and
    /// hard-status failures from the handler are terminal; only transport
    /// errors and exhausted 202 re-polls are retried.
    pub async fn perform(
        &self,
        url: &str,
        handler: &mut dyn FetchHandler,
        publisher: &dyn FetchPublisher,
    ) -> Result<(), FetchError> {
        let mut failures: u32 = 0;
        loop {
            match self.attempt(url, handler).await {
                Ok(304) => {
                    publisher.info(&format!(
                        "Local copy of [{url}] is already up to date. Skipping download."
                    ));
                    return Ok(());
                }
                Ok(status) => return handler.finish(status, publisher),
                Err(err) => {
                    failures += 1;
                    if failures >= self.settings.max_attempts {
                        tracing::warn!(url, attempts = failures, "artifact fetch exhausted");
                        return Err(FetchError::GivingUp {
                            url: url.to_string(),
                            attempts: failures,
                        });
                    }
                    let wait = self.backoff(failures);
                    publisher.warn(&format!(
                        "Could not fetch artifact {url}. Pausing {} seconds to retry. Error was: {err}",
                        wait.as_secs()
                    ));
                    self.sleeper.sleep(wait).await;
                }
            }
        }
    }

    /// One attempt, re-polling 202 responses without retry accounting.
    async fn attempt(
        &self,
        url: &str,
        handler: &mut dyn FetchHandler,
    ) -> Result<u16, AttemptError> {
        for _ in 0..=self.settings.accepted_repolls {
            let status = self.transport.fetch(url, handler).await?;
            if status != 202 {
                return Ok(status);
            }
            tracing::debug!(url, "artifact not ready yet, re-polling");
        }
        Err(AttemptError::StillBuilding)
    }

    fn backoff(&self, failures: u32) -> Duration {
        let base = Duration::from_secs(self.settings.backoff_step_secs * u64::from(failures));
        let jitter_ms = self.settings.jitter_secs * 1_000;
        let jitter = if jitter_ms == 0 {
            0
        } else {
            rand::rng().random_range(0..jitter_ms)
        };
        base + Duration::from_millis(jitter)
    }
}

#[cfg(test)]
#[path = "download_tests.rs"]
mod tests;
