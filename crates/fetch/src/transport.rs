// SPDX-License-Identifier: MIT

//! HTTP transport seam for the fetch pipeline.
//!
//! `FetchTransport` is the retryable boundary: any error it returns counts
//! as one failed attempt and triggers backoff. Errors from writing the body
//! to disk surface here as `TransportError::Io` so a transient full-disk or
//! locked-file condition gets the same retry treatment as a dropped
//! connection.

use crate::handler::FetchHandler;
use async_trait::async_trait;
use futures_util::StreamExt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to connect to {url}: {reason}")]
    Connect { url: String, reason: String },

    #[error("i/o error while streaming {url}: {reason}")]
    Io { url: String, reason: String },

    #[error("timed out fetching {url}")]
    Timeout { url: String },
}

/// One HTTP round trip: stream the body into the handler, return the status.
#[async_trait]
pub trait FetchTransport: Send + Sync {
    async fn fetch(
        &self,
        url: &str,
        handler: &mut dyn FetchHandler,
    ) -> Result<u16, TransportError>;
}

/// Production transport over a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new(reqwest::Client::new())
    }
}

#[async_trait]
impl FetchTransport for HttpTransport {
    async fn fetch(
        &self,
        url: &str,
        handler: &mut dyn FetchHandler,
    ) -> Result<u16, TransportError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| classify(url, &e))?;
        let status = response.status().as_u16();
        if status != 200 {
            // Drain without recording; non-200 bodies are diagnostics only.
            return Ok(status);
        }

        handler.begin().map_err(|e| TransportError::Io {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        let mut body = response.bytes_stream();
        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(|e| classify(url, &e))?;
            handler.record(&chunk).map_err(|e| TransportError::Io {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
        }
        Ok(status)
    }
}

fn classify(url: &str, err: &reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout {
            url: url.to_string(),
        }
    } else if err.is_connect() {
        TransportError::Connect {
            url: url.to_string(),
            reason: err.to_string(),
        }
    } else {
        TransportError::Io {
            url: url.to_string(),
            reason: err.to_string(),
        }
    }
}
