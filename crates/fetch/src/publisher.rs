// SPDX-License-Identifier: MIT

//! Console-line publisher for fetch progress.
//!
//! The fetch pipeline reports progress as plain console lines attached to a
//! build's log; the trait seam lets tests capture them and lets embedders
//! route them into their own console streaming.

use parking_lot::Mutex;

pub trait FetchPublisher: Send + Sync {
    fn info(&self, line: &str);
    fn warn(&self, line: &str);
    fn error(&self, line: &str);
}

/// Publishes through `tracing` at the matching level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingPublisher;

impl FetchPublisher for TracingPublisher {
    fn info(&self, line: &str) {
        tracing::info!("{line}");
    }

    fn warn(&self, line: &str) {
        tracing::warn!("{line}");
    }

    fn error(&self, line: &str) {
        tracing::error!("{line}");
    }
}

/// Collects lines in memory, tagged by level, for later flushing into a
/// build console (or for assertions in tests).
#[derive(Debug, Default)]
pub struct BufferPublisher {
    lines: Mutex<Vec<(Level, String)>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warn,
    Error,
}

impl BufferPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().iter().map(|(_, line)| line.clone()).collect()
    }

    pub fn lines_at(&self, level: Level) -> Vec<String> {
        self.lines
            .lock()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, line)| line.clone())
            .collect()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines.lock().iter().any(|(_, line)| line.contains(needle))
    }
}

impl FetchPublisher for BufferPublisher {
    fn info(&self, line: &str) {
        self.lines.lock().push((Level::Info, line.to_string()));
    }

    fn warn(&self, line: &str) {
        self.lines.lock().push((Level::Warn, line.to_string()));
    }

    fn error(&self, line: &str) {
        self.lines.lock().push((Level::Error, line.to_string()));
    }
}
