// SPDX-License-Identifier: MIT

//! Full fetch pipelines: scripted transport, real destination handlers on a
//! temp directory, real checksum verification.

use async_trait::async_trait;
use gaffer_core::FetchSettings;
use gaffer_fetch::{
    BufferPublisher, ChecksumManifest, DownloadAction, FetchError, FetchHandler, FetchTransport,
    FileHandler, Sleeper, TransportError,
};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::time::Duration;

const HELLO_MD5: &str = "5eb63bbbe01eeed093cb22bb8f5acdc3";

enum Step {
    Fail,
    Respond { status: u16, body: &'static [u8] },
}

/// Transport that plays a script of failures and responses.
struct ScriptedTransport {
    steps: Mutex<VecDeque<Step>>,
}

impl ScriptedTransport {
    fn new(steps: Vec<Step>) -> Self {
        Self {
            steps: Mutex::new(steps.into_iter().collect()),
        }
    }
}

#[async_trait]
impl FetchTransport for ScriptedTransport {
    async fn fetch(
        &self,
        url: &str,
        handler: &mut dyn FetchHandler,
    ) -> Result<u16, TransportError> {
        let step = self.steps.lock().pop_front();
        match step {
            Some(Step::Respond { status, body }) => {
                if status == 200 {
                    let io = |e: std::io::Error| TransportError::Io {
                        url: url.to_string(),
                        reason: e.to_string(),
                    };
                    handler.begin().map_err(io)?;
                    // Deliver in two chunks the way a stream would.
                    let split = body.len() / 2;
                    handler.record(&body[..split]).map_err(io)?;
                    handler.record(&body[split..]).map_err(io)?;
                }
                Ok(status)
            }
            _ => Err(TransportError::Connect {
                url: url.to_string(),
                reason: "connection refused".to_string(),
            }),
        }
    }
}

struct NoSleep;

#[async_trait]
impl Sleeper for NoSleep {
    async fn sleep(&self, _duration: Duration) {}
}

fn action(steps: Vec<Step>) -> DownloadAction<ScriptedTransport, NoSleep> {
    DownloadAction::with_sleeper(
        ScriptedTransport::new(steps),
        NoSleep,
        FetchSettings::default(),
    )
}

#[tokio::test]
async fn fetches_verifies_and_saves_after_transient_failures() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("downloads/console.log");
    let manifest =
        ChecksumManifest::parse(&format!("p/s/j/console.log={HELLO_MD5}\n")).unwrap();
    let mut handler = FileHandler::new(&dest, "p/s/j/console.log", Some(manifest));
    let publisher = BufferPublisher::new();

    let action = action(vec![
        Step::Fail,
        Step::Fail,
        Step::Respond {
            status: 200,
            body: b"hello world",
        },
    ]);
    action
        .perform("http://server/files/p/s/j/console.log", &mut handler, &publisher)
        .await
        .unwrap();

    assert_eq!(std::fs::read(&dest).unwrap(), b"hello world");
    assert!(publisher.contains("after verifying the integrity"));
    assert!(publisher.contains("Pausing"));
}

#[tokio::test]
async fn corrupted_artifact_fails_with_the_download_failed_message() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("artifact.bin");
    let manifest = ChecksumManifest::parse(
        "p/s/j/artifact.bin=00000000000000000000000000000000\n",
    )
    .unwrap();
    let mut handler = FileHandler::new(&dest, "p/s/j/artifact.bin", Some(manifest));
    let publisher = BufferPublisher::new();

    let action = action(vec![Step::Respond {
        status: 200,
        body: b"hello world",
    }]);
    let err = action
        .perform("http://server/files/p/s/j/artifact.bin", &mut handler, &publisher)
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "Artifact download failed for [p/s/j/artifact.bin]"
    );
}

#[tokio::test]
async fn gives_up_with_the_exhaustion_message_when_the_server_never_answers() {
    let dir = tempfile::tempdir().unwrap();
    let mut handler = FileHandler::new(dir.path().join("x"), "p/s/j/x", None);
    let publisher = BufferPublisher::new();

    let action = action(vec![Step::Fail, Step::Fail, Step::Fail, Step::Fail]);
    let err = action
        .perform("http://server/files/p/s/j/x", &mut handler, &publisher)
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "Giving up fetching resource 'http://server/files/p/s/j/x'. \
         Tried 4 times and failed."
    );
}

#[tokio::test]
async fn still_building_artifact_is_repolled_then_saved() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("artifact.bin");
    let mut handler = FileHandler::new(&dest, "p/s/j/artifact.bin", None);
    let publisher = BufferPublisher::new();

    let action = action(vec![
        Step::Respond { status: 202, body: b"" },
        Step::Respond { status: 202, body: b"" },
        Step::Respond {
            status: 200,
            body: b"hello world",
        },
    ]);
    action
        .perform("http://server/files/p/s/j/artifact.bin", &mut handler, &publisher)
        .await
        .unwrap();

    assert_eq!(std::fs::read(&dest).unwrap(), b"hello world");
    assert!(publisher.contains("without verifying the integrity"));
}

#[tokio::test]
async fn purged_artifact_clears_the_stale_local_copy() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("artifact.bin");
    std::fs::write(&dest, b"stale bytes").unwrap();
    let mut handler = FileHandler::new(&dest, "p/s/j/artifact.bin", None);
    let publisher = BufferPublisher::new();

    let action = action(vec![Step::Respond { status: 404, body: b"" }]);
    action
        .perform("http://server/files/p/s/j/artifact.bin", &mut handler, &publisher)
        .await
        .unwrap();

    assert!(!dest.exists());
    assert!(publisher.contains("has purged from the server"));
}

#[tokio::test]
async fn forbidden_artifact_is_a_hard_failure() {
    let dir = tempfile::tempdir().unwrap();
    let mut handler = FileHandler::new(dir.path().join("x"), "p/s/j/x", None);
    let publisher = BufferPublisher::new();

    let action = action(vec![Step::Respond { status: 403, body: b"" }]);
    let err = action
        .perform("http://server/files/p/s/j/x", &mut handler, &publisher)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        FetchError::Unavailable { status: 403, .. }
    ));
}
