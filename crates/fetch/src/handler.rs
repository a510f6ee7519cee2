// SPDX-License-Identifier: MIT

//! Destination handlers for fetched artifacts.
//!
//! A handler owns the local side of one fetch: it receives the response body
//! chunk by chunk and decides, from the final HTTP status, whether the fetch
//! succeeded. `FileHandler` writes a single artifact file; `DirHandler`
//! buffers a zipped directory tree and expands it. Both verify written files
//! against the server's MD5 manifest before declaring success.

use crate::checksum::{ChecksumManifest, Verification};
use crate::error::FetchError;
use crate::publisher::FetchPublisher;
use std::fs::File;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

/// Receives one fetch attempt's body and settles the outcome.
pub trait FetchHandler: Send {
    /// Called once per attempt before the first body chunk. Must reset any
    /// partial state from an earlier failed attempt.
    fn begin(&mut self) -> std::io::Result<()>;

    /// One body chunk, in order.
    fn record(&mut self, chunk: &[u8]) -> std::io::Result<()>;

    /// Settle the fetch given the final status. Only called for statuses the
    /// downloader does not handle itself (202 re-polls, 304 short-circuit).
    fn finish(&mut self, status: u16, publisher: &dyn FetchPublisher) -> Result<(), FetchError>;
}

/// Writes a single artifact to `dest`, verified against the manifest entry
/// for `source_path` (the artifact's server-side path).
pub struct FileHandler {
    dest: PathBuf,
    source_path: String,
    manifest: Option<ChecksumManifest>,
    file: Option<File>,
}

impl FileHandler {
    pub fn new(
        dest: impl Into<PathBuf>,
        source_path: impl Into<String>,
        manifest: Option<ChecksumManifest>,
    ) -> Self {
        Self {
            dest: dest.into(),
            source_path: source_path.into(),
            manifest,
            file: None,
        }
    }

    pub fn dest(&self) -> &Path {
        &self.dest
    }

    fn verify(&self, publisher: &dyn FetchPublisher) -> Result<(), FetchError> {
        verify_one(
            self.manifest.as_ref(),
            &self.source_path,
            &self.dest,
            publisher,
        )?;
        publisher.info(&saved_line(
            &self.dest,
            self.manifest
                .as_ref()
                .is_some_and(|m| m.md5_for(&self.source_path).is_some()),
        ));
        Ok(())
    }
}

impl FetchHandler for FileHandler {
    fn begin(&mut self) -> std::io::Result<()> {
        if let Some(parent) = self.dest.parent() {
            std::fs::create_dir_all(parent)?;
        }
        // Truncates any partial write from a failed earlier attempt.
        self.file = Some(File::create(&self.dest)?);
        Ok(())
    }

    fn record(&mut self, chunk: &[u8]) -> std::io::Result<()> {
        match self.file.as_mut() {
            Some(file) => file.write_all(chunk),
            None => Err(std::io::Error::other("record before begin")),
        }
    }

    fn finish(&mut self, status: u16, publisher: &dyn FetchPublisher) -> Result<(), FetchError> {
        match status {
            200 => {
                if let Some(file) = self.file.take() {
                    file.sync_all()
                        .map_err(|e| FetchError::io(self.dest.display().to_string(), e))?;
                }
                self.verify(publisher)
            }
            404 => {
                self.file = None;
                if self.dest.exists() {
                    std::fs::remove_file(&self.dest)
                        .map_err(|e| FetchError::io(self.dest.display().to_string(), e))?;
                    publisher.warn(&format!(
                        "Artifact [{}] has purged from the server. Removed the stale copy at [{}].",
                        self.source_path,
                        self.dest.display()
                    ));
                } else {
                    publisher.warn(&format!(
                        "Artifact [{}] has purged from the server.",
                        self.source_path
                    ));
                }
                Ok(())
            }
            other => Err(FetchError::Unavailable {
                path: self.source_path.clone(),
                status: other,
            }),
        }
    }
}

/// Buffers a zipped directory artifact and expands it under `dest_dir`,
/// verifying each extracted file against the manifest key
/// `{source_root}/{relative path}`.
pub struct DirHandler {
    dest_dir: PathBuf,
    source_root: String,
    manifest: Option<ChecksumManifest>,
    buffer: Vec<u8>,
}

impl DirHandler {
    pub fn new(
        dest_dir: impl Into<PathBuf>,
        source_root: impl Into<String>,
        manifest: Option<ChecksumManifest>,
    ) -> Self {
        Self {
            dest_dir: dest_dir.into(),
            source_root: source_root.into(),
            manifest,
            buffer: Vec::new(),
        }
    }

    pub fn dest_dir(&self) -> &Path {
        &self.dest_dir
    }

    fn expand(&mut self, publisher: &dyn FetchPublisher) -> Result<(), FetchError> {
        let dest = self.dest_dir.display().to_string();
        let archive_err = |source| FetchError::Archive {
            dest: dest.clone(),
            source,
        };

        let mut archive =
            zip::ZipArchive::new(Cursor::new(&self.buffer[..])).map_err(archive_err)?;
        let mut written: Vec<(PathBuf, String)> = Vec::new();
        for index in 0..archive.len() {
            let mut entry = archive.by_index(index).map_err(archive_err)?;
            let Some(relative) = entry.enclosed_name() else {
                continue;
            };
            let target = self.dest_dir.join(&relative);
            if entry.is_dir() {
                std::fs::create_dir_all(&target)
                    .map_err(|e| FetchError::io(target.display().to_string(), e))?;
                continue;
            }
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| FetchError::io(parent.display().to_string(), e))?;
            }
            let mut out = File::create(&target)
                .map_err(|e| FetchError::io(target.display().to_string(), e))?;
            std::io::copy(&mut entry, &mut out)
                .map_err(|e| FetchError::io(target.display().to_string(), e))?;
            let key = format!("{}/{}", self.source_root, path_as_key(&relative));
            written.push((target, key));
        }

        for (target, key) in &written {
            verify_one(self.manifest.as_ref(), key, target, publisher)?;
        }
        publisher.info(&saved_line(&self.dest_dir, self.manifest.is_some()));
        Ok(())
    }
}

impl FetchHandler for DirHandler {
    fn begin(&mut self) -> std::io::Result<()> {
        self.buffer.clear();
        Ok(())
    }

    fn record(&mut self, chunk: &[u8]) -> std::io::Result<()> {
        self.buffer.extend_from_slice(chunk);
        Ok(())
    }

    fn finish(&mut self, status: u16, publisher: &dyn FetchPublisher) -> Result<(), FetchError> {
        match status {
            200 => self.expand(publisher),
            404 => {
                self.buffer.clear();
                if self.dest_dir.exists() {
                    std::fs::remove_dir_all(&self.dest_dir)
                        .map_err(|e| FetchError::io(self.dest_dir.display().to_string(), e))?;
                    publisher.warn(&format!(
                        "Artifact [{}] has purged from the server. Removed the stale copy at [{}].",
                        self.source_root,
                        self.dest_dir.display()
                    ));
                } else {
                    publisher.warn(&format!(
                        "Artifact [{}] has purged from the server.",
                        self.source_root
                    ));
                }
                Ok(())
            }
            other => Err(FetchError::Unavailable {
                path: self.source_root.clone(),
                status: other,
            }),
        }
    }
}

/// Manifest keys always use forward slashes, regardless of platform.
fn path_as_key(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn verify_one(
    manifest: Option<&ChecksumManifest>,
    key: &str,
    file: &Path,
    publisher: &dyn FetchPublisher,
) -> Result<(), FetchError> {
    let Some(manifest) = manifest else {
        publisher.warn(
            "[WARN] The md5checksum property file was not found on the server. \
             Hence, Gaffer could not verify the integrity of the artifacts.",
        );
        return Ok(());
    };
    match manifest.verify(key, file)? {
        Verification::Verified => Ok(()),
        Verification::NoManifest => Ok(()),
        Verification::EntryMissing => {
            publisher.warn(&format!(
                "[WARN] The md5checksum value of the artifact [{key}] was not found on the \
                 server. Hence, Gaffer could not verify the integrity of its contents."
            ));
            Ok(())
        }
        Verification::Mismatch { expected, actual } => {
            publisher.error(&format!(
                "[ERROR] Verification of the integrity of the artifact [{key}] failed. The \
                 artifact file on the server may have changed since its original upload."
            ));
            tracing::error!(
                key,
                %expected,
                %actual,
                file = %file.display(),
                "artifact checksum mismatch"
            );
            Err(FetchError::ChecksumMismatch(key.to_string()))
        }
    }
}

fn saved_line(dest: &Path, verified: bool) -> String {
    if verified {
        format!(
            "Saved artifact to [{}] after verifying the integrity of its contents.",
            dest.display()
        )
    } else {
        format!(
            "Saved artifact to [{}] without verifying the integrity of its contents.",
            dest.display()
        )
    }
}

#[cfg(test)]
#[path = "handler_tests.rs"]
mod tests;
