// SPDX-License-Identifier: MIT

//! MD5 checksum manifest and verification.
//!
//! The server publishes one properties-style manifest per artifact upload:
//! one `relative/path=md5hex` pair per line. A missing manifest or a missing
//! entry means "unknown" and downgrades verification to a warning; only an
//! actual mismatch is fatal. Verification is stateless — re-verifying the
//! same file against the same manifest always reproduces the outcome.

use crate::error::FetchError;
use md5::{Digest, Md5};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

/// Parsed manifest: artifact path → expected MD5 hex (lowercase).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChecksumManifest {
    entries: HashMap<String, String>,
}

/// Outcome of checking one file against the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    Verified,
    /// No manifest was published for this upload.
    NoManifest,
    /// The manifest has no entry for this path.
    EntryMissing,
    Mismatch { expected: String, actual: String },
}

impl ChecksumManifest {
    /// Load from disk. An absent file is `Ok(None)` — uploads without
    /// checksums are legal, just unverifiable.
    pub fn load(path: &Path) -> Result<Option<Self>, FetchError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(FetchError::io(path.display().to_string(), e)),
        };
        Self::parse(&text)
            .map(Some)
            .map_err(|reason| FetchError::Manifest {
                path: path.display().to_string(),
                reason,
            })
    }

    /// Parse properties-style text: `#`/`!` comments, blank lines, `key=value`
    /// with minimal `\ `/`\=`/`\:` unescaping in keys.
    pub fn parse(text: &str) -> Result<Self, String> {
        let mut entries = HashMap::new();
        for (lineno, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                continue;
            }
            let (key, value) =
                split_property(line).ok_or_else(|| format!("no separator on line {}", lineno + 1))?;
            if value.is_empty() {
                return Err(format!("empty checksum on line {}", lineno + 1));
            }
            entries.insert(key, value.to_ascii_lowercase());
        }
        Ok(Self { entries })
    }

    pub fn md5_for(&self, path: &str) -> Option<&str> {
        self.entries.get(path).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check the file at `file` against the entry for `key`.
    pub fn verify(&self, key: &str, file: &Path) -> Result<Verification, FetchError> {
        let Some(expected) = self.md5_for(key) else {
            return Ok(Verification::EntryMissing);
        };
        let handle = std::fs::File::open(file)
            .map_err(|e| FetchError::io(file.display().to_string(), e))?;
        let actual = md5_hex(handle).map_err(|e| FetchError::io(file.display().to_string(), e))?;
        if actual == expected {
            Ok(Verification::Verified)
        } else {
            Ok(Verification::Mismatch {
                expected: expected.to_string(),
                actual,
            })
        }
    }
}

/// Split `key=value` (or `key: value`) honoring backslash escapes in the key.
fn split_property(line: &str) -> Option<(String, String)> {
    let mut key = String::new();
    let mut chars = line.char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => {
                if let Some((_, escaped)) = chars.next() {
                    key.push(escaped);
                }
            }
            '=' | ':' => {
                let value = line[i + 1..].trim().to_string();
                return Some((key.trim_end().to_string(), value));
            }
            _ => key.push(c),
        }
    }
    None
}

/// Hex-encoded MD5 of everything in `reader`.
pub fn md5_hex(mut reader: impl Read) -> std::io::Result<String> {
    let mut hasher = Md5::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    let digest = hasher.finalize();
    let mut hex = String::with_capacity(digest.len() * 2);
    for byte in digest {
        use std::fmt::Write;
        let _ = write!(hex, "{:02x}", byte);
    }
    Ok(hex)
}

#[cfg(test)]
#[path = "checksum_tests.rs"]
mod tests;
