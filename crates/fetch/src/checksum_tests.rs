// SPDX-License-Identifier: MIT

use super::*;
use std::io::Write as _;

fn write_temp(content: &[u8]) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn md5_hex_matches_known_vectors() {
    assert_eq!(md5_hex(&b""[..]).unwrap(), "d41d8cd98f00b204e9800998ecf8427e");
    assert_eq!(
        md5_hex(&b"hello world"[..]).unwrap(),
        "5eb63bbbe01eeed093cb22bb8f5acdc3"
    );
}

#[test]
fn parses_comments_blanks_and_entries() {
    let manifest = ChecksumManifest::parse(
        "# generated\n!also a comment\n\npipeline/stage/job/a.txt=ABCDEF0123456789abcdef0123456789\n",
    )
    .unwrap();
    assert_eq!(manifest.len(), 1);
    assert_eq!(
        manifest.md5_for("pipeline/stage/job/a.txt"),
        Some("abcdef0123456789abcdef0123456789")
    );
}

#[test]
fn parses_colon_separator_and_escaped_key() {
    let manifest =
        ChecksumManifest::parse("dir/with\\ space/f.bin: d41d8cd98f00b204e9800998ecf8427e\n")
            .unwrap();
    assert_eq!(
        manifest.md5_for("dir/with space/f.bin"),
        Some("d41d8cd98f00b204e9800998ecf8427e")
    );
}

#[test]
fn line_without_separator_is_an_error() {
    let err = ChecksumManifest::parse("no-separator-here\n").unwrap_err();
    assert!(err.contains("line 1"), "got: {err}");
}

#[test]
fn load_missing_file_is_none() {
    let dir = tempfile::tempdir().unwrap();
    let loaded = ChecksumManifest::load(&dir.path().join("absent.properties")).unwrap();
    assert!(loaded.is_none());
}

#[test]
fn load_reads_file_from_disk() {
    let file = write_temp(b"a/b=d41d8cd98f00b204e9800998ecf8427e\n");
    let manifest = ChecksumManifest::load(file.path()).unwrap().unwrap();
    assert_eq!(manifest.len(), 1);
}

#[test]
fn verify_reports_verified_and_mismatch() {
    let artifact = write_temp(b"hello world");
    let manifest = ChecksumManifest::parse(concat!(
        "good=5eb63bbbe01eeed093cb22bb8f5acdc3\n",
        "bad=00000000000000000000000000000000\n"
    ))
    .unwrap();

    assert_eq!(
        manifest.verify("good", artifact.path()).unwrap(),
        Verification::Verified
    );
    match manifest.verify("bad", artifact.path()).unwrap() {
        Verification::Mismatch { expected, actual } => {
            assert_eq!(expected, "00000000000000000000000000000000");
            assert_eq!(actual, "5eb63bbbe01eeed093cb22bb8f5acdc3");
        }
        other => panic!("expected mismatch, got {other:?}"),
    }
}

#[test]
fn verify_is_idempotent() {
    let artifact = write_temp(b"hello world");
    let manifest = ChecksumManifest::parse("a/b=00000000000000000000000000000000\n").unwrap();

    let first = manifest.verify("a/b", artifact.path()).unwrap();
    let second = manifest.verify("a/b", artifact.path()).unwrap();
    assert_eq!(first, second);
    assert!(matches!(first, Verification::Mismatch { .. }));
}

#[test]
fn verify_missing_entry_is_entry_missing() {
    let artifact = write_temp(b"x");
    let manifest = ChecksumManifest::parse("other=d41d8cd98f00b204e9800998ecf8427e\n").unwrap();
    assert_eq!(
        manifest.verify("not-listed", artifact.path()).unwrap(),
        Verification::EntryMissing
    );
}
