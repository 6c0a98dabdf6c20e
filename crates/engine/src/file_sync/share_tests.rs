// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[parameterized(
    nested = { "share://docs/2024/a.pdf", "docs/2024/a.pdf" },
    flat = { "share://a.pdf", "a.pdf" },
    current_dir = { "share://./docs/a.pdf", "docs/a.pdf" },
)]
fn resolves_inside_folder(uri: &str, relative: &str) {
    let folder = Path::new("/srv/share");
    assert_eq!(share_path(folder, uri).unwrap(), folder.join(relative));
}

#[parameterized(
    parent = { "share://../etc/passwd" },
    nested_parent = { "share://docs/../../x.pdf" },
    absolute = { "share:///etc/passwd" },
    empty = { "share://" },
)]
fn rejects_paths_leaving_folder(uri: &str) {
    let err = share_path(Path::new("/srv/share"), uri).unwrap_err();
    assert!(matches!(err, FileSyncError::OutsideShare { .. }), "{err}");
}

#[test]
fn rejects_other_schemes() {
    let err = share_path(Path::new("/srv/share"), "http://data.test/a.pdf").unwrap_err();
    assert!(matches!(err, FileSyncError::NotShareUri { .. }));
}

#[tokio::test]
async fn move_body_creates_target_directories() {
    let dir = tempfile::tempdir().unwrap();
    let from = dir.path().join("a.pdf");
    let to = dir.path().join("nested/dir/a.pdf");
    std::fs::write(&from, b"body").unwrap();

    move_body(&from, &to).await.unwrap();

    assert!(!from.exists());
    assert_eq!(std::fs::read(&to).unwrap(), b"body");
}

#[tokio::test]
async fn move_body_never_overwrites() {
    let dir = tempfile::tempdir().unwrap();
    let from = dir.path().join("a.pdf");
    let to = dir.path().join("b.pdf");
    std::fs::write(&from, b"new").unwrap();
    std::fs::write(&to, b"old").unwrap();

    let err = move_body(&from, &to).await.unwrap_err();

    assert!(matches!(err, FileSyncError::TargetExists { .. }));
    assert_eq!(std::fs::read(&to).unwrap(), b"old");
    assert!(from.exists());
}

#[tokio::test]
async fn move_body_accepts_an_earlier_move() {
    let dir = tempfile::tempdir().unwrap();
    let to = dir.path().join("b.pdf");
    std::fs::write(&to, b"moved").unwrap();
    move_body(&dir.path().join("a.pdf"), &to).await.unwrap();
    assert_eq!(std::fs::read(&to).unwrap(), b"moved");
}

#[tokio::test]
async fn move_body_without_source_or_target_fails() {
    let dir = tempfile::tempdir().unwrap();
    let err = move_body(&dir.path().join("a.pdf"), &dir.path().join("b.pdf")).await.unwrap_err();
    assert!(matches!(err, FileSyncError::Io { action: "moving", .. }));
}

#[tokio::test]
async fn delete_body_reports_missing_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a.pdf");
    std::fs::write(&path, b"body").unwrap();
    assert!(delete_body(&path).await.unwrap());
    assert!(!delete_body(&path).await.unwrap());
}
