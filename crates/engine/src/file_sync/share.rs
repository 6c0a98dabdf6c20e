// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! File bodies on the shared volume.
//!
//! `share://a/b.pdf` lives at `{file_folder}/a/b.pdf`. Paths never leave
//! the file folder and existing bodies are never overwritten.

use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};

use super::FileSyncError;

/// Local path of a `share://` URI, confined to `folder`.
pub(crate) fn share_path(folder: &Path, uri: &str) -> Result<PathBuf, FileSyncError> {
    let relative =
        uri.strip_prefix("share://").ok_or_else(|| FileSyncError::NotShareUri { uri: uri.to_string() })?;
    let outside = || FileSyncError::OutsideShare { uri: uri.to_string(), folder: folder.to_path_buf() };
    let mut path = folder.to_path_buf();
    let mut depth = 0;
    for component in Path::new(relative).components() {
        match component {
            Component::Normal(part) => {
                path.push(part);
                depth += 1;
            }
            Component::CurDir => {}
            _ => return Err(outside()),
        }
    }
    if depth == 0 {
        return Err(outside());
    }
    Ok(path)
}

fn io_error<'a>(
    action: &'static str,
    path: &'a Path,
) -> impl FnOnce(std::io::Error) -> FileSyncError + 'a {
    move |source| FileSyncError::Io { action, path: path.to_path_buf(), source }
}

pub(crate) async fn exists(path: &Path) -> Result<bool, FileSyncError> {
    tokio::fs::try_exists(path).await.map_err(io_error("inspecting", path))
}

/// Move a body to its remapped location.
///
/// A missing source with an existing target means an earlier pass already
/// moved it. An existing target is never replaced.
pub(crate) async fn move_body(from: &Path, to: &Path) -> Result<(), FileSyncError> {
    let source_exists = exists(from).await?;
    if exists(to).await? {
        if source_exists {
            return Err(FileSyncError::TargetExists { path: to.to_path_buf() });
        }
        debug!(to = %to.display(), "body already moved");
        return Ok(());
    }
    if let Some(parent) = to.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(io_error("creating", parent))?;
    }
    tokio::fs::rename(from, to).await.map_err(io_error("moving", from))?;
    info!(from = %from.display(), to = %to.display(), "moved file body");
    Ok(())
}

/// Delete a body. Returns `false` when it was already gone.
pub(crate) async fn delete_body(path: &Path) -> Result<bool, FileSyncError> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {
            info!(path = %path.display(), "removed file body");
            Ok(true)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(io_error("removing", path)(e)),
    }
}

#[cfg(test)]
#[path = "share_tests.rs"]
mod tests;
