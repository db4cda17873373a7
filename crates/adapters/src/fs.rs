// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Mount-point discovery (spec.md §4.4 "linking" step), grounded on the
//! original's `find_mount_point`: resolve symlinks, then walk up parents
//! until a directory's device differs from its parent's (the classic
//! `st_dev` boundary test — `os.path.ismount` does the equivalent on the
//! original's platform).

use crate::error::AdapterError;
use std::fs;
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Outcome of searching the local filesystem for a preserved block file
/// (spec.md §4.4 "new" step tie-break rule).
pub enum BlockSearchResult {
    NotFound,
    Unique(PathBuf),
    Multiple(Vec<PathBuf>),
}

/// Search `root` recursively for a file named exactly `block_id`.
pub fn find_block_file(root: &Path, block_id: &str) -> BlockSearchResult {
    let matches: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| entry.file_name().to_str() == Some(block_id))
        .map(|entry| entry.into_path())
        .collect();

    let mut matches = matches;
    match matches.len() {
        0 => BlockSearchResult::NotFound,
        1 => BlockSearchResult::Unique(matches.swap_remove(0)),
        _ => BlockSearchResult::Multiple(matches),
    }
}

/// Find the mount point containing `path`: the nearest ancestor whose
/// device differs from its own parent's device (or `/`, which is always
/// a mount point).
pub fn find_mount_point(path: &Path) -> Result<PathBuf, AdapterError> {
    let mut current = fs::canonicalize(path)
        .map_err(|e| AdapterError::Io { path: path.to_path_buf(), source: e })?;

    loop {
        if is_mount_point(&current)? {
            return Ok(current);
        }
        match current.parent() {
            Some(parent) => current = parent.to_path_buf(),
            None => return Ok(current),
        }
    }
}

fn is_mount_point(path: &Path) -> Result<bool, AdapterError> {
    let Some(parent) = path.parent() else { return Ok(true) };

    let here = fs::metadata(path).map_err(|e| AdapterError::Io { path: path.to_path_buf(), source: e })?;
    let up = fs::metadata(parent).map_err(|e| AdapterError::Io { path: parent.to_path_buf(), source: e })?;
    Ok(here.dev() != up.dev())
}

#[cfg(test)]
#[path = "fs_tests.rs"]
mod tests;
