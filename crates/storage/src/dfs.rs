// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The DFS client collaborator (spec.md §1 names it out of core scope; this
//! trait fixes only the surface [`JobStore`](crate::job_store::JobStore)
//! needs: atomic create + rename over a shared directory tree, spec.md §4.1).

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DfsError {
    #[error("path not found: {0}")]
    NotFound(PathBuf),
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),
    #[error("expected a file but found a directory: {0}")]
    IsADirectory(PathBuf),
    #[error("io error at {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
}

impl DfsError {
    fn from_io(path: &Path, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io { path: path.to_path_buf(), source },
        }
    }

    /// Transient errors are worth retrying with backoff (spec.md §4.1,
    /// §7 "Transient DFS/lease I/O"). `NotFound` is a structural control
    /// signal, not a transient failure — callers like `read_worklist`
    /// and `get_master_status` read it as "absent" on the normal path
    /// (spec.md §4.4 "this data node holds no replicas"), so retrying it
    /// would turn every legitimate absence into a multi-attempt backoff
    /// spin. Permission and shape errors (wrong-type-at-path, permission
    /// denied) are likewise permanent — the calling agent invocation
    /// should fail fast instead of spinning.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Io { .. })
    }
}

/// Abstraction over the DFS's job-store directory tree.
///
/// The production backing is the real DFS client library (out of scope
/// per spec.md §1); [`LocalFsDfsClient`] is a concrete, fully functional
/// implementation over `std::fs` suitable for a single-node deployment
/// or for tests — same-filesystem `rename` is already atomic on POSIX,
/// which is exactly the guarantee spec.md §4.1 depends on.
pub trait DfsClient: Send + Sync {
    fn read_to_string(&self, path: &Path) -> Result<String, DfsError>;
    fn write_atomic(&self, path: &Path, contents: &str) -> Result<(), DfsError>;
    fn rename(&self, from: &Path, to: &Path) -> Result<(), DfsError>;
    fn create_dir_all(&self, path: &Path) -> Result<(), DfsError>;
    fn exists(&self, path: &Path) -> bool;
    fn is_file(&self, path: &Path) -> bool;
    /// Directory entry names, or `None` if the directory does not exist
    /// (spec.md §4.1 "Missing directory is not an error").
    fn list_dir(&self, path: &Path) -> Result<Option<Vec<String>>, DfsError>;
    /// Delete bypassing trash (spec.md §4.5 step 4): irreversible, frees
    /// the DFS's own block references immediately.
    fn remove_dir_all(&self, path: &Path) -> Result<(), DfsError>;
    /// Remove a single file. Missing file is not an error (idempotent
    /// cleanup, matching `remove_dir_all`).
    fn remove_file(&self, path: &Path) -> Result<(), DfsError>;
}

/// `std::fs`-backed [`DfsClient`].
#[derive(Debug, Clone, Default)]
pub struct LocalFsDfsClient;

impl DfsClient for LocalFsDfsClient {
    fn read_to_string(&self, path: &Path) -> Result<String, DfsError> {
        if path.is_dir() {
            return Err(DfsError::IsADirectory(path.to_path_buf()));
        }
        std::fs::read_to_string(path).map_err(|e| DfsError::from_io(path, e))
    }

    fn write_atomic(&self, path: &Path, contents: &str) -> Result<(), DfsError> {
        if let Some(parent) = path.parent() {
            self.create_dir_all(parent)?;
        }
        let tmp = path.with_extension(format!(
            "tmp.{}",
            std::process::id()
        ));
        std::fs::write(&tmp, contents).map_err(|e| DfsError::from_io(&tmp, e))?;
        std::fs::rename(&tmp, path).map_err(|e| DfsError::from_io(path, e))
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<(), DfsError> {
        if let Some(parent) = to.parent() {
            self.create_dir_all(parent)?;
        }
        std::fs::rename(from, to).map_err(|e| DfsError::from_io(from, e))
    }

    fn create_dir_all(&self, path: &Path) -> Result<(), DfsError> {
        std::fs::create_dir_all(path).map_err(|e| DfsError::from_io(path, e))
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn list_dir(&self, path: &Path) -> Result<Option<Vec<String>>, DfsError> {
        match std::fs::read_dir(path) {
            Ok(entries) => {
                let mut names = Vec::new();
                for entry in entries {
                    let entry = entry.map_err(|e| DfsError::from_io(path, e))?;
                    names.push(entry.file_name().to_string_lossy().into_owned());
                }
                Ok(Some(names))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(DfsError::from_io(path, e)),
        }
    }

    fn remove_dir_all(&self, path: &Path) -> Result<(), DfsError> {
        match std::fs::remove_dir_all(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(DfsError::from_io(path, e)),
        }
    }

    fn remove_file(&self, path: &Path) -> Result<(), DfsError> {
        match std::fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(DfsError::from_io(path, e)),
        }
    }
}

#[cfg(test)]
#[path = "dfs_tests.rs"]
mod tests;
