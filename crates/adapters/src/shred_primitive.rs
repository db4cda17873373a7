// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The shred primitive collaborator (spec.md §1, §4.6): a black-box
//! local-OS utility that overwrites a file's data blocks a configured
//! number of times and then unlinks it.

use crate::error::AdapterError;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::process::Command;

pub trait ShredPrimitive: Send + Sync {
    fn shred(&self, path: &Path, passes: u32) -> Result<(), AdapterError>;
}

/// Shells out to the system `shred` utility: `shred -n {passes} -u {path}`.
#[derive(Debug, Clone, Default)]
pub struct ProcessShredPrimitive;

impl ShredPrimitive for ProcessShredPrimitive {
    fn shred(&self, path: &Path, passes: u32) -> Result<(), AdapterError> {
        let status = Command::new("shred")
            .arg("-n")
            .arg(passes.to_string())
            .arg("-u")
            .arg(path)
            .status()
            .map_err(|e| AdapterError::Shred { path: path.to_path_buf(), reason: e.to_string() })?;

        if status.success() {
            Ok(())
        } else {
            Err(AdapterError::Shred {
                path: path.to_path_buf(),
                reason: format!("shred exited with {status}"),
            })
        }
    }
}

/// Records every call and deletes the file, standing in for the real
/// `shred` utility in tests (matches the teacher's recording-fake idiom).
#[derive(Default)]
pub struct FakeShredPrimitive {
    calls: Mutex<Vec<(PathBuf, u32)>>,
}

impl FakeShredPrimitive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<(PathBuf, u32)> {
        self.calls.lock().clone()
    }
}

impl ShredPrimitive for FakeShredPrimitive {
    fn shred(&self, path: &Path, passes: u32) -> Result<(), AdapterError> {
        self.calls.lock().push((path.to_path_buf(), passes));
        if path.exists() {
            std::fs::remove_file(path)
                .map_err(|e| AdapterError::Io { path: path.to_path_buf(), source: e })?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "shred_primitive_tests.rs"]
mod tests;
