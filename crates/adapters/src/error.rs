// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("lease store error: {0}")]
    Lease(String),
    #[error("block-location oracle failed: {0}")]
    Oracle(String),
    #[error("shred primitive failed on {path}: {reason}")]
    Shred { path: PathBuf, reason: String },
    #[error("no mount point found above {0}")]
    NoMountPoint(PathBuf),
    #[error("could not resolve worker identity: {0}")]
    Identity(String),
    #[error("io error at {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
}
