// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::dfs::DfsError;
use shred_core::UnknownStatus;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error(transparent)]
    Dfs(#[from] DfsError),
    #[error("worklist is not valid JSON: {0}")]
    WorklistJson(#[from] serde_json::Error),
    #[error(transparent)]
    UnknownStatus(#[from] UnknownStatus),
}

impl StorageError {
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Dfs(e) if e.is_transient())
    }
}
