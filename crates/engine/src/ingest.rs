// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Client ingest pipeline (spec.md §4.2): single-shot, run once per user
//! request.

use crate::error::EngineError;
use shred_core::{DataStatus, JobId, MasterStatus};
use shred_storage::{DfsClient, JobStore};
use std::path::{Path, PathBuf};
use tracing::{error, info, instrument};

/// Step 1: canonicalize `target` and reject anything that is not an
/// existing file (directory, non-existent path, or symlink to either →
/// fail). Kept as a distinct, named pre-check so its failure is
/// attributable separately from the later rename-based capability check
/// (spec.md §4.2 step 4).
pub fn verify_target_is_file(target: &Path) -> Result<PathBuf, EngineError> {
    let canonical = std::fs::canonicalize(target)
        .map_err(|_| EngineError::TargetNotAFile(target.to_path_buf()))?;
    if canonical.is_file() {
        Ok(canonical)
    } else {
        Err(EngineError::TargetNotAFile(canonical))
    }
}

/// Ingest `target` into the system, returning the newly created job id.
///
/// On failure during the rename-based capability check (step 4), the
/// partially created job directory is removed: a job-validation failure
/// (not-a-file, permission denied) is fatal to the client invocation only
/// and leaves nothing behind (spec.md §7 "Job validation"; §8 scenario 6
/// "Wrong user"). Any other failure leaves a recoverable job for operator
/// review (spec.md §4.2 "Failure between any two writes").
#[instrument(skip(store), fields(target = %target.display()))]
pub fn ingest_target<C: DfsClient>(store: &JobStore<C>, target: &Path) -> Result<JobId, EngineError> {
    let canonical = verify_target_is_file(target)?;

    let job_id = JobId::new();
    store.set_master_status(job_id, MasterStatus::Stage1Init)?;
    store.set_data_status(job_id, DataStatus::Stage1Init)?;

    store.set_master_status(job_id, MasterStatus::Stage1Ingest)?;
    store.set_data_status(job_id, DataStatus::Stage1Ingest)?;

    if let Err(err) = store.ingest_into_data_dir(job_id, &canonical) {
        error!(%job_id, error = %err, "rename-based capability check failed, cleaning up job directory");
        if let Err(cleanup_err) = store.delete_job_record(job_id) {
            error!(%job_id, error = %cleanup_err, "failed to clean up partially created job directory");
        }
        return Err(err.into());
    }

    store.set_data_status(job_id, DataStatus::Stage1IngestComplete)?;
    store.set_master_status(job_id, MasterStatus::Stage1Complete)?;

    info!(%job_id, "ingest complete");
    Ok(job_id)
}

#[cfg(test)]
#[path = "ingest_tests.rs"]
mod tests;
