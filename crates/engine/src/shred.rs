// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shredder pass (spec.md §4.6): per data node, `linked → shredding →
//! shredded`; once every entry for a job is `shredded`, writes this
//! worker's `stage3complete`. Separately, [`check_global_completion`]
//! aggregates every participant's per-worker status into the master
//! record's `stage3complete` (spec.md §4.6 "performed by the next worker
//! pass that observes the job; idempotent").

use crate::error::EngineError;
use shred_adapters::{find_block_file, BlockSearchResult, ShredPrimitive};
use shred_core::{BlockState, JobId, MasterStatus, WorkerId, WorkerStatus};
use shred_storage::{DfsClient, JobStore};
use std::path::Path;
use tracing::{error, info};

/// Run one shredder pass over every `stage3shredding` job that has a
/// worklist for `self_id`. `block_search_root` is the same root the
/// preserve pass searched (spec.md §4.4): by this stage the DFS original
/// is gone, so the only remaining file named `block_id` under it is the
/// preserved hardlink (spec.md §4.6 step 2).
pub fn run_shred_pass<C: DfsClient>(
    store: &JobStore<C>,
    self_id: &WorkerId,
    shred: &dyn ShredPrimitive,
    block_search_root: &Path,
    shred_passes: u32,
) -> Result<(), EngineError> {
    for job_id in store.get_jobs_by_status(MasterStatus::Stage3Shredding)? {
        let Some(mut worklist) = store.read_worklist(job_id, self_id)? else { continue };
        let mut changed = false;

        let blocks: Vec<_> = worklist.iter().map(|(id, state)| (id.clone(), *state)).collect();
        for (block_id, state) in blocks {
            if state != BlockState::Linked && state != BlockState::Shredding {
                continue;
            }
            changed = true;
            worklist.set(&block_id, BlockState::Shredding);

            match find_block_file(block_search_root, block_id.as_str()) {
                BlockSearchResult::Unique(link_path) => match shred.shred(&link_path, shred_passes) {
                    Ok(()) => {
                        worklist.set(&block_id, BlockState::Shredded);
                        info!(%job_id, %block_id, "block shredded");
                    }
                    Err(err) => {
                        error!(%job_id, %block_id, error = %err, "shred primitive failed, left in shredding");
                    }
                },
                BlockSearchResult::NotFound => {
                    error!(%job_id, %block_id, "preserved hardlink not found, left in shredding");
                }
                BlockSearchResult::Multiple(paths) => {
                    error!(%job_id, %block_id, matches = paths.len(), "multiple hardlinks found, left in shredding");
                }
            }
        }

        if changed {
            store.write_worklist(job_id, self_id, &worklist)?;
        }

        if worklist.all_in_state(BlockState::Shredded) {
            store.set_worker_status(job_id, self_id, WorkerStatus::Stage3Complete)?;
            info!(%job_id, worker_id = %self_id, "worker-level shredding complete");
        }
    }
    Ok(())
}

/// Idempotent global-completion check: if every participating data node's
/// per-worker status is `stage3complete`, advance the master record to
/// `stage3complete` and archive the job's store directory. Any worker may
/// perform this (spec.md §4.6).
pub fn check_global_completion<C: DfsClient>(store: &JobStore<C>, job_id: JobId) -> Result<bool, EngineError> {
    if store.get_master_status(job_id)? != Some(MasterStatus::Stage3Shredding) {
        return Ok(false);
    }

    let participants = store.list_worker_ids(job_id)?;
    if participants.is_empty() {
        return Ok(false);
    }

    for worker_id in &participants {
        if store.get_worker_status(job_id, worker_id)? != Some(WorkerStatus::Stage3Complete) {
            return Ok(false);
        }
    }

    store.set_master_status(job_id, MasterStatus::Stage3Complete)?;
    store.archive_completed_job(job_id)?;
    info!(%job_id, "job fully shredded, archived");
    Ok(true)
}

#[cfg(test)]
#[path = "shred_tests.rs"]
mod tests;
