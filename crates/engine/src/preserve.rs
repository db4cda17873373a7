// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-worker preserve pass (spec.md §4.4): `new → finding → linking →
//! linked`, one step per block per invocation.

use crate::error::EngineError;
use shred_adapters::{find_block_file, find_mount_point, BlockSearchResult};
use shred_core::{BlockId, BlockState, JobId, MasterStatus, WorkerId, Worklist};
use shred_storage::{DfsClient, JobStore};
use std::path::Path;
use tracing::{error, info};

/// Run one preserve pass over every `stage2copyblocks` job that has a
/// worklist for `self_id`. Jobs with no worklist for this data node are
/// skipped (spec.md §4.4 "Absence → this data node has no replicas").
pub fn run_preserve_pass<C: DfsClient>(
    store: &JobStore<C>,
    self_id: &WorkerId,
    block_search_root: &Path,
    shred_subdir: &str,
) -> Result<(), EngineError> {
    for job_id in store.get_jobs_by_status(MasterStatus::Stage2CopyBlocks)? {
        let Some(mut worklist) = store.read_worklist(job_id, self_id)? else { continue };
        preserve_one_job(job_id, &mut worklist, block_search_root, shred_subdir);
        store.write_worklist(job_id, self_id, &worklist)?;
    }
    Ok(())
}

fn preserve_one_job(job_id: JobId, worklist: &mut Worklist, block_search_root: &Path, shred_subdir: &str) {
    let blocks: Vec<BlockId> = worklist.iter().map(|(id, _)| id.clone()).collect();
    for block_id in blocks {
        let Some(state) = worklist.get(block_id.as_str()) else { continue };
        let next = advance_block(job_id, &block_id, state, block_search_root, shred_subdir);
        if next != state {
            worklist.set(&block_id, next);
        }
    }
}

fn advance_block(
    job_id: JobId,
    block_id: &BlockId,
    state: BlockState,
    block_search_root: &Path,
    shred_subdir: &str,
) -> BlockState {
    match state {
        BlockState::New | BlockState::Finding => {
            match find_block_file(block_search_root, block_id.as_str()) {
                BlockSearchResult::NotFound => {
                    error!(%job_id, %block_id, "block not found on local disk, left in finding");
                    BlockState::Finding
                }
                BlockSearchResult::Unique(_) => BlockState::Linking,
                BlockSearchResult::Multiple(paths) => {
                    error!(%job_id, %block_id, matches = paths.len(), "multiple candidates for block, left in finding");
                    BlockState::Finding
                }
            }
        }
        BlockState::Linking => link_block(job_id, block_id, block_search_root, shred_subdir),
        other => other,
    }
}

fn link_block(job_id: JobId, block_id: &BlockId, block_search_root: &Path, shred_subdir: &str) -> BlockState {
    let found = match find_block_file(block_search_root, block_id.as_str()) {
        BlockSearchResult::Unique(path) => path,
        BlockSearchResult::NotFound => {
            error!(%job_id, %block_id, "block disappeared between finding and linking, left in linking");
            return BlockState::Linking;
        }
        BlockSearchResult::Multiple(paths) => {
            error!(%job_id, %block_id, matches = paths.len(), "multiple candidates reappeared during linking, left in linking");
            return BlockState::Linking;
        }
    };

    let mount_point = match find_mount_point(&found) {
        Ok(mp) => mp,
        Err(err) => {
            error!(%job_id, %block_id, error = %err, "mount point discovery failed, left in linking");
            return BlockState::Linking;
        }
    };

    let shred_dir = mount_point.join(shred_subdir);
    if let Err(err) = std::fs::create_dir_all(&shred_dir) {
        error!(%job_id, %block_id, error = %err, "failed to create shred subdir, left in linking");
        return BlockState::Linking;
    }

    let link_path = shred_dir.join(block_id.as_str());
    match std::fs::hard_link(&found, &link_path) {
        Ok(()) => {
            info!(%job_id, %block_id, "preserved block via hardlink");
            BlockState::Linked
        }
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
            // Idempotent rerun (P5): the hardlink from a previous pass is
            // already in place.
            BlockState::Linked
        }
        Err(err) => {
            error!(%job_id, %block_id, error = %err, "hardlink creation failed, left in linking");
            BlockState::Linking
        }
    }
}

#[cfg(test)]
#[path = "preserve_tests.rs"]
mod tests;
