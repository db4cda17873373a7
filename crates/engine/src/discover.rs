// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Block-discovery leader pass (spec.md §4.3).

use crate::error::EngineError;
use shred_adapters::{BlockLocationOracle, LeaseStore};
use shred_core::{JobId, MasterStatus, WorkerId, Worklist};
use shred_storage::{DfsClient, JobStore};
use std::time::Duration;
use tracing::{info, warn};

/// `{lease_root}/{job_id}`, reused across the discovery and completion
/// stages (spec.md §6 "Lease paths", §9 "reuse because lease durations
/// are sized so the two stages cannot overlap").
pub fn lease_path(lease_root: &str, job_id: JobId) -> String {
    format!("{}/{}", lease_root.trim_end_matches('/'), job_id)
}

/// Run one discovery pass: attempt every `stage1complete` job, skipping
/// any whose lease is currently held by another worker. Returns the jobs
/// this invocation successfully advanced to `stage2copyblocks`.
pub fn run_discovery_pass<C: DfsClient>(
    store: &JobStore<C>,
    lease_store: &dyn LeaseStore,
    oracle: &dyn BlockLocationOracle,
    lease_root: &str,
    self_id: &WorkerId,
    lease_duration: Duration,
    now_epoch_ms: u64,
) -> Result<Vec<JobId>, EngineError> {
    let mut advanced = Vec::new();
    for job_id in store.get_jobs_by_status(MasterStatus::Stage1Complete)? {
        if discover_one_job(store, lease_store, oracle, lease_root, self_id, lease_duration, now_epoch_ms, job_id)? {
            advanced.push(job_id);
        }
    }
    Ok(advanced)
}

#[allow(clippy::too_many_arguments)]
fn discover_one_job<C: DfsClient>(
    store: &JobStore<C>,
    lease_store: &dyn LeaseStore,
    oracle: &dyn BlockLocationOracle,
    lease_root: &str,
    self_id: &WorkerId,
    lease_duration: Duration,
    now_epoch_ms: u64,
    job_id: JobId,
) -> Result<bool, EngineError> {
    let path = lease_path(lease_root, job_id);
    let acquired = lease_store
        .try_acquire(&path, self_id.as_str(), lease_duration, now_epoch_ms)
        .map_err(EngineError::Adapter)?;
    if !acquired {
        info!(%job_id, worker_id = %self_id, "beaten to discovery lease by another worker");
        return Ok(false);
    }

    store.set_master_status(job_id, MasterStatus::Stage2PrepareBlocklist)?;

    let mut placement: std::collections::HashMap<String, Vec<shred_core::BlockId>> =
        std::collections::HashMap::new();
    for target in store.list_data_files(job_id)? {
        let dfs_path = target.to_string_lossy().into_owned();
        match oracle.locate(&dfs_path) {
            Ok(found) => {
                for (node, blocks) in found {
                    placement.entry(node).or_default().extend(blocks);
                }
            }
            Err(err) => {
                warn!(%job_id, %dfs_path, error = %err, "block-location oracle failed for target");
                return Err(EngineError::Adapter(err));
            }
        }
    }

    for (data_node_id, block_ids) in placement {
        let worklist = Worklist::from_new_blocks(block_ids);
        store.write_worklist(job_id, &WorkerId::from(data_node_id), &worklist)?;
    }

    store.set_master_status(job_id, MasterStatus::Stage2CopyBlocks)?;
    info!(%job_id, "discovery pass complete");
    Ok(true)
}

#[cfg(test)]
#[path = "discover_tests.rs"]
mod tests;
