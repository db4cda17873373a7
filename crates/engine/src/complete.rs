// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Completion leader pass (spec.md §4.5): `stage2copyblocks` →
//! `stage2leaderactive` → (poll) → `stage2readyForDelete` →
//! `stage2filesDeleted` → `stage2complete` → `stage3shredding`.
//!
//! Each invocation of this pass checks current state once and returns;
//! the "poll every `POLL` interval" of spec.md §4.5 step 2 is realized
//! across successive scheduled invocations of the same worker (spec.md
//! §5: agents are single-process, cron-invoked, not long-running loops).

use crate::discover::lease_path;
use crate::error::EngineError;
use shred_adapters::LeaseStore;
use shred_core::{BlockState, JobId, MasterStatus, WorkerId};
use shred_storage::{DfsClient, JobStore};
use std::time::Duration;
use tracing::{info, warn};

/// Run one completion-leader pass. Returns the jobs this invocation moved
/// to `stage3shredding`.
pub fn run_completion_pass<C: DfsClient>(
    store: &JobStore<C>,
    lease_store: &dyn LeaseStore,
    self_id: &WorkerId,
    lease_root: &str,
    lease_duration: Duration,
    worker_sleep: Duration,
    now_epoch_ms: u64,
) -> Result<Vec<JobId>, EngineError> {
    let mut advanced = Vec::new();
    for job_id in candidate_jobs(store)? {
        if complete_one_job(
            store,
            lease_store,
            self_id,
            lease_root,
            lease_duration,
            worker_sleep,
            now_epoch_ms,
            job_id,
        )? {
            advanced.push(job_id);
        }
    }
    Ok(advanced)
}

fn candidate_jobs<C: DfsClient>(store: &JobStore<C>) -> Result<Vec<JobId>, EngineError> {
    let mut jobs = store.get_jobs_by_status(MasterStatus::Stage2CopyBlocks)?;
    jobs.extend(store.get_jobs_by_status(MasterStatus::Stage2LeaderActive)?);
    Ok(jobs)
}

/// Holder identity for the completion-lease attempt, distinct from the
/// discovery-lease holder string even though the path is reused (spec.md
/// §9 open question: "lease identity distinguishes it from discovery").
fn completion_holder(self_id: &WorkerId) -> String {
    format!("{}:completion", self_id)
}

#[allow(clippy::too_many_arguments)]
fn complete_one_job<C: DfsClient>(
    store: &JobStore<C>,
    lease_store: &dyn LeaseStore,
    self_id: &WorkerId,
    lease_root: &str,
    lease_duration: Duration,
    worker_sleep: Duration,
    now_epoch_ms: u64,
    job_id: JobId,
) -> Result<bool, EngineError> {
    let master_status = store.get_master_status(job_id)?;

    match master_status {
        Some(MasterStatus::Stage2CopyBlocks) => {
            let Some(worklist) = store.read_worklist(job_id, self_id)? else { return Ok(false) };
            if !worklist.all_in_state(BlockState::Linked) {
                return Ok(false);
            }
        }
        Some(MasterStatus::Stage2LeaderActive) => {}
        _ => return Ok(false),
    }

    // Re-acquired every poll round (renews the same holder's claim): this
    // keeps the completion lease, not just its initial write, gating who
    // is allowed to drive a job's polling and deletion steps.
    let path = lease_path(lease_root, job_id);
    let holder = completion_holder(self_id);
    let acquired =
        lease_store.try_acquire(&path, &holder, lease_duration, now_epoch_ms).map_err(EngineError::Adapter)?;
    if !acquired {
        info!(%job_id, worker_id = %self_id, "beaten to completion lease by another worker");
        return Ok(false);
    }

    if master_status == Some(MasterStatus::Stage2CopyBlocks) {
        store.set_master_status(job_id, MasterStatus::Stage2LeaderActive)?;
        store.set_completion_leader_started_at(job_id, now_epoch_ms)?;
    }

    poll_and_maybe_finish(store, self_id, worker_sleep, now_epoch_ms, job_id)
}

fn poll_and_maybe_finish<C: DfsClient>(
    store: &JobStore<C>,
    self_id: &WorkerId,
    worker_sleep: Duration,
    now_epoch_ms: u64,
    job_id: JobId,
) -> Result<bool, EngineError> {
    let participants = store.list_worker_ids(job_id)?;
    let mut all_linked = true;

    for worker_id in &participants {
        let Some(worklist) = store.read_worklist(job_id, worker_id)? else { continue };
        if !worklist.all_in_state(BlockState::Linked) {
            all_linked = false;
            let started_at = store.get_completion_leader_started_at(job_id)?.unwrap_or(now_epoch_ms);
            let stall_threshold_ms = 2 * worker_sleep.as_millis() as u64;
            if now_epoch_ms.saturating_sub(started_at) > stall_threshold_ms {
                warn!(%job_id, %worker_id, "data node flagged stalled, no automatic fencing");
            } else {
                info!(%job_id, %worker_id, "waiting for data node to finish preserving blocks");
            }
        }
    }

    if !all_linked {
        return Ok(false);
    }

    info!(%job_id, worker_id = %self_id, "all participants linked, deleting job data");
    store.set_master_status(job_id, MasterStatus::Stage2ReadyForDelete)?;
    store.delete_data_dir(job_id)?;
    store.set_master_status(job_id, MasterStatus::Stage2FilesDeleted)?;
    store.set_master_status(job_id, MasterStatus::Stage2Complete)?;
    store.set_master_status(job_id, MasterStatus::Stage3Shredding)?;
    Ok(true)
}

#[cfg(test)]
#[path = "complete_tests.rs"]
mod tests;
