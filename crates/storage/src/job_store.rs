// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job store: durable job records, per-worker worklists, and status files
//! on the DFS job-store directory tree (spec.md §4.1, §6).

use crate::dfs::DfsClient;
use crate::error::StorageError;
use crate::retry::{retry_transient, BackoffConfig};
use shred_core::{JobId, MasterStatus, Worklist, WorkerId};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Job store rooted at `{root}` (spec.md §6 `DFS_SHRED_ROOT`).
pub struct JobStore<C> {
    client: C,
    root: PathBuf,
    backoff: BackoffConfig,
}

impl<C: DfsClient> JobStore<C> {
    pub fn new(client: C, root: impl Into<PathBuf>) -> Self {
        Self { client, root: root.into(), backoff: BackoffConfig::default() }
    }

    pub fn with_backoff(mut self, backoff: BackoffConfig) -> Self {
        self.backoff = backoff;
        self
    }

    fn retry<T>(&self, op: impl FnMut() -> Result<T, StorageError>) -> Result<T, StorageError> {
        retry_transient(&self.backoff, StorageError::is_transient, op)
    }

    fn master_status_path(&self, job_id: JobId) -> PathBuf {
        self.root.join("jobs").join(job_id.to_string())
    }

    fn data_status_path(&self, job_id: JobId) -> PathBuf {
        self.root.join("store").join(job_id.to_string()).join("status")
    }

    fn worker_dir(&self, job_id: JobId, worker_id: &WorkerId) -> PathBuf {
        self.store_dir(job_id).join(worker_id.as_str())
    }

    fn worker_status_path(&self, job_id: JobId, worker_id: &WorkerId) -> PathBuf {
        self.worker_dir(job_id, worker_id).join("status")
    }

    /// spec.md §6 draws `{worker_id}` itself as the worklist file with
    /// `{worker_id}/status` nested under it; taken literally the two would
    /// collide on any filesystem that distinguishes files from
    /// directories. Nest both under `{worker_id}/` instead so the per-job
    /// worker namespace is consistently a directory.
    fn worklist_path(&self, job_id: JobId, worker_id: &WorkerId) -> PathBuf {
        self.worker_dir(job_id, worker_id).join("worklist")
    }

    /// `{root}/store/{job_id}/`
    pub fn store_dir(&self, job_id: JobId) -> PathBuf {
        self.root.join("store").join(job_id.to_string())
    }

    /// `{root}/store/{job_id}/data/`
    pub fn data_dir(&self, job_id: JobId) -> PathBuf {
        self.store_dir(job_id).join("data")
    }

    // --- master status ---

    pub fn set_master_status(&self, job_id: JobId, status: MasterStatus) -> Result<(), StorageError> {
        let path = self.master_status_path(job_id);
        debug!(%job_id, %status, "writing master status");
        self.retry(|| Ok(self.client.write_atomic(&path, &status.to_string())?))
    }

    pub fn get_master_status(&self, job_id: JobId) -> Result<Option<MasterStatus>, StorageError> {
        let path = self.master_status_path(job_id);
        match self.retry(|| Ok(self.client.read_to_string(&path)?)) {
            Ok(text) => Ok(Some(text.trim().parse()?)),
            Err(StorageError::Dfs(crate::dfs::DfsError::NotFound(_))) => Ok(None),
            Err(e) => Err(e),
        }
    }

    // --- data status ---

    pub fn set_data_status(&self, job_id: JobId, status: shred_core::DataStatus) -> Result<(), StorageError> {
        let path = self.data_status_path(job_id);
        self.retry(|| Ok(self.client.write_atomic(&path, &status.to_string())?))
    }

    // --- per-worker status ---

    pub fn set_worker_status(
        &self,
        job_id: JobId,
        worker_id: &WorkerId,
        status: shred_core::WorkerStatus,
    ) -> Result<(), StorageError> {
        let path = self.worker_status_path(job_id, worker_id);
        self.retry(|| Ok(self.client.write_atomic(&path, &status.to_string())?))
    }

    pub fn get_worker_status(
        &self,
        job_id: JobId,
        worker_id: &WorkerId,
    ) -> Result<Option<shred_core::WorkerStatus>, StorageError> {
        let path = self.worker_status_path(job_id, worker_id);
        match self.retry(|| Ok(self.client.read_to_string(&path)?)) {
            Ok(text) => Ok(Some(text.trim().parse()?)),
            Err(StorageError::Dfs(crate::dfs::DfsError::NotFound(_))) => Ok(None),
            Err(e) => Err(e),
        }
    }

    // --- job enumeration ---

    /// Enumerate `{root}/jobs/` and return the job IDs whose master status
    /// equals `target_status`. Missing directory is not an error (returns
    /// empty). Tolerates concurrent writers: entries with a filename that
    /// isn't a UUID, or content that isn't a recognized status token
    /// (a write-in-progress can momentarily race a reader on some DFS
    /// implementations), are logged and skipped rather than failing the
    /// whole enumeration (spec.md §4.1).
    pub fn get_jobs_by_status(&self, target_status: MasterStatus) -> Result<Vec<JobId>, StorageError> {
        let jobs_dir = self.root.join("jobs");
        let Some(names) = self.retry(|| Ok(self.client.list_dir(&jobs_dir)?))? else {
            return Ok(Vec::new());
        };

        let mut matches = Vec::new();
        for name in names {
            let Ok(job_id) = name.parse::<JobId>() else {
                warn!(entry = %name, "skipping non-UUID entry in jobs directory");
                continue;
            };
            match self.get_master_status(job_id) {
                Ok(Some(status)) if status == target_status => matches.push(job_id),
                Ok(_) => {}
                Err(e) => warn!(%job_id, error = %e, "skipping job with unreadable status"),
            }
        }
        Ok(matches)
    }

    // --- worklists ---

    /// `None` means this data node holds no replicas for the job
    /// (spec.md §4.4 "Absence → this data node has no replicas").
    pub fn read_worklist(
        &self,
        job_id: JobId,
        worker_id: &WorkerId,
    ) -> Result<Option<Worklist>, StorageError> {
        let path = self.worklist_path(job_id, worker_id);
        match self.retry(|| Ok(self.client.read_to_string(&path)?)) {
            Ok(text) => Ok(Some(Worklist::deserialize_json(&text)?)),
            Err(StorageError::Dfs(crate::dfs::DfsError::NotFound(_))) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Whole-file overwrite (spec.md §6 "no streaming/append semantics").
    pub fn write_worklist(
        &self,
        job_id: JobId,
        worker_id: &WorkerId,
        worklist: &Worklist,
    ) -> Result<(), StorageError> {
        let path = self.worklist_path(job_id, worker_id);
        let json = worklist.serialize_json()?;
        self.retry(|| Ok(self.client.write_atomic(&path, &json)?))
    }

    /// Data nodes participating in `job_id`: every worker directory under
    /// its store directory other than `data/`, `status`, and
    /// `leader_started_at` (the non-worker bookkeeping entries also kept
    /// directly under the store directory; spec.md §4.5 step 2 polls
    /// "every data node in the job's participating set").
    pub fn list_worker_ids(&self, job_id: JobId) -> Result<Vec<WorkerId>, StorageError> {
        let store_dir = self.store_dir(job_id);
        let names = self.retry(|| Ok(self.client.list_dir(&store_dir)?))?.unwrap_or_default();
        Ok(names
            .into_iter()
            .filter(|n| n != "data" && n != "status" && n != "leader_started_at")
            .map(WorkerId::new)
            .collect())
    }

    // --- completion leader bookkeeping ---

    fn leader_started_at_path(&self, job_id: JobId) -> PathBuf {
        self.store_dir(job_id).join("leader_started_at")
    }

    /// Epoch-millisecond timestamp at which the completion leader first
    /// wrote `stage2leaderactive` for this job, used to measure the
    /// `2 * WORKER_SLEEP` stall threshold (spec.md §4.5 step 2). Not part
    /// of spec.md §6's wire layout; a bookkeeping file private to this
    /// implementation.
    pub fn get_completion_leader_started_at(&self, job_id: JobId) -> Result<Option<u64>, StorageError> {
        let path = self.leader_started_at_path(job_id);
        match self.retry(|| Ok(self.client.read_to_string(&path)?)) {
            Ok(text) => Ok(Some(text.trim().parse().unwrap_or(0))),
            Err(StorageError::Dfs(crate::dfs::DfsError::NotFound(_))) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn set_completion_leader_started_at(&self, job_id: JobId, epoch_ms: u64) -> Result<(), StorageError> {
        let path = self.leader_started_at_path(job_id);
        self.retry(|| Ok(self.client.write_atomic(&path, &epoch_ms.to_string())?))
    }

    // --- ingest / data directory lifecycle ---

    /// Rename `target` into `{root}/store/{job_id}/data/` (the capability
    /// check of spec.md §4.2 step 4 — this call fails if the invoking
    /// user cannot rename `target`).
    pub fn ingest_into_data_dir(&self, job_id: JobId, target: &Path) -> Result<(), StorageError> {
        let data_dir = self.data_dir(job_id);
        self.client.create_dir_all(&data_dir)?;
        let file_name = target
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(job_id.to_string()));
        let dest = data_dir.join(file_name);
        self.client.rename(target, &dest)?;
        Ok(())
    }

    pub fn list_data_files(&self, job_id: JobId) -> Result<Vec<PathBuf>, StorageError> {
        let data_dir = self.data_dir(job_id);
        let names = self.retry(|| Ok(self.client.list_dir(&data_dir)?))?.unwrap_or_default();
        Ok(names.into_iter().map(|n| data_dir.join(n)).collect())
    }

    /// DFS-level delete bypassing trash (spec.md §4.5 step 4).
    pub fn delete_data_dir(&self, job_id: JobId) -> Result<(), StorageError> {
        Ok(self.client.remove_dir_all(&self.data_dir(job_id))?)
    }

    /// Remove every trace of a job: its store directory (data, worklists,
    /// per-worker status) and its master status file. Used to roll back a
    /// job-validation failure during ingest so nothing is left behind
    /// (spec.md §7 "Job validation", §8 scenario 6 "Wrong user").
    pub fn delete_job_record(&self, job_id: JobId) -> Result<(), StorageError> {
        self.client.remove_dir_all(&self.store_dir(job_id))?;
        self.client.remove_file(&self.master_status_path(job_id))?;
        Ok(())
    }

    /// Move a completed job's store directory to a `completed/` sibling
    /// (spec.md §3 "Lifecycle" — "implementation choice").
    pub fn archive_completed_job(&self, job_id: JobId) -> Result<(), StorageError> {
        let from = self.store_dir(job_id);
        let to = self.root.join("completed").join(job_id.to_string());
        self.client.rename(&from, &to)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "job_store_tests.rs"]
mod tests;
