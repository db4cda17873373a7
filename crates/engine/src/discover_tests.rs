// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use shred_adapters::{BlockPlacement, FakeBlockLocationOracle, FakeLeaseStore};
use shred_core::BlockId;
use shred_storage::LocalFsDfsClient;

fn store(dir: &tempfile::TempDir) -> JobStore<LocalFsDfsClient> {
    JobStore::new(LocalFsDfsClient, dir.path())
}

fn seed_job(store: &JobStore<LocalFsDfsClient>) -> JobId {
    let job_id = JobId::new();
    store.set_master_status(job_id, MasterStatus::Stage1Complete).unwrap();
    let data_dir = store.data_dir(job_id);
    std::fs::create_dir_all(&data_dir).unwrap();
    std::fs::write(data_dir.join("alice-x"), b"payload").unwrap();
    job_id
}

#[test]
fn discovers_blocks_and_writes_per_node_worklists() {
    let dir = tempfile::tempdir().unwrap();
    let store = store(&dir);
    let job_id = seed_job(&store);

    let target_path = store.list_data_files(job_id).unwrap().remove(0);
    let oracle = FakeBlockLocationOracle::new();
    let mut placement = BlockPlacement::new();
    placement.insert("10.0.0.1".to_string(), vec![BlockId::new("blk_1")]);
    placement.insert("10.0.0.2".to_string(), vec![BlockId::new("blk_1")]);
    oracle.set_placement(target_path.to_string_lossy(), placement);

    let lease_store = FakeLeaseStore::new();
    let self_id = WorkerId::new("10.0.0.1");

    let advanced = run_discovery_pass(
        &store,
        &lease_store,
        &oracle,
        "/leases",
        &self_id,
        Duration::from_secs(600),
        0,
    )
    .unwrap();

    assert_eq!(advanced, vec![job_id]);
    assert_eq!(store.get_master_status(job_id).unwrap(), Some(MasterStatus::Stage2CopyBlocks));

    for node in ["10.0.0.1", "10.0.0.2"] {
        let worklist = store.read_worklist(job_id, &WorkerId::new(node)).unwrap().unwrap();
        assert_eq!(worklist.get("blk_1"), Some(shred_core::BlockState::New));
    }
}

#[test]
fn skips_job_whose_lease_is_held_by_another_worker() {
    let dir = tempfile::tempdir().unwrap();
    let store = store(&dir);
    let job_id = seed_job(&store);

    let lease_store = FakeLeaseStore::new();
    lease_store.try_acquire(&lease_path("/leases", job_id), "10.0.0.9", Duration::from_secs(600), 0).unwrap();

    let oracle = FakeBlockLocationOracle::new();
    let self_id = WorkerId::new("10.0.0.1");

    let advanced =
        run_discovery_pass(&store, &lease_store, &oracle, "/leases", &self_id, Duration::from_secs(600), 0)
            .unwrap();

    assert!(advanced.is_empty());
    assert_eq!(store.get_master_status(job_id).unwrap(), Some(MasterStatus::Stage1Complete));
    assert!(oracle.calls().is_empty());
}

#[test]
fn no_stage1complete_jobs_is_a_no_op() {
    let dir = tempfile::tempdir().unwrap();
    let store = store(&dir);
    let lease_store = FakeLeaseStore::new();
    let oracle = FakeBlockLocationOracle::new();

    let advanced = run_discovery_pass(
        &store,
        &lease_store,
        &oracle,
        "/leases",
        &WorkerId::new("10.0.0.1"),
        Duration::from_secs(600),
        0,
    )
    .unwrap();
    assert!(advanced.is_empty());
}
