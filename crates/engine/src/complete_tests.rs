// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use shred_adapters::FakeLeaseStore;
use shred_core::{BlockId, Worklist};
use shred_storage::LocalFsDfsClient;

fn store(dir: &tempfile::TempDir) -> JobStore<LocalFsDfsClient> {
    JobStore::new(LocalFsDfsClient, dir.path())
}

fn seed_job(store: &JobStore<LocalFsDfsClient>, workers: &[(&str, BlockState)]) -> JobId {
    let job_id = JobId::new();
    store.set_master_status(job_id, MasterStatus::Stage2CopyBlocks).unwrap();
    for (worker, state) in workers {
        let mut worklist = Worklist::from_new_blocks([BlockId::new("blk_1")]);
        worklist.set(&BlockId::new("blk_1"), *state);
        store.write_worklist(job_id, &WorkerId::new(*worker), &worklist).unwrap();
    }
    job_id
}

#[test]
fn worker_whose_own_worklist_is_not_fully_linked_does_not_attempt_leadership() {
    let dir = tempfile::tempdir().unwrap();
    let store = store(&dir);
    let job_id = seed_job(&store, &[("10.0.0.1", BlockState::Linking)]);
    let lease_store = FakeLeaseStore::new();

    let advanced = run_completion_pass(
        &store,
        &lease_store,
        &WorkerId::new("10.0.0.1"),
        "/leases",
        Duration::from_secs(600),
        Duration::from_secs(60),
        0,
    )
    .unwrap();

    assert!(advanced.is_empty());
    assert_eq!(store.get_master_status(job_id).unwrap(), Some(MasterStatus::Stage2CopyBlocks));
}

#[test]
fn sole_participant_fully_linked_completes_in_one_pass() {
    let dir = tempfile::tempdir().unwrap();
    let store = store(&dir);
    let job_id = seed_job(&store, &[("10.0.0.1", BlockState::Linked)]);
    store
        .ingest_into_data_dir(job_id, &{
            let f = dir.path().join("payload");
            std::fs::write(&f, b"x").unwrap();
            f
        })
        .unwrap();
    let lease_store = FakeLeaseStore::new();

    let advanced = run_completion_pass(
        &store,
        &lease_store,
        &WorkerId::new("10.0.0.1"),
        "/leases",
        Duration::from_secs(600),
        Duration::from_secs(60),
        0,
    )
    .unwrap();

    assert_eq!(advanced, vec![job_id]);
    assert_eq!(store.get_master_status(job_id).unwrap(), Some(MasterStatus::Stage3Shredding));
    assert!(store.list_data_files(job_id).unwrap().is_empty());
}

#[test]
fn waits_while_a_participant_is_still_linking() {
    let dir = tempfile::tempdir().unwrap();
    let store = store(&dir);
    let job_id = seed_job(&store, &[("10.0.0.1", BlockState::Linked), ("10.0.0.2", BlockState::Linking)]);
    let lease_store = FakeLeaseStore::new();

    let advanced = run_completion_pass(
        &store,
        &lease_store,
        &WorkerId::new("10.0.0.1"),
        "/leases",
        Duration::from_secs(600),
        Duration::from_secs(60),
        0,
    )
    .unwrap();

    assert!(advanced.is_empty());
    assert_eq!(store.get_master_status(job_id).unwrap(), Some(MasterStatus::Stage2LeaderActive));
}

#[test]
fn leadership_is_exclusive_to_the_first_acquirer() {
    let dir = tempfile::tempdir().unwrap();
    let store = store(&dir);
    let job_id = seed_job(&store, &[("10.0.0.1", BlockState::Linked), ("10.0.0.2", BlockState::Linked)]);
    let lease_store = FakeLeaseStore::new();
    lease_store.try_acquire(&lease_path("/leases", job_id), "10.0.0.9:completion", Duration::from_secs(600), 0).unwrap();

    let advanced = run_completion_pass(
        &store,
        &lease_store,
        &WorkerId::new("10.0.0.1"),
        "/leases",
        Duration::from_secs(600),
        Duration::from_secs(60),
        0,
    )
    .unwrap();

    assert!(advanced.is_empty());
    assert_eq!(store.get_master_status(job_id).unwrap(), Some(MasterStatus::Stage2CopyBlocks));
}

#[test]
fn eventually_finishes_once_the_stalled_participant_catches_up() {
    let dir = tempfile::tempdir().unwrap();
    let store = store(&dir);
    let job_id = seed_job(&store, &[("10.0.0.1", BlockState::Linked), ("10.0.0.2", BlockState::Linking)]);
    let lease_store = FakeLeaseStore::new();

    run_completion_pass(
        &store,
        &lease_store,
        &WorkerId::new("10.0.0.1"),
        "/leases",
        Duration::from_secs(600),
        Duration::from_secs(60),
        0,
    )
    .unwrap();

    let mut worklist = store.read_worklist(job_id, &WorkerId::new("10.0.0.2")).unwrap().unwrap();
    worklist.set(&BlockId::new("blk_1"), BlockState::Linked);
    store.write_worklist(job_id, &WorkerId::new("10.0.0.2"), &worklist).unwrap();

    let advanced = run_completion_pass(
        &store,
        &lease_store,
        &WorkerId::new("10.0.0.1"),
        "/leases",
        Duration::from_secs(600),
        Duration::from_secs(60),
        120_001,
    )
    .unwrap();

    assert_eq!(advanced, vec![job_id]);
    assert_eq!(store.get_master_status(job_id).unwrap(), Some(MasterStatus::Stage3Shredding));
}
