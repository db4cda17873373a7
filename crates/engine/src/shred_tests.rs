// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use shred_adapters::FakeShredPrimitive;
use shred_core::{BlockId, Worklist};
use shred_storage::LocalFsDfsClient;

fn store(dir: &tempfile::TempDir) -> JobStore<LocalFsDfsClient> {
    JobStore::new(LocalFsDfsClient, dir.path())
}

#[test]
fn linked_block_advances_to_shredded_and_invokes_the_primitive() {
    let dir = tempfile::tempdir().unwrap();
    let store = store(&dir);
    let job_id = JobId::new();
    let worker = WorkerId::new("10.0.0.1");
    let search_root = dir.path().join("search-root");
    std::fs::create_dir_all(&search_root).unwrap();
    std::fs::write(search_root.join("blk_1"), b"x").unwrap();

    let mut worklist = Worklist::from_new_blocks([BlockId::new("blk_1")]);
    worklist.set(&BlockId::new("blk_1"), BlockState::Linked);
    store.write_worklist(job_id, &worker, &worklist).unwrap();
    store.set_master_status(job_id, MasterStatus::Stage3Shredding).unwrap();

    let shred = FakeShredPrimitive::new();
    run_shred_pass(&store, &worker, &shred, &search_root, 3).unwrap();

    let got = store.read_worklist(job_id, &worker).unwrap().unwrap();
    assert_eq!(got.get("blk_1"), Some(BlockState::Shredded));
    assert_eq!(shred.calls(), vec![(search_root.join("blk_1"), 3)]);
    assert!(!search_root.join("blk_1").exists());
    assert_eq!(store.get_worker_status(job_id, &worker).unwrap(), Some(WorkerStatus::Stage3Complete));
}

#[test]
fn missing_hardlink_is_left_in_shredding() {
    let dir = tempfile::tempdir().unwrap();
    let store = store(&dir);
    let job_id = JobId::new();
    let worker = WorkerId::new("10.0.0.1");
    let search_root = dir.path().join("search-root");
    std::fs::create_dir_all(&search_root).unwrap();

    let mut worklist = Worklist::from_new_blocks([BlockId::new("blk_gone")]);
    worklist.set(&BlockId::new("blk_gone"), BlockState::Linked);
    store.write_worklist(job_id, &worker, &worklist).unwrap();
    store.set_master_status(job_id, MasterStatus::Stage3Shredding).unwrap();

    let shred = FakeShredPrimitive::new();
    run_shred_pass(&store, &worker, &shred, &search_root, 3).unwrap();

    let got = store.read_worklist(job_id, &worker).unwrap().unwrap();
    assert_eq!(got.get("blk_gone"), Some(BlockState::Shredding));
    assert_eq!(store.get_worker_status(job_id, &worker).unwrap(), None);
}

#[test]
fn worker_status_not_written_until_every_block_shredded() {
    let dir = tempfile::tempdir().unwrap();
    let store = store(&dir);
    let job_id = JobId::new();
    let worker = WorkerId::new("10.0.0.1");
    let search_root = dir.path().join("search-root");
    std::fs::create_dir_all(&search_root).unwrap();
    std::fs::write(search_root.join("blk_1"), b"x").unwrap();

    let mut worklist = Worklist::from_new_blocks([BlockId::new("blk_1"), BlockId::new("blk_2")]);
    worklist.set(&BlockId::new("blk_1"), BlockState::Linked);
    worklist.set(&BlockId::new("blk_2"), BlockState::Linked);
    store.write_worklist(job_id, &worker, &worklist).unwrap();
    store.set_master_status(job_id, MasterStatus::Stage3Shredding).unwrap();

    let shred = FakeShredPrimitive::new();
    run_shred_pass(&store, &worker, &shred, &search_root, 3).unwrap();

    assert_eq!(store.get_worker_status(job_id, &worker).unwrap(), None);
}

#[test]
fn check_global_completion_waits_for_every_participant() {
    let dir = tempfile::tempdir().unwrap();
    let store = store(&dir);
    let job_id = JobId::new();
    store.set_master_status(job_id, MasterStatus::Stage3Shredding).unwrap();
    store
        .write_worklist(job_id, &WorkerId::new("10.0.0.1"), &Worklist::from_new_blocks([BlockId::new("blk_1")]))
        .unwrap();
    store
        .write_worklist(job_id, &WorkerId::new("10.0.0.2"), &Worklist::from_new_blocks([BlockId::new("blk_1")]))
        .unwrap();
    store.set_worker_status(job_id, &WorkerId::new("10.0.0.1"), WorkerStatus::Stage3Complete).unwrap();

    assert!(!check_global_completion(&store, job_id).unwrap());
    assert_eq!(store.get_master_status(job_id).unwrap(), Some(MasterStatus::Stage3Shredding));

    store.set_worker_status(job_id, &WorkerId::new("10.0.0.2"), WorkerStatus::Stage3Complete).unwrap();

    assert!(check_global_completion(&store, job_id).unwrap());
    assert_eq!(store.get_master_status(job_id).unwrap(), Some(MasterStatus::Stage3Complete));
    assert!(!store.store_dir(job_id).exists());
}

#[test]
fn check_global_completion_on_already_complete_job_is_a_no_op() {
    let dir = tempfile::tempdir().unwrap();
    let store = store(&dir);
    let job_id = JobId::new();
    store.set_master_status(job_id, MasterStatus::Stage3Complete).unwrap();

    assert!(!check_global_completion(&store, job_id).unwrap());
}
