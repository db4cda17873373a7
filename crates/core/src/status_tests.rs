// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use proptest::prelude::*;
use yare::parameterized;

#[parameterized(
    init = { MasterStatus::Stage1Init, "stage1init" },
    ingest = { MasterStatus::Stage1Ingest, "stage1ingest" },
    ingest_complete = { MasterStatus::Stage1IngestComplete, "stage1ingestComplete" },
    stage1_complete = { MasterStatus::Stage1Complete, "stage1complete" },
    prepare_blocklist = { MasterStatus::Stage2PrepareBlocklist, "stage2prepareBlocklist" },
    copyblocks = { MasterStatus::Stage2CopyBlocks, "stage2copyblocks" },
    leader_active = { MasterStatus::Stage2LeaderActive, "stage2leaderactive" },
    ready_for_delete = { MasterStatus::Stage2ReadyForDelete, "stage2readyForDelete" },
    files_deleted = { MasterStatus::Stage2FilesDeleted, "stage2filesDeleted" },
    stage2_complete = { MasterStatus::Stage2Complete, "stage2complete" },
    shredding = { MasterStatus::Stage3Shredding, "stage3shredding" },
    stage3_complete = { MasterStatus::Stage3Complete, "stage3complete" },
)]
fn master_status_round_trips_through_token(status: MasterStatus, token: &str) {
    assert_eq!(status.to_string(), token);
    assert_eq!(token.parse::<MasterStatus>().unwrap(), status);
}

#[test]
fn master_status_rejects_unknown_token() {
    let err = "bogus".parse::<MasterStatus>().unwrap_err();
    assert_eq!(err, UnknownStatus("bogus".to_string()));
}

#[test]
fn master_status_is_strictly_ordered_by_canonical_sequence() {
    for pair in MasterStatus::ALL.windows(2) {
        assert!(pair[0] < pair[1], "{:?} should precede {:?}", pair[0], pair[1]);
    }
}

#[test]
fn can_advance_to_allows_forward_and_same_rejects_backward() {
    let prepare = MasterStatus::Stage2PrepareBlocklist;
    let copy = MasterStatus::Stage2CopyBlocks;
    assert!(prepare.can_advance_to(&copy));
    assert!(prepare.can_advance_to(&prepare));
    assert!(!copy.can_advance_to(&prepare));
}

#[test]
fn only_stage3_complete_is_terminal() {
    assert!(MasterStatus::Stage3Complete.is_terminal());
    assert!(!MasterStatus::Stage2Complete.is_terminal());
}

#[test]
fn data_status_round_trips() {
    for status in DataStatus::ALL {
        assert_eq!(status.to_string().parse::<DataStatus>().unwrap(), status);
    }
}

#[test]
fn worker_status_only_recognizes_stage3_complete() {
    assert_eq!(
        "stage3complete".parse::<WorkerStatus>().unwrap(),
        WorkerStatus::Stage3Complete
    );
    assert!("stage1init".parse::<WorkerStatus>().is_err());
}

proptest! {
    /// P1: any forward walk through the canonical sequence stays monotone,
    /// and `can_advance_to` never permits stepping backward.
    #[test]
    fn p1_monotone_walk_never_regresses(
        indices in proptest::collection::vec(0usize..MasterStatus::ALL.len(), 1..20)
    ) {
        let mut sorted: Vec<usize> = indices;
        sorted.sort_unstable();
        let mut prev: Option<MasterStatus> = None;
        for idx in sorted {
            let status = MasterStatus::ALL[idx];
            if let Some(p) = prev {
                prop_assert!(p.can_advance_to(&status));
            }
            prev = Some(status);
        }
    }
}
