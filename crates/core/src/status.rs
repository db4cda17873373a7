// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Closed status enums for the job state machine (spec.md §3).
//!
//! Status tokens are never free-form strings on the wire: every reader
//! parses through [`MasterStatus::from_str`]/[`DataStatus::from_str`] and
//! rejects anything it doesn't recognize (REDESIGN FLAGS §9).

use std::str::FromStr;
use thiserror::Error;

/// The job's single global stage, strictly monotone (invariant 1).
///
/// `Stage2LeaderActive` sits between `Stage2CopyBlocks` and
/// `Stage2ReadyForDelete`: spec.md §4.5 step 1 has the completion leader
/// write it, even though §3's canonical list elides it. Treated here as a
/// first-class stage so monotonicity checks (P1) don't reject it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MasterStatus {
    Stage1Init,
    Stage1Ingest,
    Stage1IngestComplete,
    Stage1Complete,
    Stage2PrepareBlocklist,
    Stage2CopyBlocks,
    Stage2LeaderActive,
    Stage2ReadyForDelete,
    Stage2FilesDeleted,
    Stage2Complete,
    Stage3Shredding,
    Stage3Complete,
}

impl MasterStatus {
    pub const ALL: [MasterStatus; 12] = [
        Self::Stage1Init,
        Self::Stage1Ingest,
        Self::Stage1IngestComplete,
        Self::Stage1Complete,
        Self::Stage2PrepareBlocklist,
        Self::Stage2CopyBlocks,
        Self::Stage2LeaderActive,
        Self::Stage2ReadyForDelete,
        Self::Stage2FilesDeleted,
        Self::Stage2Complete,
        Self::Stage3Shredding,
        Self::Stage3Complete,
    ];

    /// True if moving from `self` to `next` respects invariant 1
    /// (never backwards). Equal is allowed: overwriting with the same
    /// token is how a crashed-and-resumed pass observes "already here".
    pub fn can_advance_to(&self, next: &Self) -> bool {
        next >= self
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Stage3Complete)
    }
}

crate::simple_display! {
    MasterStatus {
        Stage1Init => "stage1init",
        Stage1Ingest => "stage1ingest",
        Stage1IngestComplete => "stage1ingestComplete",
        Stage1Complete => "stage1complete",
        Stage2PrepareBlocklist => "stage2prepareBlocklist",
        Stage2CopyBlocks => "stage2copyblocks",
        Stage2LeaderActive => "stage2leaderactive",
        Stage2ReadyForDelete => "stage2readyForDelete",
        Stage2FilesDeleted => "stage2filesDeleted",
        Stage2Complete => "stage2complete",
        Stage3Shredding => "stage3shredding",
        Stage3Complete => "stage3complete",
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unrecognized status token: {0:?}")]
pub struct UnknownStatus(pub String);

impl FromStr for MasterStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.to_string() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

/// Status of the ingested payload (spec.md §3 "data" status track).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DataStatus {
    Stage1Init,
    Stage1Ingest,
    Stage1IngestComplete,
}

impl DataStatus {
    pub const ALL: [DataStatus; 3] = [
        Self::Stage1Init,
        Self::Stage1Ingest,
        Self::Stage1IngestComplete,
    ];
}

crate::simple_display! {
    DataStatus {
        Stage1Init => "stage1init",
        Stage1Ingest => "stage1ingest",
        Stage1IngestComplete => "stage1ingestComplete",
    }
}

impl FromStr for DataStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.to_string() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

/// Per-worker status track (`{root}/store/{job_id}/{worker_id}/status`).
///
/// Distinct from [`MasterStatus`]: a worker only ever writes `Stage3Complete`
/// here, once every block it owns has been shredded (spec.md §4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkerStatus {
    Stage3Complete,
}

crate::simple_display! {
    WorkerStatus {
        Stage3Complete => "stage3complete",
    }
}

impl FromStr for WorkerStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "stage3complete" {
            Ok(Self::Stage3Complete)
        } else {
            Err(UnknownStatus(s.to_string()))
        }
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
