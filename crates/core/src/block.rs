// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-`(job, worker, block)` state and the per-worker worklist (spec.md §3, §6).

use crate::ids::BlockId;
use crate::status::UnknownStatus;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// State of a single block within one worker's worklist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum BlockState {
    New,
    Finding,
    Linking,
    Linked,
    Shredding,
    Shredded,
}

impl BlockState {
    pub const ALL: [BlockState; 6] = [
        Self::New,
        Self::Finding,
        Self::Linking,
        Self::Linked,
        Self::Shredding,
        Self::Shredded,
    ];
}

crate::simple_display! {
    BlockState {
        New => "new",
        Finding => "finding",
        Linking => "linking",
        Linked => "linked",
        Shredding => "shredding",
        Shredded => "shredded",
    }
}

impl FromStr for BlockState {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|state| state.to_string() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

impl From<BlockState> for String {
    fn from(state: BlockState) -> Self {
        state.to_string()
    }
}

impl TryFrom<String> for BlockState {
    type Error = UnknownStatus;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Per-`(job, worker)` mapping of block id to its current state.
///
/// Round-trips through JSON as a flat object (spec.md §6: "JSON object,
/// keys are block identifiers... values are state strings"). Backed by a
/// `BTreeMap` rather than a `HashMap` so serialization is deterministic —
/// useful for the byte-identical-up-to-key-ordering round-trip property
/// (spec.md §8) without relying on `serde_json`'s map ordering guarantees.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Worklist(pub BTreeMap<BlockId, BlockState>);

impl Worklist {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Build a freshly-discovered worklist: every block starts at `New`
    /// (spec.md §4.3 step 4).
    pub fn from_new_blocks(block_ids: impl IntoIterator<Item = BlockId>) -> Self {
        Self(block_ids.into_iter().map(|id| (id, BlockState::New)).collect())
    }

    pub fn get(&self, block_id: &str) -> Option<BlockState> {
        self.0.get(block_id).copied()
    }

    pub fn set(&mut self, block_id: &BlockId, state: BlockState) {
        self.0.insert(block_id.clone(), state);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&BlockId, &BlockState)> {
        self.0.iter()
    }

    /// True once every block in the list is in `state`.
    pub fn all_in_state(&self, state: BlockState) -> bool {
        !self.0.is_empty() && self.0.values().all(|s| *s == state)
    }

    pub fn serialize_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn deserialize_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

#[cfg(test)]
#[path = "block_tests.rs"]
mod tests;
