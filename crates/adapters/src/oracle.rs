// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The block-location oracle collaborator (spec.md §4.3 step 3, §6
//! "Block-location oracle"): an external subprocess that, given a DFS
//! path, prints a human-readable block report.
//!
//! The parser is line-oriented and consumes its input once (spec.md §9
//! re-architecture: "a lazy, finite, non-restartable sequence of byte
//! lines"), grounded on the original `parse_blocks_from_fsck`: a block
//! line starts with a digit, the block id sits between `:` and the next
//! space (generation suffix dropped), and each replica entry is a
//! `DatanodeInfoWithStorage[IP:PORT,...]` bracket group.

use crate::error::AdapterError;
use parking_lot::Mutex;
use shred_core::BlockId;
use std::collections::HashMap;
use std::io::{self, BufRead};
use std::process::{Command, Stdio};

/// Maps discovered replica locations for one DFS path to the blocks each
/// data node holds (spec.md §4.3 step 3: `data_node_id -> list<block_id>`).
pub type BlockPlacement = HashMap<String, Vec<BlockId>>;

pub trait BlockLocationOracle: Send + Sync {
    fn locate(&self, dfs_path: &str) -> Result<BlockPlacement, AdapterError>;
}

/// Shells out to a configurable report command (e.g. `hdfs fsck <path>
/// -files -blocks -locations`) and parses its stdout.
pub struct ProcessBlockLocationOracle {
    program: String,
    args_template: Vec<String>,
}

impl ProcessBlockLocationOracle {
    /// `args_template` is the fixed argument list with `{path}` as a
    /// placeholder for the target DFS path.
    pub fn new(program: impl Into<String>, args_template: Vec<String>) -> Self {
        Self { program: program.into(), args_template }
    }
}

impl BlockLocationOracle for ProcessBlockLocationOracle {
    fn locate(&self, dfs_path: &str) -> Result<BlockPlacement, AdapterError> {
        let args: Vec<String> =
            self.args_template.iter().map(|a| a.replace("{path}", dfs_path)).collect();

        let output = Command::new(&self.program)
            .args(&args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| AdapterError::Oracle(format!("failed to run {}: {e}", self.program)))?;

        if !output.status.success() {
            return Err(AdapterError::Oracle(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr)
            )));
        }

        let lines = output.stdout.lines();
        parse_oracle_report(lines)
    }
}

/// Parses a block report from a lazy, non-restartable line stream.
/// Skips non-block lines silently and tolerates leading/trailing
/// whitespace (spec.md §6).
pub fn parse_oracle_report(
    lines: impl Iterator<Item = io::Result<String>>,
) -> Result<BlockPlacement, AdapterError> {
    let mut placement: BlockPlacement = HashMap::new();

    for line in lines {
        let line = line.map_err(|e| AdapterError::Oracle(format!("failed to read report line: {e}")))?;
        let trimmed = line.trim();
        let Some(first) = trimmed.chars().next() else { continue };
        if !first.is_ascii_digit() {
            continue;
        }

        let Some((before_bracket, after_bracket)) = trimmed.split_once('[') else { continue };
        let Some(block_id) = extract_block_id(before_bracket) else { continue };

        for datanode_entry in extract_datanode_entries(after_bracket) {
            let Some((ip, _port)) = datanode_entry.split_once(':') else { continue };
            placement.entry(ip.to_string()).or_default().push(block_id.clone());
        }
    }

    Ok(placement)
}

/// `:<id>_<generation> ` → `<id>` (the generation suffix is dropped).
fn extract_block_id(segment: &str) -> Option<BlockId> {
    let after_colon = segment.split(':').nth(1)?;
    let token = after_colon.split_whitespace().next()?;
    let (id, _generation) = token.rsplit_once('_')?;
    Some(BlockId::new(id))
}

/// Every `DatanodeInfoWithStorage[...]` bracket group in the remainder
/// of the line (the first `[` was already consumed by the caller).
fn extract_datanode_entries(rest_of_line: &str) -> Vec<String> {
    let marker = "DatanodeInfoWithStorage[";
    let mut entries = Vec::new();
    let mut cursor = rest_of_line;
    while let Some(start) = cursor.find(marker) {
        let after_marker = &cursor[start + marker.len()..];
        let Some(end) = after_marker.find(']') else { break };
        entries.push(after_marker[..end].to_string());
        cursor = &after_marker[end + 1..];
    }
    entries
}

/// Records calls and returns a fixed placement (matches the teacher's
/// `FakeAgentAdapter` recording-fake idiom).
#[derive(Default)]
pub struct FakeBlockLocationOracle {
    placements: Mutex<HashMap<String, BlockPlacement>>,
    calls: Mutex<Vec<String>>,
}

impl FakeBlockLocationOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_placement(&self, dfs_path: impl Into<String>, placement: BlockPlacement) {
        self.placements.lock().insert(dfs_path.into(), placement);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

impl BlockLocationOracle for FakeBlockLocationOracle {
    fn locate(&self, dfs_path: &str) -> Result<BlockPlacement, AdapterError> {
        self.calls.lock().push(dfs_path.to_string());
        Ok(self.placements.lock().get(dfs_path).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
#[path = "oracle_tests.rs"]
mod tests;
