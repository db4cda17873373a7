// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration loading (spec.md §6 "Configuration").

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

fn default_lease_store_root() -> String {
    "/shred-leases".to_string()
}

fn default_dfs_shred_root() -> String {
    "/.shred".to_string()
}

fn default_local_shred_subdir() -> String {
    ".shred".to_string()
}

fn default_worker_sleep_minutes() -> u64 {
    10
}

fn default_block_search_root() -> PathBuf {
    PathBuf::from("/")
}

fn default_shred_passes() -> u32 {
    3
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_lease_store_namespace() -> String {
    "shred".to_string()
}

fn default_block_location_oracle_program() -> String {
    "hdfs".to_string()
}

fn default_block_location_oracle_args() -> Vec<String> {
    vec!["fsck".to_string(), "{path}".to_string(), "-files".to_string(), "-blocks".to_string(), "-locations".to_string()]
}

/// Recognized configuration options (spec.md §6).
///
/// Every field has a default except the two store-connection fields,
/// matching the original `config.py`'s pattern of shipping sane defaults
/// for everything except cluster-specific connection info.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Comma-separated host:port list for the consensus/lease service.
    pub lease_store_hosts: String,

    #[serde(default = "default_lease_store_root")]
    pub lease_store_root: String,

    #[serde(default = "default_dfs_shred_root")]
    pub dfs_shred_root: String,

    #[serde(default = "default_local_shred_subdir")]
    pub local_shred_subdir: String,

    #[serde(default = "default_worker_sleep_minutes")]
    pub worker_sleep_minutes: u64,

    #[serde(default = "default_block_search_root")]
    pub block_search_root: PathBuf,

    #[serde(default = "default_shred_passes")]
    pub shred_passes: u32,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Kubernetes namespace the `coordination.k8s.io/v1 Lease` objects
    /// backing [`shred_adapters::KubeLeaseStore`] live in.
    #[serde(default = "default_lease_store_namespace")]
    pub lease_store_namespace: String,

    /// Program invoked by [`shred_adapters::ProcessBlockLocationOracle`].
    #[serde(default = "default_block_location_oracle_program")]
    pub block_location_oracle_program: String,

    /// Arguments for the oracle program; `{path}` is replaced with the
    /// DFS path under inspection.
    #[serde(default = "default_block_location_oracle_args")]
    pub block_location_oracle_args: Vec<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },
    #[error("failed to parse config file {path}: {source}")]
    Parse { path: PathBuf, source: toml::de::Error },
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Lease duration for the non-blocking leases of §4.3/§4.5: exactly
    /// one `WORKER_SLEEP` period (spec.md §6).
    pub fn lease_duration(&self) -> Duration {
        Duration::from_secs(self.worker_sleep_minutes * 60)
    }

    /// Stall threshold for the completion leader's poll loop (spec.md §4.5
    /// step 2): `2 × WORKER_SLEEP`.
    pub fn stall_threshold(&self) -> Duration {
        self.lease_duration() * 2
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
