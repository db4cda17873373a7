// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! shred-adapters: trait-based wrappers around the external collaborators
//! spec.md names but leaves out of core scope — the lease store, the
//! block-location oracle, and the shred primitive — plus worker identity
//! and mount-point discovery helpers.

pub mod error;
pub mod fs;
pub mod identity;
pub mod lease;
pub mod oracle;
pub mod shred_primitive;

pub use error::AdapterError;
pub use fs::{find_block_file, find_mount_point, BlockSearchResult};
pub use identity::resolve_default_worker_id;
pub use lease::{FakeLeaseStore, KubeLeaseStore, LeaseStore};
pub use oracle::{
    parse_oracle_report, BlockLocationOracle, BlockPlacement, FakeBlockLocationOracle,
    ProcessBlockLocationOracle,
};
pub use shred_primitive::{FakeShredPrimitive, ProcessShredPrimitive, ShredPrimitive};
