// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker identity resolution (spec.md §3 "Worker identity", §9 Open
//! Questions). Grounded on the original's `get_worker_identity`:
//! `gethostbyname(gethostname())` — resolve the local hostname and take
//! its primary IP. Multihomed nodes may resolve incorrectly; callers
//! that need a stable identity on such nodes should override it via
//! configuration rather than relying on this default.

use crate::error::AdapterError;
use std::net::ToSocketAddrs;

pub fn resolve_default_worker_id() -> Result<String, AdapterError> {
    let hostname = hostname()?;
    let addrs: Vec<_> = (hostname.as_str(), 0)
        .to_socket_addrs()
        .map_err(|e| AdapterError::Identity(format!("failed to resolve {hostname}: {e}")))?
        .collect();

    addrs
        .into_iter()
        .map(|addr| addr.ip().to_string())
        .next()
        .ok_or_else(|| AdapterError::Identity(format!("{hostname} resolved to no addresses")))
}

fn hostname() -> Result<String, AdapterError> {
    hostname::get()
        .map_err(|e| AdapterError::Identity(format!("failed to read local hostname: {e}")))?
        .into_string()
        .map_err(|os| AdapterError::Identity(format!("hostname is not valid UTF-8: {os:?}")))
}

#[cfg(test)]
#[path = "identity_tests.rs"]
mod tests;
