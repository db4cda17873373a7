// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The consensus/lease store collaborator (spec.md §4.1, §6 "Lease
//! paths"): ephemeral, time-bounded leader leases keyed by a path.
//!
//! spec.md names this as an external ZooKeeper-class service left out of
//! scope. Grounded on the Kubernetes `coordination.k8s.io/v1 Lease` object
//! already reachable through this workspace's `kube`/`k8s-openapi`
//! dependency: a real, already-idiomatic "ephemeral time-bounded lease
//! keyed by a name" primitive, rather than a fabricated client for a
//! specific unnamed service.

use crate::error::AdapterError;
use k8s_openapi::api::coordination::v1::{Lease, LeaseSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{MicroTime, ObjectMeta};
use kube::api::{Api, Patch, PatchParams, PostParams};
use kube::Client;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;

/// Non-blocking, time-bounded leader election keyed by a path
/// (spec.md §4.1 step 1, §4.5 step 1). `try_acquire` never blocks: it
/// returns `Ok(false)` immediately if another holder's lease has not
/// yet expired (spec.md §5 "Leadership").
pub trait LeaseStore: Send + Sync {
    /// Attempt to become (or remain, if already) the holder of `path` for
    /// `duration`. `now_epoch_ms` is the caller's view of the current
    /// time, passed explicitly so tests can control expiry without real
    /// sleeps.
    fn try_acquire(
        &self,
        path: &str,
        holder: &str,
        duration: Duration,
        now_epoch_ms: u64,
    ) -> Result<bool, AdapterError>;
}

/// Lease store backed by Kubernetes `coordination.k8s.io/v1 Lease`
/// objects in a single namespace.
pub struct KubeLeaseStore {
    client: Client,
    namespace: String,
    runtime: tokio::runtime::Runtime,
}

impl KubeLeaseStore {
    pub fn new(client: Client, namespace: impl Into<String>) -> Result<Self, AdapterError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| AdapterError::Lease(format!("failed to start kube runtime: {e}")))?;
        Ok(Self { client, namespace: namespace.into(), runtime })
    }

    fn lease_name(path: &str) -> String {
        path.trim_start_matches('/').replace('/', "-")
    }
}

impl LeaseStore for KubeLeaseStore {
    fn try_acquire(
        &self,
        path: &str,
        holder: &str,
        duration: Duration,
        now_epoch_ms: u64,
    ) -> Result<bool, AdapterError> {
        let name = Self::lease_name(path);
        let api: Api<Lease> = Api::namespaced(self.client.clone(), &self.namespace);
        let now = epoch_ms_to_micro_time(now_epoch_ms);

        self.runtime.block_on(async {
            match api.get(&name).await {
                Ok(existing) => {
                    let spec = existing.spec.unwrap_or_default();
                    let held_by_other = spec.holder_identity.as_deref().is_some_and(|h| h != holder);
                    let expired = is_expired(&spec, now_epoch_ms);

                    if held_by_other && !expired {
                        return Ok(false);
                    }

                    let patch = Lease {
                        metadata: ObjectMeta { name: Some(name.clone()), ..Default::default() },
                        spec: Some(LeaseSpec {
                            holder_identity: Some(holder.to_string()),
                            lease_duration_seconds: Some(duration.as_secs() as i32),
                            acquire_time: Some(now.clone()),
                            renew_time: Some(now),
                            ..spec
                        }),
                    };
                    api.patch(&name, &PatchParams::apply("shred-coordinator"), &Patch::Apply(&patch))
                        .await
                        .map_err(|e| AdapterError::Lease(format!("failed to renew lease {name}: {e}")))?;
                    Ok(true)
                }
                Err(kube::Error::Api(err)) if err.code == 404 => {
                    let lease = Lease {
                        metadata: ObjectMeta { name: Some(name.clone()), ..Default::default() },
                        spec: Some(LeaseSpec {
                            holder_identity: Some(holder.to_string()),
                            lease_duration_seconds: Some(duration.as_secs() as i32),
                            acquire_time: Some(now.clone()),
                            renew_time: Some(now),
                            ..Default::default()
                        }),
                    };
                    api.create(&PostParams::default(), &lease)
                        .await
                        .map_err(|e| AdapterError::Lease(format!("failed to create lease {name}: {e}")))?;
                    Ok(true)
                }
                Err(e) => Err(AdapterError::Lease(format!("failed to read lease {name}: {e}"))),
            }
        })
    }
}

fn epoch_ms_to_micro_time(epoch_ms: u64) -> MicroTime {
    use chrono::{DateTime, Utc};
    let dt: DateTime<Utc> = DateTime::from_timestamp_millis(epoch_ms as i64).unwrap_or_else(Utc::now);
    MicroTime(dt)
}

fn is_expired(spec: &LeaseSpec, now_epoch_ms: u64) -> bool {
    let (Some(renew_time), Some(duration_secs)) = (&spec.renew_time, spec.lease_duration_seconds) else {
        return true;
    };
    let renewed_ms = renew_time.0.timestamp_millis().max(0) as u64;
    let expires_ms = renewed_ms.saturating_add(duration_secs as u64 * 1000);
    now_epoch_ms >= expires_ms
}

/// In-memory lease store for tests (matches the teacher's
/// fake-adapter-alongside-real-adapter idiom).
#[derive(Default)]
pub struct FakeLeaseStore {
    leases: Mutex<HashMap<String, FakeLease>>,
}

struct FakeLease {
    holder: String,
    expires_at_ms: u64,
}

impl FakeLeaseStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_holder(&self, path: &str) -> Option<String> {
        self.leases.lock().get(path).map(|l| l.holder.clone())
    }
}

impl LeaseStore for FakeLeaseStore {
    fn try_acquire(
        &self,
        path: &str,
        holder: &str,
        duration: Duration,
        now_epoch_ms: u64,
    ) -> Result<bool, AdapterError> {
        let mut leases = self.leases.lock();
        match leases.get(path) {
            Some(existing) if existing.holder != holder && now_epoch_ms < existing.expires_at_ms => {
                Ok(false)
            }
            _ => {
                leases.insert(
                    path.to_string(),
                    FakeLease {
                        holder: holder.to_string(),
                        expires_at_ms: now_epoch_ms + duration.as_millis() as u64,
                    },
                );
                Ok(true)
            }
        }
    }
}

#[cfg(test)]
#[path = "lease_tests.rs"]
mod tests;
