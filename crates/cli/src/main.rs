// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Entry point for the three agent invocations named in spec.md §6 ("CLI
//! surface"): `client`, `worker`, `shredder`. Each invocation is a single,
//! short-lived process meant to be driven by an external scheduler
//! (spec.md §5 "Scheduling model") — there is no long-running daemon here.

mod exit_error;

use clap::{Parser, Subcommand};
use exit_error::ExitError;
use shred_adapters::{
    resolve_default_worker_id, KubeLeaseStore, ProcessBlockLocationOracle, ProcessShredPrimitive,
};
use shred_core::{Config, WorkerId};
use shred_engine::{
    check_global_completion, ingest_target, run_completion_pass, run_discovery_pass, run_preserve_pass,
    run_shred_pass,
};
use shred_storage::{JobStore, LocalFsDfsClient};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "shred", version, about = "DFS block-shredding coordinator")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, global = true, default_value = "/etc/shred/shred.toml")]
    config: PathBuf,

    /// Override the worker identity otherwise resolved via hostname/IP
    /// lookup (spec.md §3 "Worker identity").
    #[arg(long, global = true)]
    worker_id: Option<String>,

    #[command(subcommand)]
    mode: Mode,
}

#[derive(Subcommand)]
enum Mode {
    /// Ingest a target file and create a new shred job.
    Client {
        /// Path to the file whose block replicas should be shredded.
        filename: PathBuf,
    },
    /// Run one discovery + preserve pass, then attempt completion leadership.
    Worker,
    /// Run one shredder pass over this data node's worklists.
    Shredder,
}

fn main() {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).with_target(false).compact().init();

    if let Err(err) = run() {
        eprintln!("error: {err}");
        let code = err.downcast_ref::<ExitError>().map_or(1, |e| e.code);
        std::process::exit(code);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load(&cli.config)
        .map_err(|e| ExitError::new(1, format!("failed to load config {}: {e}", cli.config.display())))?;

    let worker_id = match cli.worker_id {
        Some(id) => WorkerId::new(id),
        None => WorkerId::new(
            resolve_default_worker_id()
                .map_err(|e| ExitError::new(1, format!("failed to resolve worker identity: {e}")))?,
        ),
    };

    let store = JobStore::new(LocalFsDfsClient, config.dfs_shred_root.clone());

    match cli.mode {
        Mode::Client { filename } => {
            let job_id = ingest_target(&store, &filename)
                .map_err(|e| ExitError::new(1, format!("ingest failed: {e}")))?;
            println!("{job_id}");
            Ok(())
        }
        Mode::Worker => run_worker(&config, &store, &worker_id),
        Mode::Shredder => run_shredder(&config, &store, &worker_id),
    }
}

fn now_epoch_ms() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis() as u64).unwrap_or(0)
}

fn build_kube_lease_store(config: &Config) -> anyhow::Result<KubeLeaseStore> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| ExitError::new(1, format!("failed to start kube bootstrap runtime: {e}")))?;
    let client = runtime
        .block_on(kube::Client::try_default())
        .map_err(|e| ExitError::new(1, format!("failed to connect to Kubernetes API: {e}")))?;
    let lease_store = KubeLeaseStore::new(client, config.lease_store_namespace.clone())
        .map_err(|e| ExitError::new(1, format!("failed to initialize lease store: {e}")))?;
    Ok(lease_store)
}

fn run_worker(config: &Config, store: &JobStore<LocalFsDfsClient>, worker_id: &WorkerId) -> anyhow::Result<()> {
    let lease_store = build_kube_lease_store(config)?;
    let oracle =
        ProcessBlockLocationOracle::new(config.block_location_oracle_program.clone(), config.block_location_oracle_args.clone());
    let now = now_epoch_ms();

    run_discovery_pass(store, &lease_store, &oracle, &config.lease_store_root, worker_id, config.lease_duration(), now)
        .map_err(|e| ExitError::new(1, format!("discovery pass failed: {e}")))?;

    run_preserve_pass(store, worker_id, &config.block_search_root, &config.local_shred_subdir)
        .map_err(|e| ExitError::new(1, format!("preserve pass failed: {e}")))?;

    run_completion_pass(store, &lease_store, worker_id, &config.lease_store_root, config.lease_duration(), config.lease_duration(), now)
        .map_err(|e| ExitError::new(1, format!("completion pass failed: {e}")))?;

    // spec.md §4.6: global `stage3complete` aggregation is performed by the
    // next worker pass that observes the job, not the shredder pass.
    run_global_completion_sweep(store)
}

fn run_shredder(config: &Config, store: &JobStore<LocalFsDfsClient>, worker_id: &WorkerId) -> anyhow::Result<()> {
    let shred = ProcessShredPrimitive;
    run_shred_pass(store, worker_id, &shred, &config.block_search_root, config.shred_passes)
        .map_err(|e| ExitError::new(1, format!("shredder pass failed: {e}")))?;

    // Idempotent, so also safe (and useful) to run here: a job can finish
    // shredding on the very invocation that observes every worker complete.
    run_global_completion_sweep(store)
}

fn run_global_completion_sweep(store: &JobStore<LocalFsDfsClient>) -> anyhow::Result<()> {
    for job_id in store
        .get_jobs_by_status(shred_core::MasterStatus::Stage3Shredding)
        .map_err(|e| ExitError::new(1, format!("failed to enumerate shredding jobs: {e}")))?
    {
        check_global_completion(store, job_id)
            .map_err(|e| ExitError::new(1, format!("global completion check failed for {job_id}: {e}")))?;
    }

    Ok(())
}
