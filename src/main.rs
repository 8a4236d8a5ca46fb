//! Command-line entry point for scaleup-bench.
//!
//! # Usage Examples
//!
//! ```bash
//! # Ramp a search workload
//! scaleup-bench search \
//!   --base-url http://localhost:8000 \
//!   --search-collection observations \
//!   --search-parameter subject
//!
//! # Ramp updates across two hosts with basic auth
//! scaleup-bench update \
//!   --base-url http://a:8000,http://b:8000 \
//!   --credentials admin:password \
//!   --csv-out update.csv --summary-out update-summary.json
//! ```

use std::fs::File;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use scaleup_bench::cli::{Cli, Command, CommonOpts, CreateOpts, SearchOpts};
use scaleup_bench::harness::{Harness, SweepConfig};
use scaleup_bench::listing::HttpListingSource;
use scaleup_bench::pool::ResourcePool;
use scaleup_bench::report::CsvReportSink;
use scaleup_bench::target::HttpTarget;
use scaleup_bench::workload::{
    CreateWorkload, ReadWorkload, SearchWorkload, UpdateWorkload, Workload,
};

fn main() -> anyhow::Result<()> {
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

fn run() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Search { common, search } => {
            let (target, pool) = prepare(&common)?;
            let workloads = vec![search_workload(&target, &pool, &search)];
            run_sweep(&common, pool, workloads)
        }
        Command::Create { common, create } => {
            let (target, pool) = prepare(&common)?;
            let workloads = vec![create_workload(&target, &pool, &create)];
            run_sweep(&common, pool, workloads)
        }
        Command::Read { common } => {
            let (target, pool) = prepare(&common)?;
            let workloads: Vec<Box<dyn Workload>> =
                vec![Box::new(ReadWorkload::new(target, pool.clone()))];
            run_sweep(&common, pool, workloads)
        }
        Command::Update { common } => {
            let (target, pool) = prepare(&common)?;
            let workloads: Vec<Box<dyn Workload>> =
                vec![Box::new(UpdateWorkload::new(target, pool.clone()))];
            run_sweep(&common, pool, workloads)
        }
        Command::Mixed {
            common,
            search,
            create,
        } => {
            let (target, pool) = prepare(&common)?;
            let workloads: Vec<Box<dyn Workload>> = vec![
                search_workload(&target, &pool, &search),
                create_workload(&target, &pool, &create),
                Box::new(ReadWorkload::new(target.clone(), pool.clone())),
                Box::new(UpdateWorkload::new(target, pool.clone())),
            ];
            run_sweep(&common, pool, workloads)
        }
    }
}

/// Build the transport and seed the resource pool from the first base URL.
fn prepare(common: &CommonOpts) -> anyhow::Result<(Arc<HttpTarget>, Arc<ResourcePool>)> {
    let target = Arc::new(HttpTarget::new(
        common.base_urls.clone(),
        common.credentials.as_deref(),
    )?);
    let listing = HttpListingSource::new(target.client().clone(), common.base_urls[0].clone());
    let pool = ResourcePool::load(
        &listing,
        &common.pool_kind,
        common.pool_size,
        common.page_size,
    )
    .context("failed to seed the resource pool")?;
    Ok((target, Arc::new(pool)))
}

fn search_workload(
    target: &Arc<HttpTarget>,
    pool: &Arc<ResourcePool>,
    opts: &SearchOpts,
) -> Box<dyn Workload> {
    Box::new(SearchWorkload::new(
        target.clone(),
        pool.clone(),
        opts.search_collection.clone(),
        opts.search_parameter.clone(),
    ))
}

fn create_workload(
    target: &Arc<HttpTarget>,
    pool: &Arc<ResourcePool>,
    opts: &CreateOpts,
) -> Box<dyn Workload> {
    Box::new(CreateWorkload::new(
        target.clone(),
        pool.clone(),
        opts.create_collection.clone(),
    ))
}

fn run_sweep(
    common: &CommonOpts,
    pool: Arc<ResourcePool>,
    workloads: Vec<Box<dyn Workload>>,
) -> anyhow::Result<()> {
    let config = SweepConfig {
        max_concurrency: common.max_concurrency,
        repeats_per_level: common.repeats,
        iterations_per_worker: common.iterations,
    };

    let file = File::create(&common.csv_out)
        .with_context(|| format!("failed to create CSV report at {:?}", common.csv_out))?;
    let mut sink = CsvReportSink::new(file)?;

    let harness = Harness::new(pool, workloads, config);
    let summary = harness.run(&mut sink)?;

    if let Some(path) = &common.summary_out {
        let json = serde_json::to_string_pretty(&summary)
            .context("failed to serialize run summary")?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write run summary to {path:?}"))?;
    }
    Ok(())
}
