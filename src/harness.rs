//! Pass scheduler: the concurrency sweep driving workloads through scoped
//! worker threads.
//!
//! For every concurrency level `c` in `1..max_concurrency` the harness runs
//! `repeats_per_level` passes, each spawning a fresh scope of exactly `c`
//! OS threads. The scope join is the barrier between passes: pass `c+1`
//! never starts before pass `c` fully drains, and a fresh scope per pass
//! isolates each level's contention instead of reusing a warm pool.

use std::sync::Arc;
use std::thread;
use std::time::Instant;

use anyhow::{bail, Context};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::metrics::PassMetrics;
use crate::pool::ResourcePool;
use crate::report::{PassReport, ReportSink};
use crate::shared::{ErrorCounter, RoundRobin};
use crate::workload::{Workload, WorkloadError};

/// Sweep bounds for one harness run.
#[derive(Debug, Clone, Serialize)]
pub struct SweepConfig {
    /// Exclusive upper bound on concurrency: passes run at
    /// `1..max_concurrency` workers.
    pub max_concurrency: usize,
    /// Repeated passes at each concurrency level.
    pub repeats_per_level: u32,
    /// Iterations each worker performs within a pass.
    pub iterations_per_worker: u32,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 100,
            repeats_per_level: 3,
            iterations_per_worker: 10,
        }
    }
}

impl SweepConfig {
    pub fn total_passes(&self) -> u64 {
        (self.max_concurrency as u64 - 1) * u64::from(self.repeats_per_level)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.max_concurrency < 2 {
            bail!(
                "max-concurrency must be at least 2, got {}",
                self.max_concurrency
            );
        }
        if self.repeats_per_level == 0 {
            bail!("repeats-per-level must be positive");
        }
        if self.iterations_per_worker == 0 {
            bail!("iterations-per-worker must be positive");
        }
        Ok(())
    }
}

/// Whole-run totals, serializable to JSON after the sweep.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub passes: u64,
    pub total_ops: u64,
    pub cumulative_errors: u64,
}

pub struct Harness {
    pool: Arc<ResourcePool>,
    workloads: Vec<Box<dyn Workload>>,
    dispatch: RoundRobin,
    errors: ErrorCounter,
    config: SweepConfig,
}

impl Harness {
    pub fn new(
        pool: Arc<ResourcePool>,
        workloads: Vec<Box<dyn Workload>>,
        config: SweepConfig,
    ) -> Self {
        Self {
            pool,
            workloads,
            dispatch: RoundRobin::new(),
            errors: ErrorCounter::new(),
            config,
        }
    }

    /// Cumulative recoverable-error tally, shared by every worker.
    pub fn errors(&self) -> &ErrorCounter {
        &self.errors
    }

    /// Run the full sweep, emitting one report per completed pass.
    ///
    /// Configuration errors fail here before any pass starts. A fatal
    /// workload error or worker panic aborts the run; the in-flight pass
    /// produces no report.
    pub fn run(&self, sink: &mut dyn ReportSink) -> anyhow::Result<RunSummary> {
        self.config.validate()?;
        if self.workloads.is_empty() {
            bail!("at least one workload is required");
        }
        if self.pool.is_empty() {
            bail!("resource pool is empty, nothing to draw test entities from");
        }

        info!(
            "Starting sweep: concurrency 1..{}, {} repeats per level, {} iterations per worker, pool of {}",
            self.config.max_concurrency,
            self.config.repeats_per_level,
            self.config.iterations_per_worker,
            self.pool.len(),
        );

        let started_at = Utc::now();
        let mut pass = 0u64;
        let mut total_ops = 0u64;
        for concurrency in 1..self.config.max_concurrency {
            for _ in 0..self.config.repeats_per_level {
                pass += 1;
                total_ops += self
                    .perform_pass(pass, concurrency, sink)
                    .with_context(|| format!("pass {pass} at concurrency {concurrency} failed"))?;
            }
        }

        let summary = RunSummary {
            started_at,
            completed_at: Utc::now(),
            passes: pass,
            total_ops,
            cumulative_errors: self.errors.get(),
        };
        info!(
            "Sweep complete: {} passes, {} ops, {} errors",
            summary.passes, summary.total_ops, summary.cumulative_errors
        );
        Ok(summary)
    }

    fn perform_pass(
        &self,
        pass: u64,
        concurrency: usize,
        sink: &mut dyn ReportSink,
    ) -> anyhow::Result<u64> {
        let metrics = PassMetrics::new();
        let started = Instant::now();

        let worker_results: Vec<thread::Result<anyhow::Result<()>>> = thread::scope(|scope| {
            let handles: Vec<_> = (0..concurrency)
                .map(|_| scope.spawn(|| self.worker_loop(&metrics)))
                .collect();
            handles.into_iter().map(|handle| handle.join()).collect()
        });

        for result in worker_results {
            match result {
                Ok(Ok(())) => {}
                Ok(Err(error)) => return Err(error),
                Err(_) => bail!("worker thread panicked"),
            }
        }

        let elapsed = started.elapsed();
        let stats = metrics.snapshot();
        let total_ops = concurrency as u64 * u64::from(self.config.iterations_per_worker);
        let report = PassReport {
            pass,
            concurrency,
            total_ops,
            latency: stats.latency,
            size: stats.size,
            elapsed_secs: elapsed.as_secs_f64(),
            cumulative_errors: self.errors.get(),
        };
        sink.report(&report)?;
        Ok(total_ops)
    }

    fn worker_loop(&self, metrics: &PassMetrics) -> anyhow::Result<()> {
        for _ in 0..self.config.iterations_per_worker {
            let workload = &self.workloads[self.dispatch.next(self.workloads.len())];
            let started = Instant::now();
            match workload.execute(metrics.sizes()) {
                Ok(()) => {}
                Err(WorkloadError::BadStatus { .. }) => {
                    self.errors.increment();
                }
                Err(WorkloadError::Fatal(error)) => {
                    return Err(
                        error.context(format!("workload {} failed fatally", workload.name()))
                    );
                }
            }
            // Recoverable failures are timed like successes.
            metrics.record_latency(started.elapsed());
        }
        Ok(())
    }
}
