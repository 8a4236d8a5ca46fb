//! Pass report rendering: a human-readable log line and a fixed-schema CSV
//! record per completed pass.

use std::io::Write;

use anyhow::Context;
use serde::Serialize;
use tracing::info;

use crate::metrics::{AggregateStats, SizeStats};

/// Everything the sink needs to render one completed pass.
#[derive(Debug, Clone, Serialize)]
pub struct PassReport {
    pub pass: u64,
    pub concurrency: usize,
    pub total_ops: u64,
    pub latency: AggregateStats,
    pub size: SizeStats,
    pub elapsed_secs: f64,
    pub cumulative_errors: u64,
}

impl PassReport {
    pub fn throughput_per_sec(&self) -> f64 {
        if self.elapsed_secs > 0.0 {
            self.total_ops as f64 / self.elapsed_secs
        } else {
            0.0
        }
    }
}

pub trait ReportSink {
    fn report(&mut self, report: &PassReport) -> anyhow::Result<()>;
}

/// CSV column names, written once per run. Column order is a contract:
/// downstream consumers address fields by position, so schema changes must be
/// append-only.
const CSV_HEADER: &[&str] = &[
    "timestamp",
    "NEXT",
    "pass",
    "total_ops",
    "concurrent_workers",
    "min_ms",
    "mean_ms",
    "p75_ms",
    "p98_ms",
    "p99_ms",
    "max_ms",
    "mean_resp_kb",
    "max_resp_kb",
    "throughput_per_sec",
    "errors",
];

/// Writes the positional pass records and mirrors each one to the log.
pub struct CsvReportSink<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> CsvReportSink<W> {
    pub fn new(writer: W) -> anyhow::Result<Self> {
        let mut writer = csv::Writer::from_writer(writer);
        writer
            .write_record(CSV_HEADER)
            .context("failed to write CSV report header")?;
        writer.flush().context("failed to flush CSV report header")?;
        Ok(Self { writer })
    }

    /// Hand back the underlying writer, flushing buffered records.
    pub fn into_inner(self) -> anyhow::Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| anyhow::anyhow!("failed to flush CSV report: {}", e.error()))
    }
}

impl<W: Write> ReportSink for CsvReportSink<W> {
    fn report(&mut self, report: &PassReport) -> anyhow::Result<()> {
        log_pass(report);

        // The first column is reserved for an externally supplied timestamp.
        self.writer
            .write_record(&[
                String::new(),
                "NEXT".to_string(),
                report.pass.to_string(),
                report.total_ops.to_string(),
                report.concurrency.to_string(),
                format!("{:.1}", report.latency.min_ms as f64),
                format!("{:.1}", report.latency.mean_ms),
                format!("{:.1}", report.latency.p75_ms as f64),
                format!("{:.1}", report.latency.p98_ms as f64),
                format!("{:.1}", report.latency.p99_ms as f64),
                format!("{:.1}", report.latency.max_ms as f64),
                format!("{:.1}", report.size.mean_bytes / 1024.0),
                format!("{:.1}", report.size.max_bytes as f64 / 1024.0),
                format!("{:.1}", report.throughput_per_sec()),
                report.cumulative_errors.to_string(),
            ])
            .with_context(|| format!("failed to write CSV record for pass {}", report.pass))?;
        self.writer
            .flush()
            .context("failed to flush CSV report")?;
        Ok(())
    }
}

fn log_pass(report: &PassReport) {
    info!(
        "Pass {} finished {} ops across {} workers - min {:.1}ms - mean {:.1}ms - p75 {:.1}ms - p98 {:.1}ms - p99 {:.1}ms - max {:.1}ms - mean response {:.1}kb - max response {:.1}kb - {:.1} ops/sec - {} errors",
        report.pass,
        report.total_ops,
        report.concurrency,
        report.latency.min_ms as f64,
        report.latency.mean_ms,
        report.latency.p75_ms as f64,
        report.latency.p98_ms as f64,
        report.latency.p99_ms as f64,
        report.latency.max_ms as f64,
        report.size.mean_bytes / 1024.0,
        report.size.max_bytes as f64 / 1024.0,
        report.throughput_per_sec(),
        report.cumulative_errors,
    );
}
