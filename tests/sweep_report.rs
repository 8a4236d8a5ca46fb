//! End-to-end sweep test: run a full concurrency ramp with an in-process
//! workload and check the CSV report written to disk.
//!
//! 1. Build a small resource pool directly from records
//! 2. Run a `Cmax=4, R=2, L=3` sweep with a workload that always succeeds
//! 3. Read the CSV back and validate the header and every pass record
//! 4. Serialize the run summary and validate its shape

use std::io::Read as _;
use std::sync::Arc;
use std::time::Duration;

use scaleup_bench::listing::ResourceRecord;
use scaleup_bench::metrics::ResponseSizeRecorder;
use scaleup_bench::workload::{Workload, WorkloadError};
use scaleup_bench::{CsvReportSink, Harness, ResourcePool, SweepConfig};

struct QuickWorkload;

impl Workload for QuickWorkload {
    fn name(&self) -> &'static str {
        "quick"
    }

    fn execute(&self, sizes: &ResponseSizeRecorder) -> Result<(), WorkloadError> {
        std::thread::sleep(Duration::from_millis(2));
        sizes.record(256);
        Ok(())
    }
}

fn small_pool() -> Arc<ResourcePool> {
    Arc::new(ResourcePool::from_records(
        (0..5)
            .map(|i| ResourceRecord {
                id: format!("patient/p-{i}"),
                kind: "patient".to_string(),
                body: format!(r#"{{"kind":"patient","id":"p-{i}","status":"active"}}"#),
            })
            .collect(),
    ))
}

#[test]
fn sweep_writes_one_csv_record_per_pass() {
    let config = SweepConfig {
        max_concurrency: 4,
        repeats_per_level: 2,
        iterations_per_worker: 3,
    };
    let harness = Harness::new(small_pool(), vec![Box::new(QuickWorkload)], config);

    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("report.csv");
    let mut sink = CsvReportSink::new(std::fs::File::create(&csv_path).unwrap()).unwrap();

    let summary = harness.run(&mut sink).unwrap();
    drop(sink);

    assert_eq!(summary.passes, 6);
    // (1+2+3) workers * 2 repeats * 3 iterations each.
    assert_eq!(summary.total_ops, 36);
    assert_eq!(summary.cumulative_errors, 0);
    assert!(summary.completed_at >= summary.started_at);

    let mut contents = String::new();
    std::fs::File::open(&csv_path)
        .unwrap()
        .read_to_string(&mut contents)
        .unwrap();
    let lines: Vec<&str> = contents.lines().collect();

    // Header plus one record per pass.
    assert_eq!(lines.len(), 7);
    assert_eq!(
        lines[0],
        "timestamp,NEXT,pass,total_ops,concurrent_workers,min_ms,mean_ms,p75_ms,p98_ms,p99_ms,max_ms,mean_resp_kb,max_resp_kb,throughput_per_sec,errors"
    );

    for (index, line) in lines[1..].iter().enumerate() {
        let fields: Vec<&str> = line.split(',').collect();
        assert_eq!(fields.len(), 15, "bad field count in {line}");
        // Timestamp column stays empty; the marker column is fixed.
        assert_eq!(fields[0], "");
        assert_eq!(fields[1], "NEXT");
        // Passes are numbered sequentially from 1.
        assert_eq!(fields[2], (index + 1).to_string());
        // Concurrency steps 1,1,2,2,3,3 and total_ops = concurrency * 3.
        let expected_concurrency = index / 2 + 1;
        assert_eq!(fields[4], expected_concurrency.to_string());
        assert_eq!(fields[3], (expected_concurrency * 3).to_string());
        // No errors anywhere in this run.
        assert_eq!(fields[14], "0");
        // Latency columns parse as numbers and keep percentile ordering.
        let min: f64 = fields[5].parse().unwrap();
        let p75: f64 = fields[7].parse().unwrap();
        let p98: f64 = fields[8].parse().unwrap();
        let p99: f64 = fields[9].parse().unwrap();
        let max: f64 = fields[10].parse().unwrap();
        assert!(min <= p75 && p75 <= p98 && p98 <= p99 && p99 <= max, "bad ordering in {line}");
    }
}

#[test]
fn run_summary_serializes_with_stable_field_names() {
    let config = SweepConfig {
        max_concurrency: 2,
        repeats_per_level: 1,
        iterations_per_worker: 2,
    };
    let harness = Harness::new(small_pool(), vec![Box::new(QuickWorkload)], config);
    let mut sink = CsvReportSink::new(Vec::new()).unwrap();
    let summary = harness.run(&mut sink).unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&serde_json::to_string(&summary).unwrap()).unwrap();
    assert_eq!(json["passes"], 1);
    assert_eq!(json["total_ops"], 2);
    assert_eq!(json["cumulative_errors"], 0);
    assert!(json["started_at"].is_string());
    assert!(json["completed_at"].is_string());
}
