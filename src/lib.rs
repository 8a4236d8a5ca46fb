//! scaleup-bench
//!
//! A concurrency-ramp load-testing harness for JSON-over-HTTP APIs. The
//! harness drives pluggable workloads (search, create, read, update) against
//! a remote server while stepping worker parallelism from 1 up to a
//! configured bound, and emits one latency/response-size report per pass.
//!
//! # How a run works
//!
//! 1. A shared [`pool::ResourcePool`] is seeded once from the server's
//!    paginated listing endpoint.
//! 2. For each concurrency level the [`harness::Harness`] spawns a fresh
//!    scope of OS worker threads; each worker repeatedly invokes a
//!    [`workload::Workload`] against the pool and the remote endpoint.
//! 3. Latency and response-size samples stream into per-pass histograms;
//!    classified failures accumulate in a run-wide error counter.
//! 4. At the pass barrier the [`report`] sink renders a human-readable line
//!    and a fixed-schema CSV record, then the pass's aggregators are dropped.
//!
//! # CLI usage
//!
//! ```bash
//! # Ramp reads against one host
//! scaleup-bench read --base-url http://localhost:8000 --csv-out read.csv
//!
//! # Ramp a mixed workload across two hosts
//! scaleup-bench mixed \
//!   --base-url http://a:8000,http://b:8000 \
//!   --credentials admin:password \
//!   --max-concurrency 200 --iterations 3
//! ```

pub mod cli;
pub mod harness;
pub mod listing;
pub mod metrics;
pub mod pool;
pub mod report;
pub mod shared;
pub mod target;
pub mod workload;

pub use harness::{Harness, RunSummary, SweepConfig};
pub use pool::ResourcePool;
pub use report::{CsvReportSink, PassReport, ReportSink};
