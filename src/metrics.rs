//! Per-pass streaming statistics over latency and response-size samples.
//!
//! Each pass owns two independent [`hdrhistogram::Histogram`] instances: one
//! over call latency in milliseconds, one over consumed response-body sizes in
//! bytes. Memory stays bounded regardless of sample count, and percentile
//! queries are approximate (3 significant figures), which is sufficient: the
//! harness compares relative behavior across concurrency levels, not absolute
//! exactness. Both histograms sit behind mutexes since all workers of a pass
//! record into them concurrently.

use std::sync::Mutex;
use std::time::Duration;

use hdrhistogram::Histogram;
use serde::Serialize;

/// Handle workloads use to report consumed response-body sizes.
pub struct ResponseSizeRecorder {
    histogram: Mutex<Histogram<u64>>,
}

impl ResponseSizeRecorder {
    fn new() -> Self {
        let mut histogram = Histogram::<u64>::new(3).expect("3 sigfigs is always valid");
        histogram.auto(true);
        Self {
            histogram: Mutex::new(histogram),
        }
    }

    /// Record one consumed response body of `bytes` length.
    pub fn record(&self, bytes: u64) {
        let mut histogram = self.histogram.lock().expect("size histogram poisoned");
        histogram.saturating_record(bytes);
    }
}

/// Latency distribution of one pass.
#[derive(Debug, Clone, Serialize)]
pub struct AggregateStats {
    pub count: u64,
    pub min_ms: u64,
    pub mean_ms: f64,
    pub p75_ms: u64,
    pub p98_ms: u64,
    pub p99_ms: u64,
    pub max_ms: u64,
}

impl AggregateStats {
    fn from_histogram(histogram: &Histogram<u64>) -> Self {
        if histogram.is_empty() {
            return Self {
                count: 0,
                min_ms: 0,
                mean_ms: 0.0,
                p75_ms: 0,
                p98_ms: 0,
                p99_ms: 0,
                max_ms: 0,
            };
        }
        Self {
            count: histogram.len(),
            min_ms: histogram.min(),
            mean_ms: histogram.mean(),
            p75_ms: histogram.value_at_quantile(0.75),
            p98_ms: histogram.value_at_quantile(0.98),
            p99_ms: histogram.value_at_quantile(0.99),
            max_ms: histogram.max(),
        }
    }
}

/// Response-size distribution of one pass.
#[derive(Debug, Clone, Serialize)]
pub struct SizeStats {
    pub count: u64,
    pub mean_bytes: f64,
    pub max_bytes: u64,
}

impl SizeStats {
    fn from_histogram(histogram: &Histogram<u64>) -> Self {
        if histogram.is_empty() {
            return Self {
                count: 0,
                mean_bytes: 0.0,
                max_bytes: 0,
            };
        }
        Self {
            count: histogram.len(),
            mean_bytes: histogram.mean(),
            max_bytes: histogram.max(),
        }
    }
}

/// Snapshot of a pass's aggregators, taken after the join barrier.
#[derive(Debug, Clone, Serialize)]
pub struct PassStats {
    pub latency: AggregateStats,
    pub size: SizeStats,
}

/// Aggregators for one pass. Created fresh per pass and dropped with it.
pub struct PassMetrics {
    latency: Mutex<Histogram<u64>>,
    sizes: ResponseSizeRecorder,
}

impl PassMetrics {
    pub fn new() -> Self {
        let mut latency = Histogram::<u64>::new(3).expect("3 sigfigs is always valid");
        latency.auto(true);
        Self {
            latency: Mutex::new(latency),
            sizes: ResponseSizeRecorder::new(),
        }
    }

    /// Record the elapsed wall time of one workload invocation. Both
    /// successful and recoverably-failed invocations are timed.
    pub fn record_latency(&self, elapsed: Duration) {
        let mut latency = self.latency.lock().expect("latency histogram poisoned");
        latency.saturating_record(elapsed.as_millis() as u64);
    }

    /// The recorder handle handed to workload invocations.
    pub fn sizes(&self) -> &ResponseSizeRecorder {
        &self.sizes
    }

    pub fn snapshot(&self) -> PassStats {
        let latency = self.latency.lock().expect("latency histogram poisoned");
        let sizes = self
            .sizes
            .histogram
            .lock()
            .expect("size histogram poisoned");
        PassStats {
            latency: AggregateStats::from_histogram(&latency),
            size: SizeStats::from_histogram(&sizes),
        }
    }
}

impl Default for PassMetrics {
    fn default() -> Self {
        Self::new()
    }
}
