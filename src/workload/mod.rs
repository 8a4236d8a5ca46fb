//! Pluggable workload capability, executed once per harness iteration.
//!
//! A workload performs one HTTP call against the target system, classifies
//! non-2xx responses as recoverable, and on success reports the consumed
//! response-body size. Anything else (transport faults, body-read failures)
//! is fatal and propagates out of the run.

mod create;
mod read;
mod search;
mod update;

pub use create::CreateWorkload;
pub use read::ReadWorkload;
pub use search::SearchWorkload;
pub use update::UpdateWorkload;

use tracing::error;

use crate::metrics::ResponseSizeRecorder;

#[derive(Debug, thiserror::Error)]
pub enum WorkloadError {
    /// A classified bad-status outcome. Absorbed at the iteration boundary:
    /// the error counter is incremented and the run continues.
    #[error("server returned HTTP status {status}")]
    BadStatus { status: u16 },

    /// Everything else. Aborts the entire run.
    #[error(transparent)]
    Fatal(#[from] anyhow::Error),
}

impl From<reqwest::Error> for WorkloadError {
    fn from(error: reqwest::Error) -> Self {
        Self::Fatal(error.into())
    }
}

pub trait Workload: Send + Sync {
    fn name(&self) -> &'static str;

    /// Perform one call. On success the consumed response size has been
    /// reported through `sizes`.
    fn execute(&self, sizes: &ResponseSizeRecorder) -> Result<(), WorkloadError>;
}

/// Consume a response body, classify the status, count the size.
///
/// The body is read in full either way: error bodies are logged, success
/// bodies are measured.
fn consume_response(
    response: reqwest::blocking::Response,
    sizes: &ResponseSizeRecorder,
) -> Result<(), WorkloadError> {
    let status = response.status();
    let body = response.text().map_err(WorkloadError::from)?;
    if !status.is_success() {
        error!("Got HTTP status {status}: {body}");
        return Err(WorkloadError::BadStatus {
            status: status.as_u16(),
        });
    }
    sizes.record(body.len() as u64);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reqwest_errors_map_to_fatal() {
        // A request against a client with an invalid URL yields a reqwest
        // error; the conversion must land in the fatal variant.
        let error = reqwest::blocking::Client::new()
            .get("htp://nonsense")
            .send()
            .unwrap_err();
        match WorkloadError::from(error) {
            WorkloadError::Fatal(_) => {}
            other => panic!("expected Fatal, got {other:?}"),
        }
    }

    #[test]
    fn test_bad_status_display_names_the_status() {
        let error = WorkloadError::BadStatus { status: 503 };
        assert_eq!(error.to_string(), "server returned HTTP status 503");
    }
}
