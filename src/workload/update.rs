//! Update workload: toggle a drawn entity's status marker and PUT it back.
//!
//! The mutated body is written into the pool before the request goes out, so
//! concurrent updaters of the same entity race with last-writer-wins. The
//! contention is the point, not the final value.

use std::sync::Arc;

use reqwest::header::CONTENT_TYPE;

use crate::metrics::ResponseSizeRecorder;
use crate::pool::ResourcePool;
use crate::target::HttpTarget;

use super::{consume_response, Workload, WorkloadError};

const STATUS_ACTIVE: &str = r#""status":"active""#;
const STATUS_INACTIVE: &str = r#""status":"inactive""#;

pub struct UpdateWorkload {
    target: Arc<HttpTarget>,
    pool: Arc<ResourcePool>,
}

impl UpdateWorkload {
    pub fn new(target: Arc<HttpTarget>, pool: Arc<ResourcePool>) -> Self {
        Self { target, pool }
    }
}

impl Workload for UpdateWorkload {
    fn name(&self) -> &'static str {
        "update"
    }

    fn execute(&self, sizes: &ResponseSizeRecorder) -> Result<(), WorkloadError> {
        let id = self.pool.draw();
        let body = toggle_status(&self.pool.get(id));
        self.pool.replace(id, body.clone());

        let url = format!("{}/{id}", self.target.next_base());
        let response = self
            .target
            .client()
            .put(&url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()?;
        consume_response(response, sizes)
    }
}

fn toggle_status(body: &str) -> String {
    if body.contains(STATUS_ACTIVE) {
        body.replace(STATUS_ACTIVE, STATUS_INACTIVE)
    } else {
        body.replace(STATUS_INACTIVE, STATUS_ACTIVE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_flips_both_ways() {
        let active = r#"{"kind":"patient","status":"active"}"#;
        let inactive = r#"{"kind":"patient","status":"inactive"}"#;
        assert_eq!(toggle_status(active), inactive);
        assert_eq!(toggle_status(inactive), active);
    }

    #[test]
    fn test_toggle_leaves_unmarked_body_alone() {
        let body = r#"{"kind":"patient"}"#;
        assert_eq!(toggle_status(body), body);
    }
}
