//! Search workload: query a collection filtered by a drawn entity reference.

use std::sync::Arc;

use crate::metrics::ResponseSizeRecorder;
use crate::pool::ResourcePool;
use crate::target::HttpTarget;

use super::{consume_response, Workload, WorkloadError};

pub struct SearchWorkload {
    target: Arc<HttpTarget>,
    pool: Arc<ResourcePool>,
    collection: String,
    parameter: String,
}

impl SearchWorkload {
    pub fn new(
        target: Arc<HttpTarget>,
        pool: Arc<ResourcePool>,
        collection: impl Into<String>,
        parameter: impl Into<String>,
    ) -> Self {
        Self {
            target,
            pool,
            collection: collection.into(),
            parameter: parameter.into(),
        }
    }
}

impl Workload for SearchWorkload {
    fn name(&self) -> &'static str {
        "search"
    }

    fn execute(&self, sizes: &ResponseSizeRecorder) -> Result<(), WorkloadError> {
        let subject = self.pool.draw();
        let url = format!(
            "{}/{}?{}={subject}",
            self.target.next_base(),
            self.collection,
            self.parameter
        );
        let response = self.target.client().get(&url).send()?;
        consume_response(response, sizes)
    }
}
