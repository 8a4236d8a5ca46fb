//! Read workload: fetch a drawn entity by reference.

use std::sync::Arc;

use crate::metrics::ResponseSizeRecorder;
use crate::pool::ResourcePool;
use crate::target::HttpTarget;

use super::{consume_response, Workload, WorkloadError};

pub struct ReadWorkload {
    target: Arc<HttpTarget>,
    pool: Arc<ResourcePool>,
}

impl ReadWorkload {
    pub fn new(target: Arc<HttpTarget>, pool: Arc<ResourcePool>) -> Self {
        Self { target, pool }
    }
}

impl Workload for ReadWorkload {
    fn name(&self) -> &'static str {
        "read"
    }

    fn execute(&self, sizes: &ResponseSizeRecorder) -> Result<(), WorkloadError> {
        let url = format!("{}/{}", self.target.next_base(), self.pool.draw());
        let response = self.target.client().get(&url).send()?;
        consume_response(response, sizes)
    }
}
