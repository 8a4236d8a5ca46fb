//! Create workload: POST a new entity referencing a drawn one.

use std::sync::Arc;

use chrono::Utc;
use rand::Rng;
use reqwest::header::CONTENT_TYPE;

use crate::metrics::ResponseSizeRecorder;
use crate::pool::ResourcePool;
use crate::target::HttpTarget;

use super::{consume_response, Workload, WorkloadError};

/// Substituted with a freshly drawn reference on every call.
const SUBJECT_PLACEHOLDER: &str = "urn:subject-placeholder";

pub struct CreateWorkload {
    target: Arc<HttpTarget>,
    pool: Arc<ResourcePool>,
    collection: String,
    template: String,
}

impl CreateWorkload {
    /// The posted body is built once here; only the subject reference varies
    /// per call.
    pub fn new(
        target: Arc<HttpTarget>,
        pool: Arc<ResourcePool>,
        collection: impl Into<String>,
    ) -> Self {
        let collection = collection.into();
        let offset_ms: i64 = rand::rng().random_range(0..10_000_000);
        let effective = Utc::now() - chrono::Duration::milliseconds(offset_ms);
        let template = serde_json::json!({
            "kind": collection,
            "subject": SUBJECT_PLACEHOLDER,
            "effective": effective.to_rfc3339(),
            "code": "12345",
            "value": 123,
            "unit": "kg",
        })
        .to_string();
        Self {
            target,
            pool,
            collection,
            template,
        }
    }
}

impl Workload for CreateWorkload {
    fn name(&self) -> &'static str {
        "create"
    }

    fn execute(&self, sizes: &ResponseSizeRecorder) -> Result<(), WorkloadError> {
        let body = self.template.replace(SUBJECT_PLACEHOLDER, self.pool.draw());
        let url = format!("{}/{}", self.target.next_base(), self.collection);
        let response = self
            .target
            .client()
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()?;
        consume_response(response, sizes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::ResourceRecord;

    #[test]
    fn test_template_carries_placeholder_and_kind() {
        let target = Arc::new(HttpTarget::new(vec!["http://a".to_string()], None).unwrap());
        let pool = Arc::new(ResourcePool::from_records(vec![ResourceRecord {
            id: "patient/p-1".to_string(),
            kind: "patient".to_string(),
            body: "{}".to_string(),
        }]));
        let workload = CreateWorkload::new(target, pool, "observations");
        let template: serde_json::Value = serde_json::from_str(&workload.template).unwrap();
        assert_eq!(template["kind"], "observations");
        assert_eq!(template["subject"], SUBJECT_PLACEHOLDER);
        assert!(template["effective"].is_string());
    }
}
