//! Paginated listing collaborator used to seed the resource pool.
//!
//! The pool loader only depends on the [`ListingSource`] trait; the concrete
//! [`HttpListingSource`] speaks the target API's listing wire format: a JSON
//! document with an `items` array and an absolute `next` link.

use anyhow::Context;
use serde::Deserialize;

/// One entity returned by a listing page.
#[derive(Debug, Clone)]
pub struct ResourceRecord {
    /// Type-qualified reference, e.g. `patient/p-0042`. Entities are
    /// addressed as `{base}/{id}` with this reference.
    pub id: String,
    /// Entity kind, matched against the pool loader's type filter.
    pub kind: String,
    /// Entity body as the server returned it (JSON text).
    pub body: String,
}

/// One page of a listing traversal.
#[derive(Debug, Clone, Default)]
pub struct ListingPage {
    pub records: Vec<ResourceRecord>,
    /// Absolute URL of the next page; `None` or blank ends the traversal.
    pub next: Option<String>,
}

/// Paginated fetch over a remote collection.
pub trait ListingSource {
    /// Base URL the traversal was configured with. Next links pointing at a
    /// different host are rebased onto this before being followed.
    fn base_url(&self) -> &str;

    fn first_page(&self, collection: &str, count: usize) -> anyhow::Result<ListingPage>;

    fn page_at(&self, url: &str) -> anyhow::Result<ListingPage>;
}

/// Wire shape of a listing response.
#[derive(Debug, Deserialize)]
struct ListingDocument {
    #[serde(default)]
    items: Vec<serde_json::Value>,
    #[serde(default)]
    next: Option<String>,
}

/// Blocking-HTTP listing client.
pub struct HttpListingSource {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl HttpListingSource {
    pub fn new(client: reqwest::blocking::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn fetch(&self, url: &str) -> anyhow::Result<ListingPage> {
        let response = self
            .client
            .get(url)
            .send()
            .with_context(|| format!("listing request to {url} failed"))?;
        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("listing request to {url} returned HTTP {status}");
        }
        let document: ListingDocument = response
            .json()
            .with_context(|| format!("listing response from {url} is not a valid document"))?;
        Ok(page_from_document(document))
    }
}

impl ListingSource for HttpListingSource {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn first_page(&self, collection: &str, count: usize) -> anyhow::Result<ListingPage> {
        let url = format!("{}/{collection}?_count={count}", self.base_url);
        self.fetch(&url)
    }

    fn page_at(&self, url: &str) -> anyhow::Result<ListingPage> {
        self.fetch(url)
    }
}

fn page_from_document(document: ListingDocument) -> ListingPage {
    let records = document
        .items
        .iter()
        .filter_map(record_from_item)
        .collect();
    ListingPage {
        records,
        next: document.next,
    }
}

/// Items without `kind` and `id` string fields are not addressable test
/// entities and are skipped.
fn record_from_item(item: &serde_json::Value) -> Option<ResourceRecord> {
    let kind = item.get("kind")?.as_str()?;
    let raw_id = item.get("id")?.as_str()?;
    Some(ResourceRecord {
        id: format!("{kind}/{raw_id}"),
        kind: kind.to_string(),
        body: item.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_from_item_builds_qualified_reference() {
        let item = json!({"kind": "patient", "id": "p-7", "name": "x"});
        let record = record_from_item(&item).unwrap();
        assert_eq!(record.id, "patient/p-7");
        assert_eq!(record.kind, "patient");
        // Body round-trips the item verbatim.
        let parsed: serde_json::Value = serde_json::from_str(&record.body).unwrap();
        assert_eq!(parsed, item);
    }

    #[test]
    fn test_record_from_item_skips_malformed_entries() {
        assert!(record_from_item(&json!({"id": "p-1"})).is_none());
        assert!(record_from_item(&json!({"kind": "patient"})).is_none());
        assert!(record_from_item(&json!({"kind": 3, "id": "p-1"})).is_none());
        assert!(record_from_item(&json!("not-an-object")).is_none());
    }

    #[test]
    fn test_page_from_document_filters_and_keeps_next() {
        let document: ListingDocument = serde_json::from_value(json!({
            "items": [
                {"kind": "patient", "id": "a"},
                {"unrelated": true},
                {"kind": "device", "id": "d"},
            ],
            "next": "http://upstream/patients?page=2",
        }))
        .unwrap();
        let page = page_from_document(document);
        assert_eq!(page.records.len(), 2);
        assert_eq!(page.records[0].id, "patient/a");
        assert_eq!(page.next.as_deref(), Some("http://upstream/patients?page=2"));
    }

    #[test]
    fn test_page_from_document_defaults() {
        let document: ListingDocument = serde_json::from_value(json!({})).unwrap();
        let page = page_from_document(document);
        assert!(page.records.is_empty());
        assert!(page.next.is_none());
    }
}
