//! Shared resource pool: a fixed id set with concurrently replaceable bodies.
//!
//! The pool is loaded once from a paginated [`ListingSource`] and then shared
//! by every worker of every pass. The id set is immutable after load, so
//! draws need no synchronization beyond the round-robin cursor; bodies live
//! behind a mutex and may be overwritten concurrently with last-writer-wins
//! semantics; the harness models realistic write contention, not correctness
//! of the replaced value.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use anyhow::Context;
use tracing::info;
use url::Url;

use crate::listing::{ListingSource, ResourceRecord};
use crate::shared::RoundRobin;

/// Listing page size requested while loading.
pub const DEFAULT_PAGE_SIZE: usize = 1000;
/// Loading stops once this many distinct entities are held.
pub const DEFAULT_TARGET_SIZE: usize = 5000;

pub struct ResourcePool {
    ids: Vec<String>,
    bodies: Mutex<HashMap<String, String>>,
    cursor: RoundRobin,
}

impl ResourcePool {
    /// Fetch pages from `listing` until `target_size` distinct entities of
    /// `kind` are held or the listing reports no further page. No request is
    /// issued after either condition is met.
    pub fn load(
        listing: &dyn ListingSource,
        kind: &str,
        target_size: usize,
        page_size: usize,
    ) -> anyhow::Result<Self> {
        info!("Loading {kind} records from {}", listing.base_url());

        let mut seen = HashSet::new();
        let mut ids = Vec::new();
        let mut bodies = HashMap::new();

        let mut page = listing
            .first_page(kind, page_size)
            .context("failed to fetch first listing page")?;
        let mut page_number = 1u32;

        loop {
            for record in page.records.iter().filter(|r| r.kind == kind) {
                if seen.insert(record.id.clone()) {
                    ids.push(record.id.clone());
                    bodies.insert(record.id.clone(), record.body.clone());
                }
            }

            let next = page.next.as_deref().unwrap_or("").trim();
            if seen.len() >= target_size || next.is_empty() {
                break;
            }

            let next_url = rebase_next_url(listing.base_url(), next)?;
            page_number += 1;
            info!("Have {} {kind} records, loading page {page_number}", seen.len());
            page = listing
                .page_at(&next_url)
                .with_context(|| format!("failed to fetch listing page {page_number}"))?;
        }

        info!("Loaded {} {kind} records", ids.len());
        Ok(Self::from_records_inner(ids, bodies))
    }

    /// Build a pool directly from records, bypassing the listing traversal.
    pub fn from_records(records: Vec<ResourceRecord>) -> Self {
        let mut seen = HashSet::new();
        let mut ids = Vec::new();
        let mut bodies = HashMap::new();
        for record in records {
            if seen.insert(record.id.clone()) {
                ids.push(record.id.clone());
                bodies.insert(record.id, record.body);
            }
        }
        Self::from_records_inner(ids, bodies)
    }

    fn from_records_inner(ids: Vec<String>, bodies: HashMap<String, String>) -> Self {
        Self {
            ids,
            bodies: Mutex::new(bodies),
            cursor: RoundRobin::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Next entity reference, round-robin across the id set.
    pub fn draw(&self) -> &str {
        assert!(!self.ids.is_empty(), "draw from an empty resource pool");
        &self.ids[self.cursor.next(self.ids.len())]
    }

    /// Current body of `id`.
    ///
    /// # Panics
    ///
    /// Panics on an unknown id. The id set is fixed at load time, so an
    /// unknown id is a programming error, not a recoverable condition.
    pub fn get(&self, id: &str) -> String {
        let bodies = self.bodies.lock().expect("pool body map poisoned");
        bodies
            .get(id)
            .unwrap_or_else(|| panic!("unknown resource id: {id}"))
            .clone()
    }

    /// Overwrite the body of `id`, last writer wins.
    pub fn replace(&self, id: &str, body: String) {
        let mut bodies = self.bodies.lock().expect("pool body map poisoned");
        debug_assert!(bodies.contains_key(id), "unknown resource id: {id}");
        bodies.insert(id.to_string(), body);
    }
}

/// Follow a next link, splicing its path and query onto the configured base
/// when the link targets a different logical host (a proxy in front of the
/// server rewrites absolute links to its internal address).
fn rebase_next_url(base: &str, next: &str) -> anyhow::Result<String> {
    let next_url = Url::parse(next).with_context(|| format!("invalid next link: {next}"))?;
    let base_url = Url::parse(base).with_context(|| format!("invalid base URL: {base}"))?;

    if next_url.host_str() == base_url.host_str()
        && next_url.port_or_known_default() == base_url.port_or_known_default()
    {
        return Ok(next.to_string());
    }

    let mut rebased = base.trim_end_matches('/').to_string();
    rebased.push_str(next_url.path());
    if let Some(query) = next_url.query() {
        rebased.push('?');
        rebased.push_str(query);
    }
    Ok(rebased)
}
