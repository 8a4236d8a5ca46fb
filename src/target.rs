//! HTTP transport boundary: a configured blocking client plus base-URL
//! rotation.
//!
//! The harness itself never constructs requests; workloads do, through this
//! shared handle. Timeouts live here and only here: the harness enforces
//! none, so a stalled call stalls its worker until the transport gives up.

use std::time::Duration;

use anyhow::Context;
use base64::Engine as _;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};

use crate::shared::RoundRobin;

const TRANSPORT_TIMEOUT: Duration = Duration::from_secs(60);

pub struct HttpTarget {
    client: reqwest::blocking::Client,
    base_urls: Vec<String>,
    rotation: RoundRobin,
}

impl HttpTarget {
    /// Build the shared transport. `credentials` is `user:password` for a
    /// basic-auth header attached to every request.
    pub fn new(base_urls: Vec<String>, credentials: Option<&str>) -> anyhow::Result<Self> {
        anyhow::ensure!(!base_urls.is_empty(), "at least one base URL is required");
        let base_urls = base_urls
            .into_iter()
            .map(|url| url.trim_end_matches('/').to_string())
            .collect();

        let mut headers = HeaderMap::new();
        if let Some(credentials) = credentials {
            let encoded = base64::engine::general_purpose::STANDARD.encode(credentials);
            let mut value = HeaderValue::from_str(&format!("Basic {encoded}"))
                .context("credentials contain characters not allowed in a header")?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::blocking::Client::builder()
            .default_headers(headers)
            .connect_timeout(TRANSPORT_TIMEOUT)
            .timeout(TRANSPORT_TIMEOUT)
            .pool_max_idle_per_host(1000)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            client,
            base_urls,
            rotation: RoundRobin::new(),
        })
    }

    pub fn client(&self) -> &reqwest::blocking::Client {
        &self.client
    }

    /// Next base URL, rotated round-robin to spread load across hosts.
    pub fn next_base(&self) -> &str {
        &self.base_urls[self.rotation.next(self.base_urls.len())]
    }
}
