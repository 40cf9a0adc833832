//! Structured-component (RSC-style) payload extractor.
//!
//! Marketplace pages stream server-rendered component payloads from their
//! `/api/` routes: framing lines with embedded JSON-like fragments, not a
//! well-formed JSON document. This extractor scans those bodies with
//! patterns, tolerating partial and interleaved content:
//!
//! - `description` from a literal `"description","content":"..."` pair.
//! - `provider` from the URL path segment after the marketplace host.
//! - `pricing` from an embedded `"plans": [...]` array on pricing routes.
//! - `endpoints` from an embedded `"endpoints": [...]` array on endpoint
//!   and playground routes.
//!
//! Embedded arrays are handed to the JSON parser once isolated; a parse
//! failure on one of them is silently ignored (those fields are
//! best-effort). Within one invocation, a later record's match overwrites
//! an earlier one.

// ============================================================================
// Imports
// ============================================================================

use regex::{Regex, RegexBuilder};
use serde_json::{Value, json};
use tracing::{debug, warn};
use url::Url;

use crate::capture::NetworkResponseRecord;
use crate::error::Result;
use crate::monitor::NetworkMonitor;

use super::EnhancedFields;

// ============================================================================
// Constants
// ============================================================================

/// Default marketplace host the provider segment is read from.
pub const DEFAULT_MARKETPLACE_HOST: &str = "rapidapi.com";

/// Only component payloads from these routes are scanned.
const API_ROUTE_MARKER: &str = "/api/";

// ============================================================================
// ComponentExtractor
// ============================================================================

/// Pattern-based extractor for structured-component payloads.
///
/// # Example
///
/// ```ignore
/// let extractor = ComponentExtractor::new(DEFAULT_MARKETPLACE_HOST)?;
/// let fields = extractor.extract(&monitor, &responses).await;
/// ```
pub struct ComponentExtractor {
    /// Host whose first path segment names the provider.
    marketplace_host: String,

    /// Matches `"description","content":"<text>"`.
    description: Regex,

    /// Matches an embedded `"plans": [...]` array (dot matches newlines).
    plans: Regex,

    /// Matches an embedded `"endpoints": [...]` array (dot matches newlines).
    endpoints: Regex,
}

// ============================================================================
// ComponentExtractor - Constructor
// ============================================================================

impl ComponentExtractor {
    /// Creates an extractor reading providers from `marketplace_host`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Pattern`] if a pattern fails to compile.
    pub fn new(marketplace_host: impl Into<String>) -> Result<Self> {
        Ok(Self {
            marketplace_host: marketplace_host.into(),
            description: Regex::new(r#""description","content":"([^"]*)""#)?,
            plans: RegexBuilder::new(r#""plans":\s*(\[.*?\])"#)
                .dot_matches_new_line(true)
                .build()?,
            endpoints: RegexBuilder::new(r#""endpoints":\s*(\[.*?\])"#)
                .dot_matches_new_line(true)
                .build()?,
        })
    }
}

// ============================================================================
// ComponentExtractor - Extraction
// ============================================================================

impl ComponentExtractor {
    /// Scans component payloads among `responses` and accumulates fields.
    ///
    /// Only records whose URL contains `/api/` are considered; each body is
    /// fetched through the monitor. Per-record failures are logged and the
    /// scan continues with the next record.
    pub async fn extract(
        &self,
        monitor: &NetworkMonitor,
        responses: &[NetworkResponseRecord],
    ) -> EnhancedFields {
        let mut fields = EnhancedFields::default();

        for record in responses {
            let url = record.url.as_deref().unwrap_or("");
            let Some(request_id) = record.request_id.as_deref() else {
                continue;
            };
            if !url.contains(API_ROUTE_MARKER) {
                continue;
            }

            let Some(body) = monitor.response_body(request_id).await else {
                warn!(request_id, "Component payload body unavailable, skipping");
                continue;
            };

            self.scan_payload(url, &body, &mut fields);
        }

        fields
    }

    /// Applies all patterns of one payload to the accumulated fields.
    fn scan_payload(&self, url: &str, body: &str, fields: &mut EnhancedFields) {
        if let Some(captures) = self.description.captures(body) {
            let text = captures[1].to_string();
            debug!(url, description_len = text.len(), "Description found in component payload");
            fields.description = Some(text);
        }

        if let Some(provider) = self.provider_from_url(url) {
            fields.provider = Some(provider);
        }

        let url_lower = url.to_lowercase();

        if url_lower.contains("pricing")
            && let Some(tiers) = self.embedded_array(&self.plans, body)
        {
            fields.pricing = Some(json!({ "tiers": tiers }));
        }

        if (url_lower.contains("endpoint") || url_lower.contains("playground"))
            && let Some(list) = self.embedded_array(&self.endpoints, body)
        {
            fields.endpoints = Some(list);
        }
    }

    /// Reads the provider from the path segment after the marketplace host.
    fn provider_from_url(&self, url: &str) -> Option<String> {
        let parsed = Url::parse(url).ok()?;
        let host = parsed.host_str()?;
        if host != self.marketplace_host
            && !host.ends_with(&format!(".{}", self.marketplace_host))
        {
            return None;
        }

        parsed
            .path_segments()?
            .find(|segment| !segment.is_empty())
            .map(str::to_string)
    }

    /// Isolates an embedded array literal and parses it as JSON.
    ///
    /// Returns `None` on no match or parse failure; these fields are
    /// best-effort.
    fn embedded_array(&self, pattern: &Regex, body: &str) -> Option<Value> {
        let captures = pattern.captures(body)?;
        match serde_json::from_str::<Value>(&captures[1]) {
            Ok(value @ Value::Array(_)) => Some(value),
            Ok(_) => None,
            Err(err) => {
                debug!(error = %err, "Embedded array fragment is not valid JSON");
                None
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use crate::capture::CaptureBuffer;
    use crate::driver::CdpDriver;
    use crate::driver::mock::MockDriver;

    fn record(id: &str, url: &str) -> NetworkResponseRecord {
        NetworkResponseRecord {
            request_id: Some(id.to_string()),
            url: Some(url.to_string()),
            status: Some(200),
            status_text: Some("OK".to_string()),
            headers: Default::default(),
            mime_type: Some("text/x-component".to_string()),
            timestamp: None,
            resource_type: Some("Fetch".to_string()),
        }
    }

    async fn live_monitor(driver: &Arc<MockDriver>) -> NetworkMonitor {
        let monitor = NetworkMonitor::new(
            Arc::clone(driver) as Arc<dyn CdpDriver>,
            Arc::new(CaptureBuffer::default()),
        );
        assert!(monitor.start().await);
        monitor
    }

    #[tokio::test]
    async fn test_description_extracted() {
        let driver = MockDriver::new();
        driver.set_body(
            "req-1",
            r#"1:["meta",{"x":1}] "description","content":"Free weather data" 2:[...]"#,
        );
        let monitor = live_monitor(&driver).await;

        let extractor = ComponentExtractor::new(DEFAULT_MARKETPLACE_HOST).expect("patterns compile");
        let fields = extractor
            .extract(&monitor, &[record("req-1", "https://rapidapi.com/acme/api/weather")])
            .await;

        assert_eq!(fields.description.as_deref(), Some("Free weather data"));
    }

    #[tokio::test]
    async fn test_provider_from_marketplace_url() {
        let driver = MockDriver::new();
        driver.set_body("req-1", "payload without patterns");
        let monitor = live_monitor(&driver).await;

        let extractor = ComponentExtractor::new(DEFAULT_MARKETPLACE_HOST).expect("patterns compile");
        let fields = extractor
            .extract(&monitor, &[record("req-1", "https://rapidapi.com/acme-corp/api/weather")])
            .await;

        assert_eq!(fields.provider.as_deref(), Some("acme-corp"));
    }

    #[tokio::test]
    async fn test_provider_ignored_for_other_hosts() {
        let driver = MockDriver::new();
        driver.set_body("req-1", "payload");
        let monitor = live_monitor(&driver).await;

        let extractor = ComponentExtractor::new(DEFAULT_MARKETPLACE_HOST).expect("patterns compile");
        let fields = extractor
            .extract(&monitor, &[record("req-1", "https://other.example/acme/api/x")])
            .await;

        assert_eq!(fields.provider, None);
    }

    #[tokio::test]
    async fn test_pricing_plans_on_pricing_route() {
        let driver = MockDriver::new();
        driver.set_body(
            "req-1",
            "framing\n\"plans\": [{\"name\":\"BASIC\",\n\"price\":0}]\nmore framing",
        );
        let monitor = live_monitor(&driver).await;

        let extractor = ComponentExtractor::new(DEFAULT_MARKETPLACE_HOST).expect("patterns compile");
        let fields = extractor
            .extract(
                &monitor,
                &[record("req-1", "https://rapidapi.com/acme/api/weather/pricing")],
            )
            .await;

        let pricing = fields.pricing.expect("pricing");
        assert_eq!(pricing["tiers"][0]["name"], "BASIC");
    }

    #[tokio::test]
    async fn test_invalid_plans_fragment_ignored() {
        let driver = MockDriver::new();
        driver.set_body("req-1", r#""plans": [{"name": }]"#);
        let monitor = live_monitor(&driver).await;

        let extractor = ComponentExtractor::new(DEFAULT_MARKETPLACE_HOST).expect("patterns compile");
        let fields = extractor
            .extract(
                &monitor,
                &[record("req-1", "https://rapidapi.com/acme/api/weather/pricing")],
            )
            .await;

        assert_eq!(fields.pricing, None);
    }

    #[tokio::test]
    async fn test_endpoints_on_playground_route() {
        let driver = MockDriver::new();
        driver.set_body(
            "req-1",
            r#"x:"endpoints": [{"path":"/v1/current","method":"GET"}]"#,
        );
        let monitor = live_monitor(&driver).await;

        let extractor = ComponentExtractor::new(DEFAULT_MARKETPLACE_HOST).expect("patterns compile");
        let fields = extractor
            .extract(
                &monitor,
                &[record("req-1", "https://rapidapi.com/acme/api/weather/Playground")],
            )
            .await;

        let endpoints = fields.endpoints.expect("endpoints");
        assert_eq!(endpoints[0]["path"], "/v1/current");
    }

    #[tokio::test]
    async fn test_non_api_routes_skipped() {
        let driver = MockDriver::new();
        driver.set_body("req-1", r#""description","content":"should not appear""#);
        let monitor = live_monitor(&driver).await;

        let extractor = ComponentExtractor::new(DEFAULT_MARKETPLACE_HOST).expect("patterns compile");
        let fields = extractor
            .extract(&monitor, &[record("req-1", "https://rapidapi.com/acme/assets/app.js")])
            .await;

        assert!(fields.is_empty());
    }

    #[tokio::test]
    async fn test_missing_body_does_not_poison_siblings() {
        let driver = MockDriver::new();
        // req-1 has no canned body: the fetch fails for it.
        driver.set_body("req-2", r#""description","content":"From the second record""#);
        let monitor = live_monitor(&driver).await;

        let extractor = ComponentExtractor::new(DEFAULT_MARKETPLACE_HOST).expect("patterns compile");
        let fields = extractor
            .extract(
                &monitor,
                &[
                    record("req-1", "https://rapidapi.com/acme/api/weather"),
                    record("req-2", "https://rapidapi.com/acme/api/weather/details"),
                ],
            )
            .await;

        assert_eq!(fields.description.as_deref(), Some("From the second record"));
    }

    #[tokio::test]
    async fn test_later_record_overwrites_earlier() {
        let driver = MockDriver::new();
        driver.set_body("req-1", r#""description","content":"first""#);
        driver.set_body("req-2", r#""description","content":"second""#);
        let monitor = live_monitor(&driver).await;

        let extractor = ComponentExtractor::new(DEFAULT_MARKETPLACE_HOST).expect("patterns compile");
        let fields = extractor
            .extract(
                &monitor,
                &[
                    record("req-1", "https://rapidapi.com/acme/api/weather"),
                    record("req-2", "https://rapidapi.com/acme/api/weather/about"),
                ],
            )
            .await;

        assert_eq!(fields.description.as_deref(), Some("second"));
    }
}
