//! GraphQL response envelope extractor.
//!
//! Strict-JSON counterpart to the component extractor: each captured body is
//! parsed as JSON and the API-info object is located under `data` at one of
//! the known response shapes, in priority order:
//!
//! 1. `data.api`
//! 2. `data.getApi`
//! 3. `data.apiDetails`
//! 4. `data.marketplace.api`
//!
//! The first record yielding a usable API-info object wins; its recognized
//! fields are projected all at once and scanning stops. Numeric coercions
//! accept both JSON numbers and numeric strings, since the site serves
//! either depending on the resolver.

// ============================================================================
// Imports
// ============================================================================

use serde_json::{Value, json};
use tracing::{info, warn};

use crate::capture::NetworkResponseRecord;
use crate::monitor::NetworkMonitor;

use super::EnhancedFields;

// ============================================================================
// Constants
// ============================================================================

/// Known locations of the API-info object under `data`, in priority order.
const API_INFO_PATHS: [&[&str]; 4] = [
    &["api"],
    &["getApi"],
    &["apiDetails"],
    &["marketplace", "api"],
];

// ============================================================================
// GraphqlExtractor
// ============================================================================

/// Extractor for GraphQL API-info response envelopes.
///
/// Stateless; exists as a type to mirror the component extractor's seam.
#[derive(Debug, Clone, Copy, Default)]
pub struct GraphqlExtractor;

// ============================================================================
// GraphqlExtractor - Extraction
// ============================================================================

impl GraphqlExtractor {
    /// Creates a new extractor.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Scans `responses` and projects the first usable API-info object.
    ///
    /// Bodies that fail to parse as JSON are logged and skipped; a body
    /// without an API-info object does not stop the scan.
    pub async fn extract(
        &self,
        monitor: &NetworkMonitor,
        responses: &[NetworkResponseRecord],
    ) -> EnhancedFields {
        for record in responses {
            let Some(request_id) = record.request_id.as_deref() else {
                continue;
            };
            let Some(body) = monitor.response_body(request_id).await else {
                continue;
            };

            let envelope: Value = match serde_json::from_str(&body) {
                Ok(value) => value,
                Err(err) => {
                    warn!(request_id, error = %err, "GraphQL body is not valid JSON, skipping");
                    continue;
                }
            };

            if let Some(api_info) = find_api_info(&envelope) {
                let fields = project_api_info(api_info);
                info!(request_id, "API info located in GraphQL response");
                return fields;
            }
        }

        EnhancedFields::default()
    }
}

// ============================================================================
// Envelope Navigation
// ============================================================================

/// Locates the API-info object under `data` at the known paths.
///
/// An empty object is not usable; the next path (and the next record) still
/// gets a chance.
fn find_api_info(envelope: &Value) -> Option<&Value> {
    let data = envelope.get("data")?;

    for path in API_INFO_PATHS {
        let mut cursor = data;
        let mut found = true;
        for key in path {
            match cursor.get(key) {
                Some(next) => cursor = next,
                None => {
                    found = false;
                    break;
                }
            }
        }
        if found && cursor.as_object().is_some_and(|m| !m.is_empty()) {
            return Some(cursor);
        }
    }

    None
}

/// Projects recognized fields out of an API-info object.
fn project_api_info(api_info: &Value) -> EnhancedFields {
    EnhancedFields {
        name: non_empty_string(api_info.get("name")),
        description: non_empty_string(api_info.get("description")),
        provider: non_empty_string(api_info.get("provider"))
            .or_else(|| non_empty_string(api_info.get("providerName"))),
        rating: api_info.get("rating").and_then(as_f64_lenient),
        review_count: api_info.get("reviewCount").and_then(as_i64_lenient),
        popularity: present(api_info.get("popularity")),
        service_level: present(api_info.get("serviceLevel")),
        documentation_url: non_empty_string(api_info.get("documentationUrl")),
        // Pricing fallback chain: pricing, then tiers-wrapped pricingTiers/plans.
        pricing: present(api_info.get("pricing"))
            .or_else(|| api_info.get("pricingTiers").map(|t| json!({ "tiers": t })))
            .or_else(|| api_info.get("plans").map(|t| json!({ "tiers": t }))),
        // Endpoints fallback chain: endpoints, methods, operations.
        endpoints: present(api_info.get("endpoints"))
            .or_else(|| present(api_info.get("methods")))
            .or_else(|| present(api_info.get("operations"))),
    }
}

// ============================================================================
// Coercion Helpers
// ============================================================================

/// A non-null, non-empty string value.
fn non_empty_string(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// A present, non-null, non-empty-ish value kept verbatim.
fn present(value: Option<&Value>) -> Option<Value> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::Array(items)) if items.is_empty() => None,
        Some(Value::Object(map)) if map.is_empty() => None,
        Some(other) => Some(other.clone()),
    }
}

/// Coerces a number or numeric string to f64.
fn as_f64_lenient(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Coerces a number or numeric string to i64.
fn as_i64_lenient(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

// ============================================================================
// Tests
// ============================================================================
