//! Captured network records and CDP event normalization.
//!
//! The driver delivers network lifecycle events in one of two observed
//! shapes:
//!
//! - **Envelope**: the standard CDP wire format, with all event data nested
//!   under a `params` key.
//! - **Flat**: a driver-specific direct shape with fields at the top level
//!   and the `request`/`response` sub-objects optional.
//!
//! [`EventShape`] classifies a raw message (presence of `params` decides),
//! and the normalizers project either shape into a canonical record. Field
//! projection prefers the nested `request`/`response` sub-object and falls
//! back to same-named top-level fields; anything missing or mistyped becomes
//! `None` rather than an error. A single malformed event must never halt
//! monitoring, so non-object messages are dropped with a warning.

// ============================================================================
// Imports
// ============================================================================

use std::collections::HashMap;

use serde_json::Value;
use tracing::warn;

// ============================================================================
// NetworkRequestRecord
// ============================================================================

/// Metadata captured from a `Network.requestWillBeSent` event.
///
/// Immutable once recorded; destroyed when evicted from the capture buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkRequestRecord {
    /// CDP request ID, used to fetch the body later.
    pub request_id: Option<String>,

    /// Request URL.
    pub url: Option<String>,

    /// HTTP method (GET, POST, etc.).
    pub method: Option<String>,

    /// Request headers.
    pub headers: HashMap<String, String>,

    /// CDP monotonic timestamp.
    pub timestamp: Option<f64>,

    /// Resource type (Document, XHR, Fetch, etc.).
    pub resource_type: Option<String>,

    /// Request body, when present.
    pub post_data: Option<String>,
}

// ============================================================================
// NetworkResponseRecord
// ============================================================================

/// Metadata captured from a `Network.responseReceived` event.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkResponseRecord {
    /// CDP request ID, used to fetch the body later.
    pub request_id: Option<String>,

    /// Response URL.
    pub url: Option<String>,

    /// HTTP status code.
    pub status: Option<i64>,

    /// HTTP status text.
    pub status_text: Option<String>,

    /// Response headers.
    pub headers: HashMap<String, String>,

    /// MIME type of the response.
    pub mime_type: Option<String>,

    /// CDP monotonic timestamp.
    pub timestamp: Option<f64>,

    /// Resource type (Document, XHR, Fetch, etc.).
    pub resource_type: Option<String>,
}

// ============================================================================
// EventShape
// ============================================================================

/// The two observed wire shapes of a network event message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EventShape {
    /// Standard CDP envelope: event data nested under `params`.
    Envelope,

    /// Driver-specific direct shape: fields at the top level.
    Flat,
}

impl EventShape {
    /// Classifies a raw message. The `params` key decides.
    fn classify(message: &Value) -> Self {
        if message.get("params").is_some() {
            Self::Envelope
        } else {
            Self::Flat
        }
    }
}

// ============================================================================
// Normalizers
// ============================================================================

/// Projects a raw `Network.requestWillBeSent` message into a record.
///
/// Returns `None` (after logging) when the message is not a JSON object;
/// missing or mistyped fields default to `None` instead of failing.
#[must_use]
pub fn normalize_request(message: &Value) -> Option<NetworkRequestRecord> {
    let body = event_body(message)?;
    let request = body.get("request");

    Some(NetworkRequestRecord {
        request_id: get_string(body, None, "requestId"),
        url: get_string(body, request, "url"),
        method: get_string(body, request, "method"),
        headers: get_headers(body, request),
        timestamp: body.get("timestamp").and_then(Value::as_f64),
        resource_type: get_string(body, None, "type"),
        post_data: get_string(body, request, "postData"),
    })
}

/// Projects a raw `Network.responseReceived` message into a record.
#[must_use]
pub fn normalize_response(message: &Value) -> Option<NetworkResponseRecord> {
    let body = event_body(message)?;
    let response = body.get("response");

    Some(NetworkResponseRecord {
        request_id: get_string(body, None, "requestId"),
        url: get_string(body, response, "url"),
        status: nested_or_top(body, response, "status").and_then(Value::as_i64),
        status_text: get_string(body, response, "statusText"),
        headers: get_headers(body, response),
        mime_type: get_string(body, response, "mimeType"),
        timestamp: body.get("timestamp").and_then(Value::as_f64),
        resource_type: get_string(body, None, "type"),
    })
}

// ============================================================================
// Projection Helpers
// ============================================================================

/// Resolves the object holding event fields for either shape.
fn event_body(message: &Value) -> Option<&Value> {
    if !message.is_object() {
        warn!("Dropping non-object network event message");
        return None;
    }

    let body = match EventShape::classify(message) {
        EventShape::Envelope => message.get("params")?,
        EventShape::Flat => message,
    };

    if body.is_object() {
        Some(body)
    } else {
        warn!("Dropping network event with non-object params");
        None
    }
}

/// Looks up `key` in the nested sub-object first, then at the top level.
fn nested_or_top<'a>(body: &'a Value, nested: Option<&'a Value>, key: &str) -> Option<&'a Value> {
    nested
        .and_then(|n| n.get(key))
        .or_else(|| body.get(key))
}

/// String field with nested-then-top-level fallback.
fn get_string(body: &Value, nested: Option<&Value>, key: &str) -> Option<String> {
    nested_or_top(body, nested, key)
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Header map with nested-then-top-level fallback.
///
/// Non-string header values are skipped; a missing map is empty.
fn get_headers(body: &Value, nested: Option<&Value>) -> HashMap<String, String> {
    nested_or_top(body, nested, "headers")
        .and_then(Value::as_object)
        .map(|obj| {
            obj.iter()
                .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                .collect()
        })
        .unwrap_or_default()
}

// ============================================================================
// Tests
// ============================================================================
