//! Assessment report and the static-assessment seam.
//!
//! [`AssessmentReport`] is the result record callers receive: a mapping of
//! catalog field names (the same names the extractors populate) to values.
//! The static assessor produces the baseline; capture-derived
//! [`EnhancedFields`](crate::extract::EnhancedFields) are merged over it.

// ============================================================================
// Imports
// ============================================================================

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::Result;
use crate::extract::EnhancedFields;

// ============================================================================
// AssessmentReport
// ============================================================================

/// Catalog assessment result: field name → value mapping.
///
/// # Merge Rule
///
/// An enhanced field overwrites the baseline only when its value is truthy
/// and differs from the existing one. This mirrors the marketplace client's
/// long-standing behavior; note it silently discards legitimate falsy
/// captured values (a `rating` of `0.0`, an empty-string `provider`) in
/// favor of the baseline.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssessmentReport(Map<String, Value>);

// ============================================================================
// AssessmentReport - Construction / Access
// ============================================================================

impl AssessmentReport {
    /// Creates an empty report.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a field value, if present.
    #[inline]
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Sets a field value.
    #[inline]
    pub fn set(&mut self, field: impl Into<String>, value: Value) {
        self.0.insert(field.into(), value);
    }

    /// Returns the number of populated fields.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` when no field is populated.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consumes the report into its underlying map.
    #[inline]
    #[must_use]
    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for AssessmentReport {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

// ============================================================================
// AssessmentReport - Merging
// ============================================================================

impl AssessmentReport {
    /// Overlays capture-derived fields on the report.
    ///
    /// Each field is applied only when its value is truthy and differs from
    /// the current one (see the type-level note on this rule).
    pub fn merge_enhanced(&mut self, fields: &EnhancedFields) {
        for (key, value) in fields.to_pairs() {
            if !is_truthy(&value) {
                continue;
            }
            if self.0.get(key) == Some(&value) {
                continue;
            }
            debug!(field = key, "Report field enhanced from network capture");
            self.0.insert(key.to_string(), value);
        }
    }
}

/// Truthiness in the site's sense: null, false, zero, empty string, empty
/// array and empty object are all falsy.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

// ============================================================================
// Assessor
// ============================================================================

/// Static (non-monitored) assessment collaborator.
///
/// Produces the baseline report from page inspection alone; the capture
/// pipeline falls back to this on any failure.
#[async_trait]
pub trait Assessor: Send + Sync {
    /// Assesses a catalog page and returns the baseline report.
    async fn assess(&self, url: &str) -> Result<AssessmentReport>;
}

// ============================================================================
// Tests
// ============================================================================
