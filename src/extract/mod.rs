//! Payload extractors turning captured bodies into typed catalog fields.
//!
//! Two independent parsing strategies over captured response records:
//!
//! | Module | Description |
//! |--------|-------------|
//! | `component` | Pattern-based scan of structured-component (RSC-style) text payloads |
//! | `graphql` | Strict JSON parse of GraphQL response envelopes |
//!
//! The component source is streaming framing with embedded JSON fragments
//! and is not guaranteed to be well-formed JSON at the top level, so the two
//! strategies stay separate. Both accumulate into [`EnhancedFields`].

// ============================================================================
// Submodules
// ============================================================================

mod component;
mod graphql;

// ============================================================================
// Re-exports
// ============================================================================

pub use component::{ComponentExtractor, DEFAULT_MARKETPLACE_HOST};
pub use graphql::GraphqlExtractor;

// ============================================================================
// Imports
// ============================================================================

use serde_json::Value;

// ============================================================================
// EnhancedFields
// ============================================================================

/// Catalog fields recovered from live network capture.
///
/// Produced fresh per assessment; merged over the static baseline, never
/// replacing it wholesale. Loosely-shaped site data (pricing tiers, endpoint
/// lists, popularity) stays as raw JSON values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnhancedFields {
    /// API display name.
    pub name: Option<String>,

    /// API description text.
    pub description: Option<String>,

    /// Provider (publisher) identifier.
    pub provider: Option<String>,

    /// Average rating, coerced to floating point.
    pub rating: Option<f64>,

    /// Review count, coerced to integer.
    pub review_count: Option<i64>,

    /// Popularity metric as published by the site.
    pub popularity: Option<Value>,

    /// Service level metric as published by the site.
    pub service_level: Option<Value>,

    /// Documentation URL.
    pub documentation_url: Option<String>,

    /// Pricing structure, normalized to `{"tiers": [...]}` where possible.
    pub pricing: Option<Value>,

    /// Endpoint/operation list.
    pub endpoints: Option<Value>,
}

// ============================================================================
// EnhancedFields - Accessors
// ============================================================================

impl EnhancedFields {
    /// Returns `true` when no field was extracted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Overlays `other` on top of `self`; `other`'s present fields win.
    ///
    /// Used to apply the GraphQL extractor's output over the component
    /// extractor's, giving GraphQL-derived values precedence per field.
    pub fn overlay(&mut self, other: Self) {
        macro_rules! take {
            ($field:ident) => {
                if other.$field.is_some() {
                    self.$field = other.$field;
                }
            };
        }
        take!(name);
        take!(description);
        take!(provider);
        take!(rating);
        take!(review_count);
        take!(popularity);
        take!(service_level);
        take!(documentation_url);
        take!(pricing);
        take!(endpoints);
    }

    /// Returns present fields as `(wire name, value)` pairs.
    ///
    /// Wire names match the site's camelCase field names, which are also the
    /// keys of the static assessment report.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(&'static str, Value)> {
        let mut pairs = Vec::new();

        if let Some(v) = &self.name {
            pairs.push(("name", Value::String(v.clone())));
        }
        if let Some(v) = &self.description {
            pairs.push(("description", Value::String(v.clone())));
        }
        if let Some(v) = &self.provider {
            pairs.push(("provider", Value::String(v.clone())));
        }
        if let Some(v) = self.rating {
            if let Some(num) = serde_json::Number::from_f64(v) {
                pairs.push(("rating", Value::Number(num)));
            }
        }
        if let Some(v) = self.review_count {
            pairs.push(("reviewCount", Value::Number(v.into())));
        }
        if let Some(v) = &self.popularity {
            pairs.push(("popularity", v.clone()));
        }
        if let Some(v) = &self.service_level {
            pairs.push(("serviceLevel", v.clone()));
        }
        if let Some(v) = &self.documentation_url {
            pairs.push(("documentationUrl", Value::String(v.clone())));
        }
        if let Some(v) = &self.pricing {
            pairs.push(("pricing", v.clone()));
        }
        if let Some(v) = &self.endpoints {
            pairs.push(("endpoints", v.clone()));
        }

        pairs
    }
}

// ============================================================================
// Tests
// ============================================================================
