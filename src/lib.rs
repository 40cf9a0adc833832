//! cdp-capture - Network-capture-enhanced API marketplace assessment.
//!
//! This library extends a browser-automation client with network traffic
//! capture over the Chrome DevTools Protocol (CDP). While a catalog page is
//! driven through scripted interactions, request/response metadata is
//! captured into a bounded buffer; response bodies are then pulled on demand
//! and mined for structured API metadata (description, provider, pricing
//! tiers, endpoint lists) that static page inspection misses.
//!
//! # Architecture
//!
//! Two execution contexts cooperate:
//!
//! - **Assessment task (async)**: drives navigation, interactions, body
//!   fetches, and extraction.
//! - **Driver event-delivery thread**: pushes CDP network events into the
//!   capture buffer without coordinating with the assessment task.
//!
//! The capture buffer's lock is the only shared-mutable-state guard, held
//! strictly for append/evict/copy, never across parsing or driver calls.
//!
//! Key design principles:
//!
//! - Enhancement is opportunistic: every failure path degrades to the
//!   static assessment result, and callers always receive a report.
//! - Bounded memory under unbounded event volume (oldest-entry eviction).
//! - Two independent payload parsers: pattern-based for streamed component
//!   payloads, strict JSON for GraphQL envelopes.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use cdp_capture::{AssessmentSession, Assessor, CdpDriver, Result};
//!
//! async fn run(driver: Arc<dyn CdpDriver>, assessor: Arc<dyn Assessor>) -> Result<()> {
//!     let session = AssessmentSession::builder(driver, assessor).build()?;
//!
//!     let report = session
//!         .assess_enhanced("https://rapidapi.com/acme/api/weather")
//!         .await;
//!     println!("description: {:?}", report.get("description"));
//!
//!     session.shutdown().await;
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`assess`] | Report model, merge rule, orchestration |
//! | [`capture`] | Records, event normalization, bounded buffer |
//! | [`driver`] | CDP driver seam and method/event names |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`extract`] | Component-payload and GraphQL extractors |
//! | [`monitor`] | Monitoring lifecycle and body retrieval |

// ============================================================================
// Modules
// ============================================================================

/// Report model, merge rule, and the assessment orchestrator.
pub mod assess;

/// Network traffic capture: records, normalization, bounded buffering.
pub mod capture;

/// Browser driver seam.
///
/// The opaque capability set this crate requires from an automation stack.
pub mod driver;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Payload extractors turning captured bodies into typed catalog fields.
pub mod extract;

/// Network monitoring lifecycle and response body retrieval.
pub mod monitor;

// ============================================================================
// Re-exports
// ============================================================================

// Assessment types
pub use assess::{AssessmentReport, AssessmentSession, AssessmentSessionBuilder, Assessor};

// Capture types
pub use capture::{CaptureBuffer, NetworkRequestRecord, NetworkResponseRecord};

// Driver seam
pub use driver::{CdpDriver, CdpEventHandler};

// Error types
pub use error::{Error, Result};

// Extraction types
pub use extract::{ComponentExtractor, EnhancedFields, GraphqlExtractor};

// Monitoring types
pub use monitor::{MonitorState, NetworkMonitor};
