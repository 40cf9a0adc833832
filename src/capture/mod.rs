//! Network traffic capture: records, normalization, bounded buffering.
//!
//! # Module Structure
//!
//! | Module | Description |
//! |--------|-------------|
//! | `record` | Canonical request/response records, two-shape event normalizer |
//! | `buffer` | Lock-guarded bounded queues with eviction and snapshot reads |

// ============================================================================
// Submodules
// ============================================================================

mod buffer;
mod record;

// ============================================================================
// Re-exports
// ============================================================================

pub use buffer::{CaptureBuffer, DEFAULT_CAPACITY};
pub use record::{
    NetworkRequestRecord, NetworkResponseRecord, normalize_request, normalize_response,
};
