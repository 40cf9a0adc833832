//! Capture-enhanced assessment: report model and orchestration.
//!
//! # Module Structure
//!
//! | Module | Description |
//! |--------|-------------|
//! | `report` | [`AssessmentReport`], merge rule, [`Assessor`] baseline seam |
//! | `session` | [`AssessmentSession`] orchestrator and builder |

// ============================================================================
// Submodules
// ============================================================================

mod report;
mod session;

// ============================================================================
// Re-exports
// ============================================================================

pub use report::{AssessmentReport, Assessor};
pub use session::{AssessmentSession, AssessmentSessionBuilder};
