//! Error types for cdp-capture.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use cdp_capture::{Result, Error};
//!
//! async fn example(driver: &dyn CdpDriver) -> Result<()> {
//!     driver.navigate("https://example.com").await?;
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Lifecycle | [`Error::Monitor`] |
//! | Protocol | [`Error::Cdp`] |
//! | Browser | [`Error::Navigation`], [`Error::Script`] |
//! | Parsing | [`Error::Pattern`], [`Error::Json`] |
//!
//! Note that most capture-path failures never surface as [`Error`]: malformed
//! events are dropped, lifecycle failures are boolean-coded by the monitor,
//! and the orchestrator degrades to the static assessment path. [`Error`]
//! carries the underlying cause between those layers.

// ============================================================================
// Imports
// ============================================================================

use std::result::Result as StdResult;

use thiserror::Error;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
///
/// All fallible operations in this crate return this type.
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
///
/// Each variant includes relevant context for debugging.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Lifecycle Errors
    // ========================================================================
    /// Network monitoring lifecycle error.
    ///
    /// Returned when enabling or disabling capture fails.
    #[error("Monitor error: {message}")]
    Monitor {
        /// Description of the lifecycle failure.
        message: String,
    },

    // ========================================================================
    // Protocol Errors
    // ========================================================================
    /// CDP command failed.
    ///
    /// Returned when the driver rejects or fails a DevTools command.
    #[error("CDP command {method} failed: {message}")]
    Cdp {
        /// The `Domain.method` that failed.
        method: String,
        /// Description of the failure.
        message: String,
    },

    // ========================================================================
    // Browser Errors
    // ========================================================================
    /// Navigation failed.
    ///
    /// Returned when the driver cannot load the target URL.
    #[error("Navigation to {url} failed: {message}")]
    Navigation {
        /// The URL that failed to load.
        url: String,
        /// Description of the failure.
        message: String,
    },

    /// JavaScript execution error.
    ///
    /// Returned when script execution fails in the browser.
    #[error("Script error: {message}")]
    Script {
        /// Error message from script execution.
        message: String,
    },

    // ========================================================================
    // Parsing Errors
    // ========================================================================
    /// Extraction pattern failed to compile.
    #[error("Pattern error: {0}")]
    Pattern(#[from] regex::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a monitor lifecycle error.
    #[inline]
    pub fn monitor(message: impl Into<String>) -> Self {
        Self::Monitor {
            message: message.into(),
        }
    }

    /// Creates a CDP command error.
    #[inline]
    pub fn cdp(method: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Cdp {
            method: method.into(),
            message: message.into(),
        }
    }

    /// Creates a navigation error.
    #[inline]
    pub fn navigation(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Navigation {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Creates a script error.
    #[inline]
    pub fn script(message: impl Into<String>) -> Self {
        Self::Script {
            message: message.into(),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this error is transient to one captured record.
    ///
    /// Transient errors are logged and skipped; capture continues.
    #[inline]
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Json(_))
    }

    /// Returns `true` if this is a monitoring lifecycle error.
    ///
    /// Lifecycle errors are reported as boolean failure to the caller,
    /// which must degrade to the static assessment path.
    #[inline]
    #[must_use]
    pub fn is_lifecycle(&self) -> bool {
        matches!(self, Self::Monitor { .. } | Self::Cdp { .. })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::monitor("enable failed");
        assert_eq!(err.to_string(), "Monitor error: enable failed");
    }

    #[test]
    fn test_cdp_error_display() {
        let err = Error::cdp("Network.enable", "not connected");
        assert_eq!(
            err.to_string(),
            "CDP command Network.enable failed: not connected"
        );
    }

    #[test]
    fn test_is_lifecycle() {
        let monitor_err = Error::monitor("test");
        let cdp_err = Error::cdp("Network.disable", "test");
        let script_err = Error::script("test");

        assert!(monitor_err.is_lifecycle());
        assert!(cdp_err.is_lifecycle());
        assert!(!script_err.is_lifecycle());
    }

    #[test]
    fn test_is_transient() {
        let json_err: Error = serde_json::from_str::<String>("invalid").unwrap_err().into();
        let nav_err = Error::navigation("https://example.com", "timeout");

        assert!(json_err.is_transient());
        assert!(!nav_err.is_transient());
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<String>("invalid").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Json(_)));
    }
}
