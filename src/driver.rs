//! Browser driver seam.
//!
//! The capture subsystem does not own a browser. It drives an opaque handle
//! that exposes the small capability set it needs: raw CDP command dispatch,
//! CDP event listener registration, navigation, and script execution.
//!
//! Implementations wrap whatever automation stack is in use; event handlers
//! registered through [`CdpDriver::add_cdp_listener`] are invoked from a
//! driver-owned delivery thread, not from the caller's task.
//!
//! # CDP Surface
//!
//! | Constant | Used for |
//! |----------|----------|
//! | [`NETWORK_ENABLE`] | Start delivery of network lifecycle events |
//! | [`NETWORK_DISABLE`] | Stop delivery of network lifecycle events |
//! | [`NETWORK_GET_RESPONSE_BODY`] | Fetch a captured response body |
//! | [`EVENT_REQUEST_WILL_BE_SENT`] | Request metadata event |
//! | [`EVENT_RESPONSE_RECEIVED`] | Response metadata event |

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

// ============================================================================
// CDP Method / Event Names
// ============================================================================

/// Enables the CDP Network domain.
pub const NETWORK_ENABLE: &str = "Network.enable";

/// Disables the CDP Network domain.
pub const NETWORK_DISABLE: &str = "Network.disable";

/// Retrieves a response body by request ID.
pub const NETWORK_GET_RESPONSE_BODY: &str = "Network.getResponseBody";

/// Emitted when the browser is about to send a request.
pub const EVENT_REQUEST_WILL_BE_SENT: &str = "Network.requestWillBeSent";

/// Emitted when response headers arrive.
pub const EVENT_RESPONSE_RECEIVED: &str = "Network.responseReceived";

// ============================================================================
// CdpEventHandler
// ============================================================================

/// Callback invoked for each delivered CDP event message.
///
/// Runs on the driver's event-delivery thread. Handlers must be cheap and
/// must never block on driver calls.
pub type CdpEventHandler = Arc<dyn Fn(&Value) + Send + Sync>;

// ============================================================================
// CdpDriver
// ============================================================================

/// Capability set required from the underlying browser driver.
///
/// # Example
///
/// ```ignore
/// let result = driver
///     .execute_cdp_command(NETWORK_GET_RESPONSE_BODY, json!({ "requestId": id }))
///     .await?;
/// ```
#[async_trait]
pub trait CdpDriver: Send + Sync {
    /// Executes a raw CDP command (`Domain.method` format) and returns the
    /// command result object.
    async fn execute_cdp_command(&self, method: &str, params: Value) -> Result<Value>;

    /// Registers a listener for a CDP event.
    ///
    /// The handler is invoked from the driver's delivery thread for every
    /// matching event until listeners are dropped with the Network domain.
    async fn add_cdp_listener(&self, event: &str, handler: CdpEventHandler) -> Result<()>;

    /// Navigates the browser to a URL.
    async fn navigate(&self, url: &str) -> Result<()>;

    /// Executes JavaScript in the page context.
    async fn execute_script(&self, script: &str) -> Result<Value>;
}

// ============================================================================
// Mock Driver (test support)
// ============================================================================
