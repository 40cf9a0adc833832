//! Network monitoring lifecycle and response body retrieval.
//!
//! [`NetworkMonitor`] enables the CDP Network domain, registers the capture
//! handlers, and gates body retrieval on the monitoring state. Lifecycle
//! failures are boolean-coded: `start`/`stop` log the underlying cause and
//! report `false`, and the caller degrades (skips capture, or proceeds to
//! shutdown anyway). Nothing in this module panics or propagates an error
//! to the orchestrator.
//!
//! # State Machine
//!
//! ```text
//! Stopped ──start()──▶ Starting ──▶ Monitoring
//!    ▲                    │             │
//!    └──────(failure)─────┘             │
//!    ▲                                  │
//!    └───── Stopping ◀────stop()────────┘
//! ```
//!
//! `Starting` and `Stopping` are transient within a single call; concurrent
//! observers only ever see `Stopped` or `Monitoring` between calls.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as Base64Standard;
use parking_lot::Mutex;
use serde_json::{Value, json};
use tracing::{debug, error, info, warn};

use crate::capture::CaptureBuffer;
use crate::driver::{
    CdpDriver, CdpEventHandler, EVENT_REQUEST_WILL_BE_SENT, EVENT_RESPONSE_RECEIVED,
    NETWORK_DISABLE, NETWORK_ENABLE, NETWORK_GET_RESPONSE_BODY,
};

// ============================================================================
// MonitorState
// ============================================================================

/// Monitoring lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    /// Not capturing; body retrieval unavailable.
    Stopped,

    /// Transient: enabling the Network domain and registering handlers.
    Starting,

    /// Capturing; body retrieval available.
    Monitoring,

    /// Transient: disabling the Network domain.
    Stopping,
}

// ============================================================================
// NetworkMonitor
// ============================================================================

/// Controls network capture over an opaque driver handle.
///
/// # Example
///
/// ```ignore
/// let monitor = NetworkMonitor::new(driver, buffer);
/// if monitor.start().await {
///     // ... drive the page, then:
///     let body = monitor.response_body("req-42").await;
///     monitor.stop().await;
/// }
/// ```
pub struct NetworkMonitor {
    /// Opaque browser driver handle.
    driver: Arc<dyn CdpDriver>,

    /// Shared capture buffer fed by the event handlers.
    buffer: Arc<CaptureBuffer>,

    /// Current lifecycle state.
    state: Mutex<MonitorState>,
}

// ============================================================================
// NetworkMonitor - Constructor
// ============================================================================

impl NetworkMonitor {
    /// Creates a stopped monitor over `driver`, feeding `buffer`.
    #[must_use]
    pub fn new(driver: Arc<dyn CdpDriver>, buffer: Arc<CaptureBuffer>) -> Self {
        Self {
            driver,
            buffer,
            state: Mutex::new(MonitorState::Stopped),
        }
    }

    /// Returns the current lifecycle state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> MonitorState {
        *self.state.lock()
    }

    /// Returns `true` while capture is active.
    #[inline]
    #[must_use]
    pub fn is_monitoring(&self) -> bool {
        self.state() == MonitorState::Monitoring
    }
}

// ============================================================================
// NetworkMonitor - Lifecycle
// ============================================================================

impl NetworkMonitor {
    /// Starts network capture.
    ///
    /// No-op success when already monitoring. Enables the Network domain and
    /// registers the request/response handlers; any failure leaves the state
    /// `Stopped` and returns `false`. Callers must treat `false` as
    /// "monitoring unavailable" and proceed without capture.
    pub async fn start(&self) -> bool {
        {
            let mut state = self.state.lock();
            if *state == MonitorState::Monitoring {
                return true;
            }
            *state = MonitorState::Starting;
        }

        match self.enable_and_register().await {
            Ok(()) => {
                *self.state.lock() = MonitorState::Monitoring;
                info!("Network monitoring started");
                true
            }
            Err(err) => {
                *self.state.lock() = MonitorState::Stopped;
                error!(error = %err, "Failed to start network monitoring");
                false
            }
        }
    }

    /// Stops network capture.
    ///
    /// No-op success when already stopped. The Network domain disable is
    /// best-effort: its failure is logged and reported as `false`, but the
    /// state is reset to `Stopped` unconditionally so repeated stop calls
    /// never hang shutdown.
    pub async fn stop(&self) -> bool {
        {
            let mut state = self.state.lock();
            if *state == MonitorState::Stopped {
                return true;
            }
            *state = MonitorState::Stopping;
        }

        let result = self
            .driver
            .execute_cdp_command(NETWORK_DISABLE, json!({}))
            .await;

        *self.state.lock() = MonitorState::Stopped;

        match result {
            Ok(_) => {
                info!("Network monitoring stopped");
                true
            }
            Err(err) => {
                error!(error = %err, "Failed to stop network monitoring cleanly");
                false
            }
        }
    }

    /// Enables the Network domain and registers both capture handlers.
    async fn enable_and_register(&self) -> crate::Result<()> {
        self.driver
            .execute_cdp_command(NETWORK_ENABLE, json!({}))
            .await?;

        let request_buffer = Arc::clone(&self.buffer);
        let request_handler: CdpEventHandler = Arc::new(move |message: &Value| {
            request_buffer.record_request(message);
        });
        self.driver
            .add_cdp_listener(EVENT_REQUEST_WILL_BE_SENT, request_handler)
            .await?;

        let response_buffer = Arc::clone(&self.buffer);
        let response_handler: CdpEventHandler = Arc::new(move |message: &Value| {
            response_buffer.record_response(message);
        });
        self.driver
            .add_cdp_listener(EVENT_RESPONSE_RECEIVED, response_handler)
            .await?;

        Ok(())
    }
}

// ============================================================================
// NetworkMonitor - Body Retrieval
// ============================================================================

impl NetworkMonitor {
    /// Fetches the full response body for a captured request ID.
    ///
    /// Returns `None` (with a warning) when monitoring is inactive or the
    /// fetch fails; fetch errors are never propagated. Base64-encoded bodies
    /// are decoded to text.
    pub async fn response_body(&self, request_id: &str) -> Option<String> {
        if !self.is_monitoring() {
            warn!(request_id, "Body requested while monitoring is inactive");
            return None;
        }

        let result = self
            .driver
            .execute_cdp_command(
                NETWORK_GET_RESPONSE_BODY,
                json!({ "requestId": request_id }),
            )
            .await;

        match result {
            Ok(value) => {
                let body = value.get("body").and_then(Value::as_str)?;
                let encoded = value
                    .get("base64Encoded")
                    .and_then(Value::as_bool)
                    .unwrap_or(false);

                if encoded {
                    match Base64Standard.decode(body) {
                        Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
                        Err(err) => {
                            warn!(request_id, error = %err, "Invalid base64 response body");
                            None
                        }
                    }
                } else {
                    debug!(request_id, body_len = body.len(), "Response body fetched");
                    Some(body.to_string())
                }
            }
            Err(err) => {
                warn!(request_id, error = %err, "Failed to fetch response body");
                None
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
