//! Bounded capture buffer for network records.
//!
//! Request and response records arrive from the driver's event-delivery
//! thread while the assessment task reads from its own context, so both
//! queues live behind a single [`parking_lot::Mutex`]. The lock is scoped
//! strictly to the append/evict/copy critical section; event normalization
//! and body parsing always happen outside it.
//!
//! Each queue is capped (default 1000 entries). Inserting past the cap
//! evicts the oldest entry first, so readers only ever observe the most
//! recently captured `cap` entries in arrival order.

// ============================================================================
// Imports
// ============================================================================

use std::collections::VecDeque;

use parking_lot::Mutex;
use serde_json::Value;
use tracing::{debug, info};

use super::record::{
    NetworkRequestRecord, NetworkResponseRecord, normalize_request, normalize_response,
};

// ============================================================================
// Constants
// ============================================================================

/// Default maximum entries retained per queue.
pub const DEFAULT_CAPACITY: usize = 1000;

// ============================================================================
// CaptureBuffer
// ============================================================================

/// Thread-safe bounded store for captured request/response metadata.
///
/// # Example
///
/// ```ignore
/// let buffer = CaptureBuffer::new(1000);
/// buffer.record_response(&message);
///
/// let graphql = buffer.get_responses(Some("graphql"));
/// ```
pub struct CaptureBuffer {
    /// Maximum entries retained per queue.
    capacity: usize,

    /// Both queues under one lock; mutation and snapshot only.
    inner: Mutex<Queues>,
}

/// The two ordered record sequences.
#[derive(Default)]
struct Queues {
    requests: VecDeque<NetworkRequestRecord>,
    responses: VecDeque<NetworkResponseRecord>,
}

// ============================================================================
// CaptureBuffer - Constructor
// ============================================================================

impl CaptureBuffer {
    /// Creates a buffer retaining at most `capacity` entries per queue.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            inner: Mutex::new(Queues::default()),
        }
    }

    /// Returns the configured per-queue capacity.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for CaptureBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ============================================================================
// CaptureBuffer - Recording
// ============================================================================

impl CaptureBuffer {
    /// Normalizes and appends a `Network.requestWillBeSent` message.
    ///
    /// Malformed messages are dropped; the oldest entry is evicted when the
    /// queue is full. Called from the driver's event-delivery thread.
    pub fn record_request(&self, message: &Value) {
        // Normalize outside the lock.
        let Some(record) = normalize_request(message) else {
            return;
        };

        debug!(
            method = record.method.as_deref().unwrap_or("-"),
            url = record.url.as_deref().unwrap_or("-"),
            "Network request captured"
        );

        let mut queues = self.inner.lock();
        if queues.requests.len() >= self.capacity {
            queues.requests.pop_front();
        }
        queues.requests.push_back(record);
    }

    /// Normalizes and appends a `Network.responseReceived` message.
    pub fn record_response(&self, message: &Value) {
        let Some(record) = normalize_response(message) else {
            return;
        };

        debug!(
            status = record.status.unwrap_or(0),
            url = record.url.as_deref().unwrap_or("-"),
            "Network response captured"
        );

        let mut queues = self.inner.lock();
        if queues.responses.len() >= self.capacity {
            queues.responses.pop_front();
        }
        queues.responses.push_back(record);
    }
}

// ============================================================================
// CaptureBuffer - Reading
// ============================================================================

impl CaptureBuffer {
    /// Returns a snapshot of captured responses, optionally filtered by a
    /// case-insensitive URL substring.
    ///
    /// Records without a URL match as if their URL were empty, so any
    /// non-empty filter excludes them. Callers receive copies, never live
    /// references into the buffer.
    #[must_use]
    pub fn get_responses(&self, url_filter: Option<&str>) -> Vec<NetworkResponseRecord> {
        let queues = self.inner.lock();
        match url_filter {
            Some(filter) => {
                let needle = filter.to_lowercase();
                queues
                    .responses
                    .iter()
                    .filter(|r| {
                        r.url
                            .as_deref()
                            .unwrap_or("")
                            .to_lowercase()
                            .contains(&needle)
                    })
                    .cloned()
                    .collect()
            }
            None => queues.responses.iter().cloned().collect(),
        }
    }

    /// Returns a snapshot of all captured requests.
    #[must_use]
    pub fn get_requests(&self) -> Vec<NetworkRequestRecord> {
        self.inner.lock().requests.iter().cloned().collect()
    }

    /// Returns `(requests, responses)` queue lengths.
    #[must_use]
    pub fn len(&self) -> (usize, usize) {
        let queues = self.inner.lock();
        (queues.requests.len(), queues.responses.len())
    }

    /// Returns `true` when both queues are empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        let queues = self.inner.lock();
        queues.requests.is_empty() && queues.responses.is_empty()
    }

    /// Atomically empties both queues.
    pub fn clear(&self) {
        let mut queues = self.inner.lock();
        queues.requests.clear();
        queues.responses.clear();
        drop(queues);
        info!("Capture buffer cleared");
    }
}

// ============================================================================
// Tests
// ============================================================================
