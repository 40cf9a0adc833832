//! Capture-enhanced assessment orchestration.
//!
//! [`AssessmentSession`] drives the end-to-end capture flow: clear the
//! buffer, start monitoring, navigate, trigger page interactions, wait for
//! in-flight calls, run the static assessment, run both extractors over the
//! filtered capture, merge, stop monitoring. Every failure path degrades:
//! a start failure skips capture entirely, any later failure triggers a
//! best-effort stop and falls back to the static assessment. Callers always
//! receive a report; enhancement is opportunistic and its absence is silent.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::capture::{CaptureBuffer, DEFAULT_CAPACITY};
use crate::driver::CdpDriver;
use crate::error::Result;
use crate::extract::{ComponentExtractor, DEFAULT_MARKETPLACE_HOST, GraphqlExtractor};
use crate::monitor::NetworkMonitor;

use super::report::{AssessmentReport, Assessor};

// ============================================================================
// Constants
// ============================================================================

/// Delay after navigation for the initial page load.
const DEFAULT_INITIAL_DELAY: Duration = Duration::from_secs(3);

/// Delay after interactions for triggered calls to complete.
const DEFAULT_INTERACTION_DELAY: Duration = Duration::from_secs(5);

/// Buffer filter for structured-component payload routes.
const API_FILTER: &str = "/api/";

/// Buffer filter for GraphQL gateway routes.
const GRAPHQL_FILTER: &str = "graphql";

/// In-page script triggering the data-loading calls.
///
/// Scrolls, clicks up to five tab-like elements staggered in time, then
/// scrolls to the bottom for lazy loading. Fire-and-forget: failures are
/// caught and logged in-page, never surfaced to the orchestrator.
const INTERACTION_SCRIPT: &str = r#"
window.scrollTo(0, 1000);

setTimeout(() => {
    const tabs = document.querySelectorAll(
        'button[role="tab"], [data-tab], .tab, a[href*="pricing"], a[href*="doc"]');
    tabs.forEach((tab, index) => {
        if (index < 5) {
            setTimeout(() => {
                try {
                    tab.click();
                    console.log('Clicked:', tab.textContent || tab.href);
                } catch (e) {
                    console.log('Could not click:', e);
                }
            }, index * 800);
        }
    });

    setTimeout(() => {
        window.scrollTo(0, document.body.scrollHeight);
    }, 3000);
}, 1000);

return true;
"#;

// ============================================================================
// AssessmentSessionBuilder
// ============================================================================

/// Builder for configuring an [`AssessmentSession`].
///
/// Use [`AssessmentSession::builder()`] to create a new builder.
pub struct AssessmentSessionBuilder {
    /// Opaque browser driver handle.
    driver: Arc<dyn CdpDriver>,
    /// Static baseline assessor.
    assessor: Arc<dyn Assessor>,
    /// Capture buffer capacity per queue.
    capacity: usize,
    /// Marketplace host the provider segment is read from.
    marketplace_host: String,
    /// Post-navigation load delay.
    initial_delay: Duration,
    /// Post-interaction settle delay.
    interaction_delay: Duration,
}

impl AssessmentSessionBuilder {
    /// Sets the capture buffer capacity (default 1000 per queue).
    #[inline]
    #[must_use]
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the marketplace host the provider segment is read from.
    #[inline]
    #[must_use]
    pub fn marketplace_host(mut self, host: impl Into<String>) -> Self {
        self.marketplace_host = host.into();
        self
    }

    /// Sets the post-navigation load delay (default 3 s).
    #[inline]
    #[must_use]
    pub fn initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Sets the post-interaction settle delay (default 5 s).
    #[inline]
    #[must_use]
    pub fn interaction_delay(mut self, delay: Duration) -> Self {
        self.interaction_delay = delay;
        self
    }

    /// Builds the session.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Pattern`] if an extraction pattern fails to
    /// compile.
    pub fn build(self) -> Result<AssessmentSession> {
        let buffer = Arc::new(CaptureBuffer::new(self.capacity));
        let monitor = NetworkMonitor::new(Arc::clone(&self.driver), Arc::clone(&buffer));

        Ok(AssessmentSession {
            driver: self.driver,
            assessor: self.assessor,
            buffer,
            monitor,
            component: ComponentExtractor::new(self.marketplace_host)?,
            graphql: GraphqlExtractor::new(),
            initial_delay: self.initial_delay,
            interaction_delay: self.interaction_delay,
        })
    }
}

// ============================================================================
// AssessmentSession
// ============================================================================

/// End-to-end capture-enhanced assessment driver.
///
/// # Example
///
/// ```ignore
/// let session = AssessmentSession::builder(driver, assessor).build()?;
/// let report = session.assess_enhanced("https://rapidapi.com/acme/api/weather").await;
/// ```
pub struct AssessmentSession {
    /// Opaque browser driver handle.
    driver: Arc<dyn CdpDriver>,

    /// Static baseline assessor.
    assessor: Arc<dyn Assessor>,

    /// Shared capture buffer.
    buffer: Arc<CaptureBuffer>,

    /// Monitoring controller and body fetcher.
    monitor: NetworkMonitor,

    /// Structured-component payload extractor.
    component: ComponentExtractor,

    /// GraphQL envelope extractor.
    graphql: GraphqlExtractor,

    /// Post-navigation load delay.
    initial_delay: Duration,

    /// Post-interaction settle delay.
    interaction_delay: Duration,
}

// ============================================================================
// AssessmentSession - Constructor
// ============================================================================

impl AssessmentSession {
    /// Creates a builder over the driver and static assessor seams.
    #[must_use]
    pub fn builder(
        driver: Arc<dyn CdpDriver>,
        assessor: Arc<dyn Assessor>,
    ) -> AssessmentSessionBuilder {
        AssessmentSessionBuilder {
            driver,
            assessor,
            capacity: DEFAULT_CAPACITY,
            marketplace_host: DEFAULT_MARKETPLACE_HOST.to_string(),
            initial_delay: DEFAULT_INITIAL_DELAY,
            interaction_delay: DEFAULT_INTERACTION_DELAY,
        }
    }

    /// Returns the monitoring controller.
    #[inline]
    #[must_use]
    pub fn monitor(&self) -> &NetworkMonitor {
        &self.monitor
    }

    /// Returns the capture buffer.
    #[inline]
    #[must_use]
    pub fn buffer(&self) -> &CaptureBuffer {
        &self.buffer
    }
}

// ============================================================================
// AssessmentSession - Assessment
// ============================================================================

impl AssessmentSession {
    /// Runs a capture-enhanced assessment of a catalog page.
    ///
    /// Never fails outward: any error degrades to the static assessment
    /// result (after a best-effort monitoring stop), and a static failure
    /// on the fallback path degrades to an empty report.
    pub async fn assess_enhanced(&self, url: &str) -> AssessmentReport {
        info!(url, "Enhanced assessment started");

        match self.run_capture(url).await {
            Ok(report) => report,
            Err(err) => {
                error!(url, error = %err, "Enhanced assessment failed, falling back to static");
                self.monitor.stop().await;
                self.static_fallback(url).await
            }
        }
    }

    /// The monitored assessment sequence; any error here triggers fallback.
    async fn run_capture(&self, url: &str) -> Result<AssessmentReport> {
        self.buffer.clear();

        if !self.monitor.start().await {
            warn!(url, "Monitoring unavailable, using static assessment only");
            return Ok(self.static_fallback(url).await);
        }

        self.driver.navigate(url).await?;
        sleep(self.initial_delay).await;

        // Fire-and-forget: in-page failures stay in-page.
        self.driver.execute_script(INTERACTION_SCRIPT).await?;
        sleep(self.interaction_delay).await;

        let mut report = self.assessor.assess(url).await?;

        let api_responses = self.buffer.get_responses(Some(API_FILTER));
        let graphql_responses = self.buffer.get_responses(Some(GRAPHQL_FILTER));
        info!(
            api_responses = api_responses.len(),
            graphql_responses = graphql_responses.len(),
            "Capture queried"
        );

        let mut fields = self.component.extract(&self.monitor, &api_responses).await;
        fields.overlay(self.graphql.extract(&self.monitor, &graphql_responses).await);

        if fields.is_empty() {
            info!(url, "No enhanced data captured");
        } else {
            report.merge_enhanced(&fields);
        }

        self.monitor.stop().await;
        Ok(report)
    }

    /// Static assessment with a final empty-report degradation.
    async fn static_fallback(&self, url: &str) -> AssessmentReport {
        match self.assessor.assess(url).await {
            Ok(report) => report,
            Err(err) => {
                error!(url, error = %err, "Static assessment failed, returning empty report");
                AssessmentReport::new()
            }
        }
    }

    /// Stops monitoring if still active. Call before discarding the session.
    pub async fn shutdown(&self) {
        if self.monitor.is_monitoring() {
            self.monitor.stop().await;
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use async_trait::async_trait;
    use serde_json::{Value, json};

    use crate::driver::mock::MockDriver;
    use crate::driver::{EVENT_RESPONSE_RECEIVED, NETWORK_ENABLE};
    use crate::error::Error;
    use crate::monitor::MonitorState;

    /// Canned static assessor with failure injection and call counting.
    struct StubAssessor {
        report: AssessmentReport,
        fail: AtomicBool,
        calls: AtomicUsize,
    }

    impl StubAssessor {
        fn returning(report: AssessmentReport) -> Arc<Self> {
            Arc::new(Self {
                report,
                fail: AtomicBool::new(false),
                calls: AtomicUsize::new(0),
            })
        }

        fn baseline() -> AssessmentReport {
            let mut report = AssessmentReport::new();
            report.set("name", json!("Weather API"));
            report.set("description", json!("static description"));
            report
        }
    }

    #[async_trait]
    impl Assessor for StubAssessor {
        async fn assess(&self, url: &str) -> crate::Result<AssessmentReport> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail.load(Ordering::SeqCst) {
                return Err(Error::script(format!("static assessment failed for {url}")));
            }
            Ok(self.report.clone())
        }
    }

    fn response_event(id: &str, url: &str) -> Value {
        json!({
            "params": {
                "requestId": id,
                "response": { "url": url, "status": 200 }
            }
        })
    }

    fn session_over(
        driver: &Arc<MockDriver>,
        assessor: Arc<StubAssessor>,
    ) -> AssessmentSession {
        AssessmentSession::builder(
            Arc::clone(driver) as Arc<dyn CdpDriver>,
            assessor,
        )
        .initial_delay(Duration::ZERO)
        .interaction_delay(Duration::ZERO)
        .build()
        .expect("session builds")
    }

    #[tokio::test]
    async fn test_start_failure_returns_exact_static_result() {
        let driver = MockDriver::new();
        driver.fail_on(NETWORK_ENABLE);
        let assessor = StubAssessor::returning(StubAssessor::baseline());
        let session = session_over(&driver, Arc::clone(&assessor));

        let report = session.assess_enhanced("https://rapidapi.com/acme/api/weather").await;

        assert_eq!(report, StubAssessor::baseline());
        assert_eq!(session.monitor().state(), MonitorState::Stopped);
        // Capture was skipped entirely: no navigation, no interaction script.
        assert!(driver.visited.lock().is_empty());
        assert_eq!(driver.scripts_run.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_navigation_failure_falls_back_to_static() {
        let driver = MockDriver::new();
        *driver.fail_navigation.lock() = true;
        let assessor = StubAssessor::returning(StubAssessor::baseline());
        let session = session_over(&driver, Arc::clone(&assessor));

        let report = session.assess_enhanced("https://rapidapi.com/acme/api/weather").await;

        assert_eq!(report, StubAssessor::baseline());
        assert_eq!(session.monitor().state(), MonitorState::Stopped);
    }

    #[tokio::test]
    async fn test_static_failure_on_fallback_yields_empty_report() {
        let driver = MockDriver::new();
        *driver.fail_navigation.lock() = true;
        let assessor = StubAssessor::returning(StubAssessor::baseline());
        assessor.fail.store(true, Ordering::SeqCst);
        let session = session_over(&driver, Arc::clone(&assessor));

        let report = session.assess_enhanced("https://rapidapi.com/acme/api/weather").await;

        assert!(report.is_empty());
    }

    #[tokio::test]
    async fn test_enhanced_fields_merged_over_baseline() {
        let driver = MockDriver::new();
        driver.traffic_on_navigate(
            EVENT_RESPONSE_RECEIVED,
            response_event("rsc-1", "https://rapidapi.com/acme/api/weather"),
        );
        driver.set_body(
            "rsc-1",
            r#""description","content":"Free weather data""#,
        );

        let assessor = StubAssessor::returning(StubAssessor::baseline());
        let session = session_over(&driver, Arc::clone(&assessor));

        let report = session.assess_enhanced("https://rapidapi.com/acme/api/weather").await;

        assert_eq!(report.get("description"), Some(&json!("Free weather data")));
        assert_eq!(report.get("provider"), Some(&json!("acme")));
        // Baseline fields not contradicted by capture are preserved.
        assert_eq!(report.get("name"), Some(&json!("Weather API")));
        assert_eq!(session.monitor().state(), MonitorState::Stopped);
        assert_eq!(assessor.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_graphql_values_win_over_component_values() {
        let driver = MockDriver::new();
        driver.traffic_on_navigate(
            EVENT_RESPONSE_RECEIVED,
            response_event("rsc-1", "https://rapidapi.com/acme/api/weather"),
        );
        driver.traffic_on_navigate(
            EVENT_RESPONSE_RECEIVED,
            response_event("gql-1", "https://rapidapi.com/gateway/graphql"),
        );
        driver.set_body("rsc-1", r#""description","content":"component description""#);
        driver.set_body(
            "gql-1",
            r#"{"data":{"api":{"description":"graphql description","rating":4.5}}}"#,
        );

        let assessor = StubAssessor::returning(StubAssessor::baseline());
        let session = session_over(&driver, Arc::clone(&assessor));

        let report = session.assess_enhanced("https://rapidapi.com/acme/api/weather").await;

        assert_eq!(report.get("description"), Some(&json!("graphql description")));
        assert_eq!(report.get("rating"), Some(&json!(4.5)));
    }

    #[tokio::test]
    async fn test_interaction_script_dispatched() {
        let driver = MockDriver::new();
        let assessor = StubAssessor::returning(StubAssessor::baseline());
        let session = session_over(&driver, Arc::clone(&assessor));

        session.assess_enhanced("https://rapidapi.com/acme/api/weather").await;

        assert_eq!(driver.visited.lock().len(), 1);
        assert_eq!(driver.scripts_run.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_shutdown_stops_active_monitoring() {
        let driver = MockDriver::new();
        let assessor = StubAssessor::returning(StubAssessor::baseline());
        let session = session_over(&driver, Arc::clone(&assessor));

        assert!(session.monitor().start().await);
        session.shutdown().await;
        assert_eq!(session.monitor().state(), MonitorState::Stopped);

        // Idempotent when already stopped.
        session.shutdown().await;
        assert_eq!(session.monitor().state(), MonitorState::Stopped);
    }

    #[tokio::test]
    async fn test_buffer_cleared_between_assessments() {
        let driver = MockDriver::new();
        driver.traffic_on_navigate(
            EVENT_RESPONSE_RECEIVED,
            response_event("gql-1", "https://rapidapi.com/gateway/graphql"),
        );
        driver.set_body("gql-1", r#"{"data":{"api":{"name":"Weather API"}}}"#);

        let assessor = StubAssessor::returning(StubAssessor::baseline());
        let session = session_over(&driver, Arc::clone(&assessor));

        session.assess_enhanced("https://rapidapi.com/acme/api/weather").await;
        session.assess_enhanced("https://rapidapi.com/acme/api/weather").await;

        // Each run captures one fresh event; stale entries never accumulate.
        assert_eq!(session.buffer().len().1, 1);
    }
}
