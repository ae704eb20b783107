//! Per-backend circuit breakers with exponential backoff.
//!
//! [`CircuitBreakerRegistry`] owns one independent state machine per backend
//! name. Every invocation attempt goes through [`CircuitBreakerRegistry::call`],
//! which gates the attempt, applies a deadline while probing, and records the
//! outcome.
//!
//! # State Machine
//!
//! ```text
//! ┌────────┐  N consecutive  ┌────────┐  backoff elapsed  ┌──────────┐
//! │ Closed ├────────────────►│  Open  ├──────────────────►│ HalfOpen │
//! └───▲────┘    failures     └───▲────┘  (checked lazily) └────┬─────┘
//!     │                          │        any failure          │
//!     │                          └─────────────────────────────┤
//!     │              M successes                               │
//!     └────────────────────────────────────────────────────────┘
//! ```
//!
//! There is no timer task: the `Open → HalfOpen` transition is evaluated
//! whenever a backend's state is touched. Time is read from
//! [`tokio::time::Instant`], so the machine follows the tokio clock.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::error::{Result, SearchError};

/// Consecutive failures beyond this count no longer grow the backoff.
pub const MAX_BACKOFF_EXPONENT: u32 = 10;

/// Circuit breaker state for a single backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitState {
    /// Backend is healthy; calls go straight through.
    Closed,
    /// Backend failed too often; calls are rejected until the backoff elapses.
    Open,
    /// Backoff elapsed; calls are allowed under a deadline to probe recovery.
    HalfOpen,
}

impl CircuitState {
    /// Stable lowercase name, as used in status reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::Open => "open",
            Self::HalfOpen => "half_open",
        }
    }
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Health tracking data for a single backend.
#[derive(Debug, Clone)]
pub struct BackendStats {
    /// Current circuit state.
    pub state: CircuitState,
    /// Failures recorded since the last state transition.
    pub failure_count: u32,
    /// Successes recorded since the last state transition.
    pub success_count: u32,
    /// Failures since the last success. Drives the backoff magnitude.
    pub consecutive_failures: u32,
    /// When the last failure was recorded.
    pub last_failure_at: Option<Instant>,
    /// When the last success was recorded.
    pub last_success_at: Option<Instant>,
    /// When the circuit last changed state.
    pub state_changed_at: Instant,
}

impl Default for BackendStats {
    fn default() -> Self {
        Self {
            state: CircuitState::Closed,
            failure_count: 0,
            success_count: 0,
            consecutive_failures: 0,
            last_failure_at: None,
            last_success_at: None,
            state_changed_at: Instant::now(),
        }
    }
}

impl BackendStats {
    fn transition(&mut self, backend: &str, to: CircuitState, now: Instant) {
        tracing::info!(
            backend,
            from = %self.state,
            to = %to,
            consecutive_failures = self.consecutive_failures,
            "circuit breaker transition"
        );
        self.state = to;
        self.state_changed_at = now;
    }
}

/// Configuration for circuit breaker behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures that trip a closed circuit to open.
    pub failure_threshold: u32,
    /// Successes while half-open that close the circuit again.
    pub success_threshold: u32,
    /// Base backoff in seconds, used as-is after the first failure.
    pub open_timeout_secs: f64,
    /// Deadline in seconds applied to each call made while half-open.
    pub half_open_timeout_secs: f64,
    /// Multiplier applied per additional consecutive failure.
    pub backoff_base: f64,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 3,
            success_threshold: 2,
            open_timeout_secs: 60.0,
            half_open_timeout_secs: 30.0,
            backoff_base: 2.0,
        }
    }
}

impl CircuitBreakerConfig {
    /// Base backoff as a [`Duration`].
    pub fn open_timeout(&self) -> Duration {
        secs_to_duration(self.open_timeout_secs)
    }

    /// Half-open call deadline as a [`Duration`].
    pub fn half_open_timeout(&self) -> Duration {
        secs_to_duration(self.half_open_timeout_secs)
    }

    /// Validates this configuration.
    ///
    /// Checks:
    /// - both thresholds are greater than 0
    /// - both timeouts are finite and non-negative
    /// - `backoff_base` is finite and at least 1.0, so backoff never shrinks
    pub fn validate(&self) -> Result<()> {
        if self.failure_threshold == 0 {
            return Err(SearchError::Config(
                "failure_threshold must be greater than 0".into(),
            ));
        }
        if self.success_threshold == 0 {
            return Err(SearchError::Config(
                "success_threshold must be greater than 0".into(),
            ));
        }
        if !self.open_timeout_secs.is_finite() || self.open_timeout_secs < 0.0 {
            return Err(SearchError::Config(
                "open_timeout_secs must be a non-negative number".into(),
            ));
        }
        if !self.half_open_timeout_secs.is_finite() || self.half_open_timeout_secs < 0.0 {
            return Err(SearchError::Config(
                "half_open_timeout_secs must be a non-negative number".into(),
            ));
        }
        if !self.backoff_base.is_finite() || self.backoff_base < 1.0 {
            return Err(SearchError::Config(
                "backoff_base must be a finite number >= 1.0".into(),
            ));
        }
        Ok(())
    }
}

fn secs_to_duration(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs.max(0.0)).unwrap_or(Duration::MAX)
}

/// Read-only snapshot of one backend's breaker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BackendStatus {
    /// Backend name.
    pub backend: String,
    /// Circuit state after refreshing.
    pub state: CircuitState,
    /// Failures since the last success.
    pub consecutive_failures: u32,
    /// Failures since the last transition.
    pub failure_count: u32,
    /// Successes since the last transition.
    pub success_count: u32,
    /// Seconds until the circuit will probe again. Only present when open.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after_secs: Option<f64>,
}

/// Registry of per-backend circuit breakers.
///
/// All bookkeeping for every backend sits behind one mutex. The lock is held
/// only for state refreshes and outcome recording, never while a backend call
/// is in flight, so a slow backend cannot stall anyone else's bookkeeping.
///
/// Stats are created lazily on the first reference to a backend name.
#[derive(Debug)]
pub struct CircuitBreakerRegistry {
    config: CircuitBreakerConfig,
    backends: Mutex<HashMap<String, BackendStats>>,
}

impl CircuitBreakerRegistry {
    /// Create a registry with the given configuration.
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            config,
            backends: Mutex::new(HashMap::new()),
        }
    }

    /// The configuration this registry was built with.
    pub fn config(&self) -> &CircuitBreakerConfig {
        &self.config
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, BackendStats>> {
        self.backends.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Backoff for a given consecutive failure count.
    ///
    /// `open_timeout * backoff_base ^ (min(failures, 10) - 1)`, with a failure
    /// count of 0 treated as 1.
    pub fn backoff(&self, consecutive_failures: u32) -> Duration {
        let exponent = consecutive_failures.clamp(1, MAX_BACKOFF_EXPONENT) - 1;
        let secs = self.config.open_timeout_secs * self.config.backoff_base.powi(exponent as i32);
        secs_to_duration(secs)
    }

    fn retry_after(&self, stats: &BackendStats, now: Instant) -> Duration {
        let elapsed = now.saturating_duration_since(stats.state_changed_at);
        self.backoff(stats.consecutive_failures)
            .saturating_sub(elapsed)
    }

    /// Apply the lazy `Open → HalfOpen` transition if the backoff has elapsed.
    fn refresh(&self, backend: &str, stats: &mut BackendStats, now: Instant) {
        if stats.state != CircuitState::Open {
            return;
        }
        let elapsed = now.saturating_duration_since(stats.state_changed_at);
        if elapsed >= self.backoff(stats.consecutive_failures) {
            stats.transition(backend, CircuitState::HalfOpen, now);
            stats.failure_count = 0;
            stats.success_count = 0;
        }
    }

    /// Whether `backend` may be called right now (its circuit is not open).
    ///
    /// Refreshes the state first but never touches the counters.
    pub fn is_available(&self, backend: &str) -> bool {
        self.state(backend) != CircuitState::Open
    }

    /// Current state of `backend`, after refreshing.
    pub fn state(&self, backend: &str) -> CircuitState {
        let mut backends = self.lock();
        let stats = backends.entry(backend.to_owned()).or_default();
        self.refresh(backend, stats, Instant::now());
        stats.state
    }

    /// Run one attempt of `operation` against `backend` through its breaker.
    ///
    /// - Open: fails with [`SearchError::BackendUnavailable`] without calling
    ///   `operation`.
    /// - HalfOpen: `operation` runs under the half-open deadline; expiry is
    ///   a [`SearchError::BackendInvocationFailed`].
    /// - Closed: `operation` runs with no deadline.
    ///
    /// The outcome is recorded and then returned unchanged. The deadline is
    /// decided from the state observed before the call starts.
    pub async fn call<T, F, Fut>(&self, backend: &str, operation: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let state = {
            let mut backends = self.lock();
            let now = Instant::now();
            let stats = backends.entry(backend.to_owned()).or_default();
            self.refresh(backend, stats, now);
            if stats.state == CircuitState::Open {
                return Err(SearchError::BackendUnavailable {
                    backend: backend.to_owned(),
                    retry_after: self.retry_after(stats, now),
                });
            }
            stats.state
        };

        let outcome = if state == CircuitState::HalfOpen {
            let deadline = self.config.half_open_timeout();
            match tokio::time::timeout(deadline, operation()).await {
                Ok(outcome) => outcome,
                Err(_) => Err(SearchError::invocation(
                    backend,
                    format!(
                        "timed out after {:.1}s while half-open",
                        deadline.as_secs_f64()
                    ),
                )),
            }
        } else {
            operation().await
        };

        match &outcome {
            Ok(_) => self.record_success(backend),
            Err(err) => self.record_failure(backend, err),
        }
        outcome
    }

    /// Record a successful call for `backend`.
    ///
    /// Zeroes the consecutive failure count; closes a half-open circuit once
    /// enough successes have accumulated.
    pub fn record_success(&self, backend: &str) {
        let mut backends = self.lock();
        let now = Instant::now();
        let stats = backends.entry(backend.to_owned()).or_default();
        stats.success_count = stats.success_count.saturating_add(1);
        stats.last_success_at = Some(now);
        stats.consecutive_failures = 0;

        if stats.state == CircuitState::HalfOpen
            && stats.success_count >= self.config.success_threshold
        {
            stats.transition(backend, CircuitState::Closed, now);
            stats.failure_count = 0;
            stats.success_count = 0;
        }
    }

    /// Record a failed call for `backend`.
    ///
    /// A closed circuit opens at the failure threshold; a half-open circuit
    /// reopens on the first failure.
    pub fn record_failure(&self, backend: &str, error: &SearchError) {
        let mut backends = self.lock();
        let now = Instant::now();
        let stats = backends.entry(backend.to_owned()).or_default();
        stats.failure_count = stats.failure_count.saturating_add(1);
        stats.consecutive_failures = stats.consecutive_failures.saturating_add(1);
        stats.last_failure_at = Some(now);

        tracing::warn!(
            backend,
            error = %error,
            consecutive_failures = stats.consecutive_failures,
            "backend call failed"
        );

        match stats.state {
            CircuitState::HalfOpen => {
                stats.transition(backend, CircuitState::Open, now);
                stats.success_count = 0;
            }
            CircuitState::Closed
                if stats.consecutive_failures >= self.config.failure_threshold =>
            {
                stats.transition(backend, CircuitState::Open, now);
            }
            _ => {}
        }
    }

    /// Snapshot of one backend's breaker, after refreshing.
    pub fn status(&self, backend: &str) -> BackendStatus {
        let mut backends = self.lock();
        let now = Instant::now();
        let stats = backends.entry(backend.to_owned()).or_default();
        self.refresh(backend, stats, now);
        self.snapshot(backend, stats, now)
    }

    /// Snapshot of every backend seen so far, keyed by name.
    pub fn all_status(&self) -> BTreeMap<String, BackendStatus> {
        let mut backends = self.lock();
        let now = Instant::now();
        backends
            .iter_mut()
            .map(|(name, stats)| {
                self.refresh(name, stats, now);
                (name.clone(), self.snapshot(name, stats, now))
            })
            .collect()
    }

    fn snapshot(&self, backend: &str, stats: &BackendStats, now: Instant) -> BackendStatus {
        let retry_after_secs = (stats.state == CircuitState::Open)
            .then(|| self.retry_after(stats, now).as_secs_f64());
        BackendStatus {
            backend: backend.to_owned(),
            state: stats.state,
            consecutive_failures: stats.consecutive_failures,
            failure_count: stats.failure_count,
            success_count: stats.success_count,
            retry_after_secs,
        }
    }

    /// Reset one backend to a fresh closed circuit, or every backend when
    /// `backend` is `None`.
    pub fn reset(&self, backend: Option<&str>) {
        let mut backends = self.lock();
        match backend {
            Some(name) => {
                backends.insert(name.to_owned(), BackendStats::default());
                tracing::info!(backend = name, "circuit breaker reset");
            }
            None => {
                backends.clear();
                tracing::info!("all circuit breakers reset");
            }
        }
    }
}

impl Default for CircuitBreakerRegistry {
    fn default() -> Self {
        Self::new(CircuitBreakerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn make_registry(failure_threshold: u32, success_threshold: u32) -> CircuitBreakerRegistry {
        CircuitBreakerRegistry::new(CircuitBreakerConfig {
            failure_threshold,
            success_threshold,
            open_timeout_secs: 10.0,
            half_open_timeout_secs: 5.0,
            backoff_base: 2.0,
        })
    }

    async fn fail(registry: &CircuitBreakerRegistry, backend: &str) -> Result<()> {
        registry
            .call(backend, || async move {
                Err::<(), _>(SearchError::invocation(backend, "boom"))
            })
            .await
    }

    async fn succeed(registry: &CircuitBreakerRegistry, backend: &str) -> Result<u32> {
        registry.call(backend, || async { Ok(7) }).await
    }

    async fn trip(registry: &CircuitBreakerRegistry, backend: &str) {
        for _ in 0..registry.config().failure_threshold {
            let _ = fail(registry, backend).await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn initial_state_is_closed() {
        let registry = make_registry(3, 2);
        assert!(registry.is_available("google"));
        let status = registry.status("google");
        assert_eq!(status.state, CircuitState::Closed);
        assert_eq!(status.consecutive_failures, 0);
        assert_eq!(status.failure_count, 0);
        assert_eq!(status.success_count, 0);
        assert!(status.retry_after_secs.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn stays_closed_below_threshold() {
        let registry = make_registry(3, 2);
        let _ = fail(&registry, "bing").await;
        let _ = fail(&registry, "bing").await;
        assert_eq!(registry.state("bing"), CircuitState::Closed);
        assert_eq!(registry.status("bing").consecutive_failures, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn opens_at_failure_threshold() {
        let registry = make_registry(3, 2);
        trip(&registry, "google").await;
        assert!(!registry.is_available("google"));
        let status = registry.status("google");
        assert_eq!(status.state, CircuitState::Open);
        assert_eq!(status.consecutive_failures, 3);
        assert!(status.retry_after_secs.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn open_circuit_never_invokes_operation() {
        let registry = make_registry(1, 1);
        trip(&registry, "baidu").await;

        let calls = AtomicUsize::new(0);
        let calls_ref = &calls;
        let result = registry
            .call("baidu", || async move {
                calls_ref.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .await;

        assert!(matches!(
            result,
            Err(SearchError::BackendUnavailable { ref backend, .. }) if backend == "baidu"
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        // Rejected calls are not failures.
        assert_eq!(registry.status("baidu").consecutive_failures, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn errors_are_propagated_unchanged() {
        let registry = make_registry(3, 2);
        let err = fail(&registry, "bing").await.unwrap_err();
        assert_eq!(err.to_string(), "backend bing failed: boom");
    }

    #[tokio::test(start_paused = true)]
    async fn retry_after_strictly_decreases_until_half_open() {
        let registry = make_registry(1, 1);
        trip(&registry, "google").await;

        let mut previous = registry
            .status("google")
            .retry_after_secs
            .expect("open circuit reports retry_after");
        assert!((previous - 10.0).abs() < 1e-9);

        for _ in 0..9 {
            tokio::time::advance(Duration::from_secs(1)).await;
            let status = registry.status("google");
            assert_eq!(status.state, CircuitState::Open);
            let remaining = status.retry_after_secs.expect("still open");
            assert!(remaining < previous, "{remaining} should be < {previous}");
            previous = remaining;
        }

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(registry.is_available("google"));
        assert_eq!(registry.state("google"), CircuitState::HalfOpen);
    }

    #[tokio::test(start_paused = true)]
    async fn half_open_transition_happens_once() {
        let registry = make_registry(1, 2);
        trip(&registry, "google").await;
        tokio::time::advance(Duration::from_secs(10)).await;

        assert_eq!(registry.state("google"), CircuitState::HalfOpen);
        succeed(&registry, "google").await.expect("probe succeeds");

        // Further touches must not re-enter HalfOpen and wipe the progress.
        tokio::time::advance(Duration::from_secs(60)).await;
        let status = registry.status("google");
        assert_eq!(status.state, CircuitState::HalfOpen);
        assert_eq!(status.success_count, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn half_open_transition_resets_counts_but_keeps_consecutive_failures() {
        let registry = make_registry(2, 2);
        trip(&registry, "bing").await;
        tokio::time::advance(Duration::from_secs(20)).await;

        let status = registry.status("bing");
        assert_eq!(status.state, CircuitState::HalfOpen);
        assert_eq!(status.failure_count, 0);
        assert_eq!(status.success_count, 0);
        assert_eq!(status.consecutive_failures, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn single_half_open_failure_reopens() {
        let registry = make_registry(1, 5);
        trip(&registry, "google").await;
        tokio::time::advance(Duration::from_secs(10)).await;
        assert!(registry.is_available("google"));

        succeed(&registry, "google").await.expect("first probe");
        let _ = fail(&registry, "google").await;

        let status = registry.status("google");
        assert_eq!(status.state, CircuitState::Open);
        assert_eq!(status.success_count, 0);
        assert_eq!(status.consecutive_failures, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn reopening_grows_the_backoff() {
        let registry = make_registry(2, 2);
        trip(&registry, "google").await;
        tokio::time::advance(Duration::from_secs(20)).await;
        assert_eq!(registry.state("google"), CircuitState::HalfOpen);

        let _ = fail(&registry, "google").await;
        let status = registry.status("google");
        assert_eq!(status.consecutive_failures, 3);
        let retry = status.retry_after_secs.expect("open");
        assert!((retry - 40.0).abs() < 1e-9, "got {retry}");
    }

    #[tokio::test(start_paused = true)]
    async fn success_threshold_closes_and_resets_counters() {
        let registry = make_registry(1, 2);
        trip(&registry, "bing").await;
        tokio::time::advance(Duration::from_secs(10)).await;

        assert_eq!(succeed(&registry, "bing").await.expect("probe 1"), 7);
        assert_eq!(registry.state("bing"), CircuitState::HalfOpen);
        succeed(&registry, "bing").await.expect("probe 2");

        let status = registry.status("bing");
        assert_eq!(status.state, CircuitState::Closed);
        assert_eq!(status.failure_count, 0);
        assert_eq!(status.success_count, 0);
        assert_eq!(status.consecutive_failures, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn half_open_call_times_out_as_failure() {
        let registry = make_registry(1, 1);
        trip(&registry, "slow").await;
        tokio::time::advance(Duration::from_secs(10)).await;

        let result = registry
            .call("slow", || async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(())
            })
            .await;

        let err = result.unwrap_err();
        assert!(err.to_string().contains("timed out"), "{err}");
        assert_eq!(registry.state("slow"), CircuitState::Open);
    }

    #[tokio::test(start_paused = true)]
    async fn closed_call_has_no_deadline() {
        let registry = make_registry(1, 1);
        let result = registry
            .call("slow", || async {
                tokio::time::sleep(Duration::from_secs(600)).await;
                Ok("done")
            })
            .await;
        assert_eq!(result.expect("closed calls are not timed"), "done");
        assert_eq!(registry.state("slow"), CircuitState::Closed);
    }

    #[tokio::test(start_paused = true)]
    async fn success_resets_consecutive_failures() {
        let registry = make_registry(3, 2);
        let _ = fail(&registry, "google").await;
        let _ = fail(&registry, "google").await;
        succeed(&registry, "google").await.expect("success");

        let status = registry.status("google");
        assert_eq!(status.consecutive_failures, 0);
        assert_eq!(status.failure_count, 2);
        assert_eq!(status.success_count, 1);
        assert_eq!(status.state, CircuitState::Closed);
    }

    #[tokio::test(start_paused = true)]
    async fn alternating_outcomes_never_trip() {
        let registry = make_registry(3, 2);
        for _ in 0..10 {
            let _ = fail(&registry, "google").await;
            let _ = succeed(&registry, "google").await;
        }
        assert_eq!(registry.state("google"), CircuitState::Closed);
    }

    #[tokio::test(start_paused = true)]
    async fn backends_are_independent() {
        let registry = make_registry(2, 2);
        trip(&registry, "google").await;
        assert!(!registry.is_available("google"));
        assert!(registry.is_available("duckduckgo"));
        assert_eq!(registry.state("duckduckgo"), CircuitState::Closed);
    }

    #[test]
    fn backoff_follows_formula() {
        let registry = make_registry(3, 2);
        assert_eq!(registry.backoff(1), Duration::from_secs(10));
        assert_eq!(registry.backoff(2), Duration::from_secs(20));
        assert_eq!(registry.backoff(3), Duration::from_secs(40));
        assert_eq!(registry.backoff(10), Duration::from_secs(10 * 512));
    }

    #[test]
    fn backoff_is_monotonic_and_capped() {
        let registry = make_registry(3, 2);
        let mut previous = Duration::ZERO;
        for failures in 0..=10 {
            let backoff = registry.backoff(failures);
            assert!(backoff >= previous, "backoff shrank at {failures}");
            previous = backoff;
        }
        for failures in 11..40 {
            assert_eq!(registry.backoff(failures), registry.backoff(10));
        }
        assert_eq!(registry.backoff(u32::MAX), registry.backoff(10));
    }

    #[test]
    fn zero_failures_uses_base_timeout() {
        let registry = make_registry(3, 2);
        assert_eq!(registry.backoff(0), registry.backoff(1));
    }

    #[tokio::test(start_paused = true)]
    async fn reset_single_backend_is_idempotent() {
        let registry = make_registry(1, 1);
        trip(&registry, "google").await;
        trip(&registry, "bing").await;

        registry.reset(Some("google"));
        let first = registry.status("google");
        registry.reset(Some("google"));
        let second = registry.status("google");

        assert_eq!(first, second);
        assert_eq!(first.state, CircuitState::Closed);
        assert_eq!(first.consecutive_failures, 0);
        assert_eq!(registry.state("bing"), CircuitState::Open);
    }

    #[tokio::test(start_paused = true)]
    async fn reset_all_clears_every_backend() {
        let registry = make_registry(1, 1);
        trip(&registry, "google").await;
        trip(&registry, "bing").await;

        registry.reset(None);
        assert!(registry.all_status().is_empty());
        assert!(registry.is_available("google"));
        assert!(registry.is_available("bing"));
    }

    #[tokio::test(start_paused = true)]
    async fn all_status_covers_tracked_backends() {
        let registry = make_registry(1, 1);
        trip(&registry, "google").await;
        succeed(&registry, "duckduckgo").await.expect("ok");

        let report = registry.all_status();
        assert_eq!(report.len(), 2);
        assert_eq!(report["google"].state, CircuitState::Open);
        assert_eq!(report["duckduckgo"].state, CircuitState::Closed);
        assert_eq!(report["duckduckgo"].success_count, 1);
    }

    #[test]
    fn status_serializes_retry_after_only_when_open() {
        let closed = BackendStatus {
            backend: "google".into(),
            state: CircuitState::Closed,
            consecutive_failures: 0,
            failure_count: 0,
            success_count: 0,
            retry_after_secs: None,
        };
        let json = serde_json::to_value(&closed).expect("serialize");
        assert_eq!(json["state"], "closed");
        assert!(json.get("retry_after_secs").is_none());

        let open = BackendStatus {
            state: CircuitState::Open,
            retry_after_secs: Some(3.5),
            ..closed
        };
        let json = serde_json::to_value(&open).expect("serialize");
        assert_eq!(json["state"], "open");
        assert_eq!(json["retry_after_secs"], 3.5);
    }

    #[test]
    fn circuit_state_names() {
        assert_eq!(CircuitState::Closed.to_string(), "closed");
        assert_eq!(CircuitState::Open.to_string(), "open");
        assert_eq!(CircuitState::HalfOpen.to_string(), "half_open");
    }

    #[test]
    fn default_config_values() {
        let config = CircuitBreakerConfig::default();
        assert_eq!(config.failure_threshold, 3);
        assert_eq!(config.success_threshold, 2);
        assert_eq!(config.open_timeout(), Duration::from_secs(60));
        assert_eq!(config.half_open_timeout(), Duration::from_secs(30));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_validation_rejects_bad_values() {
        let cases = [
            (
                CircuitBreakerConfig {
                    failure_threshold: 0,
                    ..Default::default()
                },
                "failure_threshold",
            ),
            (
                CircuitBreakerConfig {
                    success_threshold: 0,
                    ..Default::default()
                },
                "success_threshold",
            ),
            (
                CircuitBreakerConfig {
                    open_timeout_secs: -1.0,
                    ..Default::default()
                },
                "open_timeout_secs",
            ),
            (
                CircuitBreakerConfig {
                    half_open_timeout_secs: f64::NAN,
                    ..Default::default()
                },
                "half_open_timeout_secs",
            ),
            (
                CircuitBreakerConfig {
                    backoff_base: 0.5,
                    ..Default::default()
                },
                "backoff_base",
            ),
        ];
        for (config, field) in cases {
            let err = config.validate().unwrap_err();
            assert!(err.to_string().contains(field), "{err}");
        }
    }
}
