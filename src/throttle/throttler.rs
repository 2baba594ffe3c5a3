//! Single-resource sliding-window throttler.

use std::future::Future;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;
use tracing::{debug, trace};

use super::window::SlidingWindow;
use crate::config::ThrottleConfig;
use crate::error::Result;

/// A sliding-window throttler for one logical resource.
///
/// Bounds admissions to `rate_limit` within any trailing interval of
/// `period`. The readiness check and the admission append happen under a
/// single lock, so concurrent callers can never push the window past its
/// limit — two tasks racing on the last free slot will see one admission
/// and one refusal.
///
/// This struct is thread-safe and can be shared across tasks behind an
/// `Arc`.
pub struct Throttler {
    name: String,
    rate_limit: u32,
    period: Duration,
    window: Mutex<SlidingWindow>,
}

impl Throttler {
    /// Create a new throttler.
    ///
    /// Returns [`ThrottleError::InvalidConfiguration`] for a zero
    /// `rate_limit` or `period`; either would make the blocking acquire
    /// path spin forever.
    ///
    /// [`ThrottleError::InvalidConfiguration`]: crate::ThrottleError::InvalidConfiguration
    pub fn new(rate_limit: u32, period: Duration, name: impl Into<String>) -> Result<Self> {
        Self::from_config(&ThrottleConfig { rate_limit, period }, name)
    }

    /// Create a new throttler from a validated configuration.
    pub fn from_config(config: &ThrottleConfig, name: impl Into<String>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            name: name.into(),
            rate_limit: config.rate_limit,
            period: config.period,
            window: Mutex::new(SlidingWindow::new(config.rate_limit, config.period)),
        })
    }

    /// Name of the resource this throttler guards.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Maximum admissions per window.
    pub fn rate_limit(&self) -> u32 {
        self.rate_limit
    }

    /// Window length.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Non-blocking probe: admit one operation now if the window has room.
    ///
    /// Returns `false` when the window is at capacity. That is the normal
    /// "try later" outcome, not an error, and leaves the window untouched.
    pub fn try_acquire(&self) -> bool {
        let now = Instant::now();
        let mut window = self.window.lock();

        if window.is_ready(now) {
            window.record(now);
            trace!(
                name = %self.name,
                in_window = window.len(),
                "Admitted"
            );
            true
        } else {
            trace!(name = %self.name, "Window full, probe refused");
            false
        }
    }

    /// Admit one operation, waiting for the window to open if necessary.
    ///
    /// When the window is full, the caller sleeps until the oldest entry is
    /// due to age out and then re-checks. The wait is recomputed from the
    /// current head every iteration, so admissions made by other tasks while
    /// this one slept cost extra iterations rather than a wrong decision.
    /// This call never fails and never gives up.
    pub async fn acquire(&self) {
        loop {
            let wait = {
                let now = Instant::now();
                let mut window = self.window.lock();

                if window.is_ready(now) {
                    window.record(now);
                    trace!(
                        name = %self.name,
                        in_window = window.len(),
                        "Admitted"
                    );
                    return;
                }

                window.time_to_head_expiry(now)
            };

            match wait {
                Some(wait) if !wait.is_zero() => {
                    debug!(
                        name = %self.name,
                        wait_ms = wait.as_millis() as u64,
                        "Window full, waiting for oldest entry to age out"
                    );
                    tokio::time::sleep(wait).await;
                }
                // The head aged out (or another task flushed it) between the
                // check and here; yield once and re-check.
                _ => tokio::task::yield_now().await,
            }
        }
    }

    /// Run `work` under one admission slot.
    ///
    /// Waits for admission, runs the future, then yields once so tasks
    /// blocked on this throttler are scheduled promptly after the protected
    /// section. The slot is not released on exit; it ages out of the window
    /// once `period` has elapsed since admission.
    pub async fn throttled<F>(&self, work: F) -> F::Output
    where
        F: Future,
    {
        self.acquire().await;
        let output = work.await;
        tokio::task::yield_now().await;
        output
    }

    /// Current number of admissions in the window.
    pub fn current_count(&self) -> usize {
        let mut window = self.window.lock();
        window.flush(Instant::now());
        window.len()
    }

    /// Remaining capacity in the current window.
    pub fn remaining(&self) -> u32 {
        let mut window = self.window.lock();
        window.flush(Instant::now());
        window.remaining()
    }
}

impl std::fmt::Debug for Throttler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Throttler")
            .field("name", &self.name)
            .field("rate_limit", &self.rate_limit)
            .field("period", &self.period)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    const PERIOD: Duration = Duration::from_secs(1);

    #[test]
    fn test_invalid_configuration_rejected() {
        assert!(Throttler::new(0, PERIOD, "zero-rate").is_err());
        assert!(Throttler::new(5, Duration::ZERO, "zero-period").is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_probes_up_to_rate_limit_succeed() {
        let throttler = Throttler::new(5, PERIOD, "api").unwrap();

        for _ in 0..5 {
            assert!(throttler.try_acquire());
        }

        assert!(!throttler.try_acquire());
        assert_eq!(throttler.current_count(), 5);
        assert_eq!(throttler.remaining(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_spaced_probes_always_succeed() {
        let throttler = Throttler::new(1, PERIOD, "api").unwrap();

        for _ in 0..4 {
            assert!(throttler.try_acquire());
            tokio::time::advance(PERIOD + Duration::from_millis(1)).await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_refused_probe_succeeds_after_period() {
        let throttler = Throttler::new(2, PERIOD, "api").unwrap();

        assert!(throttler.try_acquire());
        assert!(throttler.try_acquire());
        assert!(!throttler.try_acquire());

        tokio::time::advance(PERIOD).await;
        assert!(throttler.try_acquire());
    }

    #[tokio::test(start_paused = true)]
    async fn test_acquire_waits_for_window() {
        let throttler = Throttler::new(1, PERIOD, "api").unwrap();

        let start = Instant::now();
        throttler.acquire().await;
        throttler.acquire().await;

        // The second acquire had to wait out the full period.
        assert!(Instant::now() - start >= PERIOD);
    }

    #[tokio::test(start_paused = true)]
    async fn test_throttled_runs_work_after_admission() {
        let throttler = Throttler::new(1, PERIOD, "api").unwrap();

        let result = throttler.throttled(async { 41 + 1 }).await;
        assert_eq!(result, 42);
        assert_eq!(throttler.current_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_racing_tasks_never_exceed_rate_limit() {
        const RATE_LIMIT: u32 = 3;
        const TASKS: usize = 10;

        let throttler = Arc::new(Throttler::new(RATE_LIMIT, PERIOD, "api").unwrap());

        let handles: Vec<_> = (0..TASKS)
            .map(|_| {
                let throttler = Arc::clone(&throttler);
                tokio::spawn(async move {
                    throttler.acquire().await;
                    Instant::now()
                })
            })
            .collect();

        let mut admissions = Vec::with_capacity(TASKS);
        for handle in handles {
            admissions.push(handle.await.unwrap());
        }
        admissions.sort();

        // No RATE_LIMIT + 1 admissions may fall within one period of each
        // other: entry i and entry i + RATE_LIMIT must be at least a full
        // period apart.
        for pair in admissions.windows(RATE_LIMIT as usize + 1) {
            assert!(pair[RATE_LIMIT as usize] - pair[0] >= PERIOD);
        }
    }
}
