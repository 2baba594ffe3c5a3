//! Sliding-window admission log.

use std::collections::VecDeque;
use std::time::Duration;
use tokio::time::Instant;

/// A time-bounded log of admission timestamps for one resource.
///
/// The log is kept oldest-first and is only ever appended at the tail
/// (admission) and drained from the head (expiry), so it stays sorted by
/// construction. Capacity decisions compare the live entry count against
/// `rate_limit` after stale entries have been flushed.
///
/// An entry expires once its age reaches `period`; expiry is the only way
/// an admission is ever given back.
#[derive(Debug)]
pub(crate) struct SlidingWindow {
    rate_limit: u32,
    period: Duration,
    log: VecDeque<Instant>,
}

impl SlidingWindow {
    pub(crate) fn new(rate_limit: u32, period: Duration) -> Self {
        Self {
            rate_limit,
            period,
            log: VecDeque::new(),
        }
    }

    /// Drop entries whose age has reached `period` from the head of the log.
    ///
    /// Idempotent for a fixed `now`. Cost is proportional to the number of
    /// entries that went stale since the last flush.
    pub(crate) fn flush(&mut self, now: Instant) {
        while let Some(&head) = self.log.front() {
            if now.duration_since(head) >= self.period {
                self.log.pop_front();
            } else {
                break;
            }
        }
    }

    /// Whether one more admission fits in the current window.
    pub(crate) fn is_ready(&mut self, now: Instant) -> bool {
        self.flush(now);
        (self.log.len() as u32) < self.rate_limit
    }

    /// Record one admission at `now`.
    ///
    /// Callers must have observed `is_ready` under the same lock; `now` must
    /// not precede the current tail.
    pub(crate) fn record(&mut self, now: Instant) {
        self.log.push_back(now);
    }

    /// Time until the oldest entry ages out, or `None` on an empty log.
    pub(crate) fn time_to_head_expiry(&self, now: Instant) -> Option<Duration> {
        self.log
            .front()
            .map(|&head| self.period.saturating_sub(now.duration_since(head)))
    }

    pub(crate) fn len(&self) -> usize {
        self.log.len()
    }

    pub(crate) fn remaining(&self) -> u32 {
        self.rate_limit.saturating_sub(self.log.len() as u32)
    }
}
