//! Round-robin pool of identically configured throttlers.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, trace};

use super::throttler::Throttler;
use crate::config::PoolConfig;
use crate::error::Result;

/// A fixed pool of throttlers sharing one rate configuration.
///
/// Useful for spreading work across several homogeneous rate-limited
/// resources (e.g. a set of API servers that each allow the same request
/// rate). Admission scans members in construction order and lands on the
/// first one with spare capacity; the member's name tells the caller which
/// resource to use.
///
/// Membership is fixed at construction.
pub struct ThrottlerPool {
    members: Vec<Throttler>,
    retry_interval: Duration,
}

impl ThrottlerPool {
    /// Create a pool with one member per name.
    ///
    /// All members share `rate_limit` and `period`. `retry_interval` is the
    /// backoff applied after a full scan of the pool finds no capacity.
    pub fn new<I, S>(
        rate_limit: u32,
        period: Duration,
        names: I,
        retry_interval: Duration,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_config(
            &PoolConfig {
                rate_limit,
                period,
                retry_interval,
            },
            names,
        )
    }

    /// Create a pool from a validated configuration.
    pub fn from_config<I, S>(config: &PoolConfig, names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        config.validate()?;
        let members = names
            .into_iter()
            .map(|name| Throttler::new(config.rate_limit, config.period, name))
            .collect::<Result<Vec<_>>>()?;

        debug!(
            members = members.len(),
            rate_limit = config.rate_limit,
            "Throttler pool created"
        );

        Ok(Self {
            members,
            retry_interval: config.retry_interval,
        })
    }

    /// Number of members in the pool.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the pool has no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Member names in scan order.
    pub fn member_names(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(Throttler::name)
    }

    /// Admit the caller onto whichever member has spare capacity, returning
    /// that member's name.
    ///
    /// Members are probed non-blockingly in construction order, wrapping
    /// from the last back to the first. After a full pass with no admission
    /// the scan backs off for `retry_interval` before trying again, so
    /// contended callers poll the pool at a bounded rate instead of spinning.
    /// An empty pool never admits anyone; the call blocks forever.
    pub async fn acquire(&self) -> &str {
        loop {
            for member in &self.members {
                if member.try_acquire() {
                    trace!(member = %member.name(), "Pool admission");
                    return member.name();
                }
            }

            trace!(
                retry_ms = self.retry_interval.as_millis() as u64,
                "No member has capacity, backing off"
            );
            tokio::time::sleep(self.retry_interval).await;
        }
    }

    /// Run `work` under one admission slot on some member.
    ///
    /// Waits for admission, hands the admitting member's name to `work`,
    /// runs the returned future, then yields once so other waiters are
    /// scheduled promptly. As with [`Throttler::throttled`], the slot ages
    /// out of the member's window rather than being released on exit.
    pub async fn throttled<F, Fut>(&self, work: F) -> Fut::Output
    where
        F: FnOnce(String) -> Fut,
        Fut: Future,
    {
        let name = self.acquire().await.to_owned();
        let output = work(name).await;
        tokio::task::yield_now().await;
        output
    }
}

impl std::fmt::Debug for ThrottlerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThrottlerPool")
            .field("members", &self.members.len())
            .field("retry_interval", &self.retry_interval)
            .finish()
    }
}
