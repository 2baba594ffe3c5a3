//! Configuration for throttlers and throttler pools.
//!
//! These structs carry serde derives so callers can embed them in their own
//! configuration files; the crate itself never reads files or environment
//! variables.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{Result, ThrottleError};

/// Configuration for a single [`Throttler`](crate::Throttler).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThrottleConfig {
    /// Maximum admissions within any trailing window of `period`
    pub rate_limit: u32,

    /// Window length
    #[serde(default = "default_period")]
    pub period: Duration,
}

impl ThrottleConfig {
    /// Create a configuration with the default one-second period.
    pub fn new(rate_limit: u32) -> Self {
        Self {
            rate_limit,
            period: default_period(),
        }
    }

    /// Check that the configuration describes a usable throttler.
    ///
    /// A zero rate limit or zero period would turn the blocking acquire
    /// path into an unbounded busy loop, so both are rejected up front.
    pub fn validate(&self) -> Result<()> {
        if self.rate_limit == 0 {
            return Err(ThrottleError::InvalidConfiguration(
                "rate_limit must be positive".to_string(),
            ));
        }
        if self.period.is_zero() {
            return Err(ThrottleError::InvalidConfiguration(
                "period must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration for a [`ThrottlerPool`](crate::ThrottlerPool).
///
/// All pool members share `rate_limit` and `period`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Maximum admissions per member within any trailing window of `period`
    pub rate_limit: u32,

    /// Window length
    #[serde(default = "default_period")]
    pub period: Duration,

    /// Backoff applied after a full scan of the pool finds no capacity
    #[serde(default = "default_retry_interval")]
    pub retry_interval: Duration,
}

impl PoolConfig {
    /// Create a configuration with the default period and retry interval.
    pub fn new(rate_limit: u32) -> Self {
        Self {
            rate_limit,
            period: default_period(),
            retry_interval: default_retry_interval(),
        }
    }

    /// Check that the configuration describes a usable pool.
    pub fn validate(&self) -> Result<()> {
        ThrottleConfig {
            rate_limit: self.rate_limit,
            period: self.period,
        }
        .validate()
    }
}

fn default_period() -> Duration {
    Duration::from_secs(1)
}

fn default_retry_interval() -> Duration {
    Duration::from_millis(10)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_throttle_config_defaults() {
        let config = ThrottleConfig::new(10);
        assert_eq!(config.rate_limit, 10);
        assert_eq!(config.period, Duration::from_secs(1));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_rate_limit_rejected() {
        let config = ThrottleConfig::new(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_period_rejected() {
        let config = ThrottleConfig {
            rate_limit: 10,
            period: Duration::ZERO,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_pool_config_defaults() {
        let config = PoolConfig::new(5);
        assert_eq!(config.period, Duration::from_secs(1));
        assert_eq!(config.retry_interval, Duration::from_millis(10));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: ThrottleConfig = serde_json::from_str(r#"{"rate_limit": 3}"#).unwrap();
        assert_eq!(config.rate_limit, 3);
        assert_eq!(config.period, Duration::from_secs(1));
    }
}
