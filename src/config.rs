//! Pool configuration options

use std::time::Duration;

/// Configuration for pool capacity and acquisition behavior
///
/// # Examples
///
/// ```
/// use respool::PoolConfig;
/// use std::time::Duration;
///
/// let config = PoolConfig::new()
///     .with_max_open(32)
///     .with_max_reserve(8)
///     .with_acquire_timeout(Duration::from_secs(5));
///
/// assert_eq!(config.max_open, 32);
/// assert_eq!(config.max_reserve, 8);
/// ```
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Maximum number of resources that may be open simultaneously
    pub max_open: usize,

    /// Maximum number of idle resources cached for reuse. Must not exceed
    /// `max_open`; zero disables caching entirely.
    pub max_reserve: usize,

    /// Default wait budget for [`get`](crate::ResourcePool::get)
    pub acquire_timeout: Duration,

    /// Sleep between acquisition attempts while the pool is contended
    pub retry_backoff: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_open: 16,
            max_reserve: 8,
            acquire_timeout: Duration::from_secs(1),
            retry_backoff: Duration::from_micros(1),
        }
    }
}

impl PoolConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of simultaneously open resources
    pub fn with_max_open(mut self, count: usize) -> Self {
        self.max_open = count;
        self
    }

    /// Set the idle reserve size
    pub fn with_max_reserve(mut self, count: usize) -> Self {
        self.max_reserve = count;
        self
    }

    /// Set the default acquisition timeout
    pub fn with_acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    /// Set the backoff slept between contended acquisition attempts
    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }
}
