//! Health snapshots derived from pool occupancy

use crate::metrics::PoolStats;

/// Health status of a resource pool
///
/// # Examples
///
/// ```
/// use respool::{PoolConfig, ResourcePool};
///
/// let pool = ResourcePool::new(
///     PoolConfig::default(),
///     || Ok(42u32),
///     |_v| {},
///     |_v| Ok(()),
/// );
///
/// let health = pool.health_status();
/// assert!(health.is_healthy());
/// ```
#[derive(Debug, Clone)]
pub struct HealthStatus {
    /// Whether the pool is healthy
    pub is_healthy: bool,

    /// Checked-out share of capacity (0.0 to 1.0)
    pub utilization: f64,

    /// Idle resources ready for reuse
    pub available_now: usize,

    /// Resources checked out by callers
    pub in_use: usize,

    /// Maximum simultaneous open resources
    pub cap: usize,

    /// Warning messages
    pub warnings: Vec<String>,
}

impl HealthStatus {
    /// Derive a health snapshot from a stats snapshot.
    pub fn from_stats(stats: &PoolStats) -> Self {
        let utilization = stats.utilization();

        let mut warnings = Vec::new();
        let mut is_healthy = true;

        if utilization > 0.9 {
            warnings.push(format!("high utilization: {:.1}%", utilization * 100.0));
            is_healthy = false;
        }

        if stats.resources_open > 0 && stats.available_now == 0 {
            warnings.push("no idle resources in reserve".to_string());
        }

        Self {
            is_healthy,
            utilization,
            available_now: stats.available_now,
            in_use: stats.in_use,
            cap: stats.cap,
            warnings,
        }
    }

    /// Check if the pool is healthy
    pub fn is_healthy(&self) -> bool {
        self.is_healthy
    }
}
