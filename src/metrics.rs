//! Pool statistics, metrics observers, and exposition-format export

#[cfg(feature = "metrics")]
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Point-in-time snapshot of pool occupancy.
///
/// The underlying counters are read independently, so the fields may be
/// mutually inconsistent under concurrent load. Good enough for
/// observability, not for correctness decisions.
///
/// # Examples
///
/// ```
/// use respool::{PoolConfig, ResourcePool};
///
/// let pool = ResourcePool::new(
///     PoolConfig::default(),
///     || Ok(String::from("conn")),
///     |_conn| {},
///     |_conn| Ok(()),
/// );
///
/// let handle = pool.get().unwrap();
/// let stats = pool.stats();
/// assert_eq!(stats.resources_open, 1);
/// assert_eq!(stats.in_use, 1);
/// drop(handle);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "metrics", derive(serde::Serialize))]
pub struct PoolStats {
    /// Idle resources ready for immediate reuse
    pub available_now: usize,

    /// Resources currently open, idle and checked out combined
    pub resources_open: usize,

    /// Maximum simultaneous open resources
    pub cap: usize,

    /// Resources currently checked out by callers
    pub in_use: usize,
}

impl PoolStats {
    /// Checked-out share of capacity, 0.0 to 1.0.
    pub fn utilization(&self) -> f64 {
        if self.cap == 0 {
            0.0
        } else {
            self.in_use as f64 / self.cap as f64
        }
    }
}

/// Observer for pool activity, supplied at construction.
///
/// Reports arrive fire-and-forget from detached reporter threads, one per
/// successful acquisition. Implementations must tolerate concurrent
/// invocation and should not block for long.
pub trait PoolMetrics: Send + Sync {
    /// One successful acquisition waited this long.
    fn report_wait(&self, waited: Duration);

    /// Occupancy snapshot taken just after an acquisition.
    fn report_resources(&self, stats: PoolStats);
}

/// Lifetime totals since the pool was created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "metrics", derive(serde::Serialize))]
pub struct PoolCounters {
    /// Resources created via the open callback
    pub opened: usize,

    /// Acquisitions served from the idle reserve
    pub reused: usize,

    /// Reused resources rejected by the test callback
    pub test_failures: usize,

    /// Acquisitions that gave up after their wait budget
    pub timeouts: usize,
}

/// Internal atomic tracker behind [`PoolCounters`].
pub(crate) struct CounterTracker {
    pub(crate) opened: AtomicUsize,
    pub(crate) reused: AtomicUsize,
    pub(crate) test_failures: AtomicUsize,
    pub(crate) timeouts: AtomicUsize,
}

impl CounterTracker {
    pub(crate) fn new() -> Self {
        Self {
            opened: AtomicUsize::new(0),
            reused: AtomicUsize::new(0),
            test_failures: AtomicUsize::new(0),
            timeouts: AtomicUsize::new(0),
        }
    }

    pub(crate) fn snapshot(&self) -> PoolCounters {
        PoolCounters {
            opened: self.opened.load(Ordering::Relaxed),
            reused: self.reused.load(Ordering::Relaxed),
            test_failures: self.test_failures.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
        }
    }
}

/// Metrics exporter for Prometheus exposition format
///
/// # Examples
///
/// ```
/// use respool::{MetricsExporter, PoolConfig, ResourcePool};
/// use std::collections::HashMap;
///
/// let pool = ResourcePool::new(
///     PoolConfig::default(),
///     || Ok(String::from("conn")),
///     |_conn| {},
///     |_conn| Ok(()),
/// );
/// let _handle = pool.get().unwrap();
///
/// let mut tags = HashMap::new();
/// tags.insert("service".to_string(), "api".to_string());
///
/// let output = MetricsExporter::export_prometheus(
///     &pool.stats(),
///     &pool.counters(),
///     "primary",
///     Some(&tags),
/// );
/// assert!(output.contains("respool_resources_open"));
/// assert!(output.contains("service=\"api\""));
/// ```
#[cfg(feature = "metrics")]
pub struct MetricsExporter;

#[cfg(feature = "metrics")]
impl MetricsExporter {
    /// Export a stats/counters pair in Prometheus exposition format
    pub fn export_prometheus(
        stats: &PoolStats,
        counters: &PoolCounters,
        pool_name: &str,
        tags: Option<&HashMap<String, String>>,
    ) -> String {
        let mut output = String::new();
        let labels = Self::format_labels(pool_name, tags);

        // Gauge metrics
        output.push_str("# HELP respool_resources_open Resources currently open\n");
        output.push_str("# TYPE respool_resources_open gauge\n");
        output.push_str(&format!(
            "respool_resources_open{{{}}} {}\n",
            labels, stats.resources_open
        ));

        output.push_str("# HELP respool_resources_available Idle resources ready for reuse\n");
        output.push_str("# TYPE respool_resources_available gauge\n");
        output.push_str(&format!(
            "respool_resources_available{{{}}} {}\n",
            labels, stats.available_now
        ));

        output.push_str("# HELP respool_resources_in_use Resources checked out by callers\n");
        output.push_str("# TYPE respool_resources_in_use gauge\n");
        output.push_str(&format!(
            "respool_resources_in_use{{{}}} {}\n",
            labels, stats.in_use
        ));

        output.push_str("# HELP respool_capacity Maximum simultaneous open resources\n");
        output.push_str("# TYPE respool_capacity gauge\n");
        output.push_str(&format!("respool_capacity{{{}}} {}\n", labels, stats.cap));

        output.push_str("# HELP respool_utilization Checked-out share of capacity\n");
        output.push_str("# TYPE respool_utilization gauge\n");
        output.push_str(&format!(
            "respool_utilization{{{}}} {:.2}\n",
            labels,
            stats.utilization()
        ));

        // Counter metrics
        output.push_str("# HELP respool_opened_total Resources created\n");
        output.push_str("# TYPE respool_opened_total counter\n");
        output.push_str(&format!(
            "respool_opened_total{{{}}} {}\n",
            labels, counters.opened
        ));

        output.push_str("# HELP respool_reused_total Acquisitions served from the reserve\n");
        output.push_str("# TYPE respool_reused_total counter\n");
        output.push_str(&format!(
            "respool_reused_total{{{}}} {}\n",
            labels, counters.reused
        ));

        output.push_str("# HELP respool_test_failures_total Reused resources failing validation\n");
        output.push_str("# TYPE respool_test_failures_total counter\n");
        output.push_str(&format!(
            "respool_test_failures_total{{{}}} {}\n",
            labels, counters.test_failures
        ));

        output.push_str("# HELP respool_timeouts_total Acquisitions that timed out\n");
        output.push_str("# TYPE respool_timeouts_total counter\n");
        output.push_str(&format!(
            "respool_timeouts_total{{{}}} {}\n",
            labels, counters.timeouts
        ));

        output
    }

    fn format_labels(pool_name: &str, tags: Option<&HashMap<String, String>>) -> String {
        let mut labels = vec![format!("pool=\"{}\"", pool_name)];

        if let Some(tags) = tags {
            for (key, value) in tags {
                labels.push(format!("{}=\"{}\"", key, value));
            }
        }

        labels.join(",")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utilization_is_in_use_over_cap() {
        let stats = PoolStats {
            available_now: 1,
            resources_open: 3,
            cap: 4,
            in_use: 2,
        };
        assert!((stats.utilization() - 0.5).abs() < f64::EPSILON);

        let empty = PoolStats {
            available_now: 0,
            resources_open: 0,
            cap: 0,
            in_use: 0,
        };
        assert_eq!(empty.utilization(), 0.0);
    }

    #[cfg(feature = "metrics")]
    #[test]
    fn exposition_format_carries_all_series() {
        let stats = PoolStats {
            available_now: 1,
            resources_open: 2,
            cap: 4,
            in_use: 1,
        };
        let counters = PoolCounters {
            opened: 2,
            reused: 5,
            test_failures: 1,
            timeouts: 0,
        };

        let output = MetricsExporter::export_prometheus(&stats, &counters, "primary", None);
        assert!(output.contains("respool_resources_open{pool=\"primary\"} 2"));
        assert!(output.contains("respool_resources_available{pool=\"primary\"} 1"));
        assert!(output.contains("respool_capacity{pool=\"primary\"} 4"));
        assert!(output.contains("respool_reused_total{pool=\"primary\"} 5"));
        assert!(output.contains("respool_timeouts_total{pool=\"primary\"} 0"));
    }
}
