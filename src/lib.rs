//! # respool
//!
//! Bounded, thread-safe resource pool for expensive-to-create resources
//! such as database connections.
//!
//! ## Features
//!
//! - Admission control capping how many resources may be open at once
//! - Bounded reserve of idle resources for instant reuse
//! - Validation of reused resources before they are handed out
//! - Blocking acquisition with a wall-clock timeout, sync or async
//! - Automatic return of resources via RAII (Drop trait)
//! - Graceful shutdown that drains and closes everything idle
//! - Fire-and-forget metrics observer and Prometheus-format export
//!
//! The pool never looks inside a resource: opening, validating, and closing
//! are opaque callbacks supplied by the caller.
//!
//! ## Quick Start
//!
//! ```rust
//! use respool::{PoolConfig, ResourcePool};
//!
//! fn open_channel() -> Result<Vec<u8>, respool::BoxError> {
//!     Ok(Vec::with_capacity(512))
//! }
//!
//! let pool = ResourcePool::new(
//!     PoolConfig::new().with_max_open(4).with_max_reserve(2),
//!     open_channel,
//!     |_buffer| {},
//!     |_buffer| Ok(()),
//! );
//!
//! {
//!     let buffer = pool.get().unwrap();
//!     assert!(buffer.capacity() >= 512);
//!     // returned to the reserve when `buffer` goes out of scope
//! }
//!
//! assert_eq!(pool.stats().available_now, 1);
//! pool.close();
//! ```

mod admission;
mod config;
mod errors;
mod health;
mod metrics;
mod pool;
mod reserve;

pub use config::PoolConfig;
pub use errors::{BoxError, PoolError, PoolResult};
pub use health::HealthStatus;
#[cfg(feature = "metrics")]
pub use metrics::MetricsExporter;
pub use metrics::{PoolCounters, PoolMetrics, PoolStats};
pub use pool::{PooledResource, ResourcePool};
