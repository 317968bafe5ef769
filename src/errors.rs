//! Error types for the resource pool

use std::time::Duration;

use thiserror::Error;

/// Boxed error payload produced by the caller-supplied `open` and `test`
/// callbacks. The pool never inspects it; a failing callback collapses into
/// the matching transient condition below.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    #[error("resource creation failed")]
    CreationFailed,

    #[error("pool exhausted - every ticket is in use")]
    Exhausted,

    #[error("resource failed its validation test")]
    TestFailed,

    #[error("timed out after {0:?} waiting for a resource")]
    Timeout(Duration),

    #[error("pool is closed")]
    Closed,
}

impl PoolError {
    /// Conditions the acquisition loop retries internally instead of
    /// surfacing. Callers only ever see these indirectly, as a
    /// [`Timeout`](PoolError::Timeout) once the wait budget runs out.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            PoolError::CreationFailed | PoolError::Exhausted | PoolError::TestFailed
        )
    }
}

pub type PoolResult<T> = Result<T, PoolError>;
