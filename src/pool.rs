//! The resource pool: acquisition loop, handle lifecycle, and shutdown

use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::thread;
use std::time::{Duration, Instant};

use crate::admission::Tickets;
use crate::config::PoolConfig;
use crate::errors::{BoxError, PoolError, PoolResult};
use crate::health::HealthStatus;
use crate::metrics::{CounterTracker, PoolCounters, PoolMetrics, PoolStats};
use crate::reserve::{Parked, Reserve};

type OpenFn<T> = dyn Fn() -> Result<T, BoxError> + Send + Sync;
type CloseFn<T> = dyn Fn(T) + Send + Sync;
type TestFn<T> = dyn Fn(&T) -> Result<(), BoxError> + Send + Sync;

struct PoolInner<T: Send + 'static> {
    reserve: Reserve<T>,
    tickets: Tickets,
    open: Box<OpenFn<T>>,
    close: Box<CloseFn<T>>,
    test: Box<TestFn<T>>,
    config: PoolConfig,
    metrics: Option<Arc<dyn PoolMetrics>>,
    counters: CounterTracker,
}

impl<T: Send + 'static> PoolInner<T> {
    /// Single non-blocking attempt: idle reserve first, then a fresh open.
    /// All retry and backoff policy lives in the callers.
    fn try_acquire(&self) -> PoolResult<Parked<T>> {
        if let Some(parked) = self.reserve.try_take()? {
            if (self.test)(&parked.resource).is_err() {
                // The resource flunked validation: close it and return its
                // ticket so capacity is not lost, then let the caller retry.
                self.counters.test_failures.fetch_add(1, Ordering::Relaxed);
                let Parked { resource, ticket } = parked;
                (self.close)(resource);
                self.tickets.release(ticket);
                return Err(PoolError::TestFailed);
            }
            self.counters.reused.fetch_add(1, Ordering::Relaxed);
            return Ok(parked);
        }
        self.open_new()
    }

    fn open_new(&self) -> PoolResult<Parked<T>> {
        let ticket = self.tickets.try_acquire()?;
        match (self.open)() {
            Ok(resource) => {
                self.counters.opened.fetch_add(1, Ordering::Relaxed);
                Ok(Parked { resource, ticket })
            }
            Err(_cause) => {
                self.tickets.release(ticket);
                Err(PoolError::CreationFailed)
            }
        }
    }

    /// Return a resource to the reserve; on overflow close it and free the
    /// ticket instead.
    fn release(&self, parked: Parked<T>) {
        if let Err(parked) = self.reserve.try_put(parked) {
            let Parked { resource, ticket } = parked;
            (self.close)(resource);
            self.tickets.release(ticket);
        }
    }

    /// Close a resource unconditionally and give its ticket back.
    fn discard(&self, parked: Parked<T>) {
        let Parked { resource, ticket } = parked;
        (self.close)(resource);
        self.tickets.release(ticket);
    }

    fn stats(&self) -> PoolStats {
        let cap = self.tickets.capacity();
        let resources_open = cap.saturating_sub(self.tickets.free());
        let available_now = self.reserve.len();
        PoolStats {
            available_now,
            resources_open,
            cap,
            in_use: resources_open.saturating_sub(available_now),
        }
    }

    /// Fire-and-forget wait report; must never block the acquiring caller.
    fn report_wait(&self, waited: Duration) {
        if let Some(metrics) = &self.metrics {
            let metrics = Arc::clone(metrics);
            let stats = self.stats();
            thread::spawn(move || {
                metrics.report_wait(waited);
                metrics.report_resources(stats);
            });
        }
    }

    fn shut_down(&self) {
        for parked in self.reserve.close() {
            let Parked {
                resource,
                ticket: _,
            } = parked;
            (self.close)(resource);
        }
        self.tickets.close();
    }
}

impl<T: Send + 'static> Drop for PoolInner<T> {
    fn drop(&mut self) {
        // Once the pool and every handle are gone, close anything a racing
        // release managed to park after shutdown drained the reserve.
        for parked in self.reserve.close() {
            (self.close)(parked.resource);
        }
    }
}

/// Thread-safe bounded pool of caller-defined resources.
///
/// The pool never looks inside a resource: opening, validating, and closing
/// are callbacks supplied at construction. At most `max_open` resources
/// exist at any moment, up to `max_reserve` idle ones are cached for reuse,
/// and reused resources are validated before being handed out.
pub struct ResourcePool<T: Send + 'static> {
    inner: Arc<PoolInner<T>>,
}

impl<T: Send + 'static> ResourcePool<T> {
    /// Create a pool. All admission tickets are loaded up front; no
    /// resource is opened until first requested.
    ///
    /// # Panics
    ///
    /// Panics if `max_open` is zero or smaller than `max_reserve`.
    pub fn new<O, C, F>(config: PoolConfig, open: O, close: C, test: F) -> Self
    where
        O: Fn() -> Result<T, BoxError> + Send + Sync + 'static,
        C: Fn(T) + Send + Sync + 'static,
        F: Fn(&T) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        Self::build(config, Box::new(open), Box::new(close), Box::new(test), None)
    }

    /// Create a pool that reports acquisitions to a metrics observer.
    pub fn with_metrics<O, C, F>(
        config: PoolConfig,
        open: O,
        close: C,
        test: F,
        metrics: Arc<dyn PoolMetrics>,
    ) -> Self
    where
        O: Fn() -> Result<T, BoxError> + Send + Sync + 'static,
        C: Fn(T) + Send + Sync + 'static,
        F: Fn(&T) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        Self::build(
            config,
            Box::new(open),
            Box::new(close),
            Box::new(test),
            Some(metrics),
        )
    }

    fn build(
        config: PoolConfig,
        open: Box<OpenFn<T>>,
        close: Box<CloseFn<T>>,
        test: Box<TestFn<T>>,
        metrics: Option<Arc<dyn PoolMetrics>>,
    ) -> Self {
        assert!(config.max_open > 0, "max_open must be nonzero");
        assert!(
            config.max_open >= config.max_reserve,
            "max_open must be >= max_reserve"
        );

        Self {
            inner: Arc::new(PoolInner {
                reserve: Reserve::new(config.max_reserve),
                tickets: Tickets::new(config.max_open),
                open,
                close,
                test,
                metrics,
                counters: CounterTracker::new(),
                config,
            }),
        }
    }

    /// Acquire a resource, waiting up to the configured default timeout.
    pub fn get(&self) -> PoolResult<PooledResource<T>> {
        self.get_with_timeout(self.inner.config.acquire_timeout)
    }

    /// Acquire a resource or fail with [`PoolError::Timeout`] once the wait
    /// budget elapses.
    ///
    /// Transient conditions (exhaustion, creation failure, failed
    /// validation) are retried after a short backoff and never surface
    /// here; [`PoolError::Closed`] fails immediately.
    pub fn get_with_timeout(&self, timeout: Duration) -> PoolResult<PooledResource<T>> {
        let start = Instant::now();

        loop {
            if start.elapsed() > timeout {
                self.inner.counters.timeouts.fetch_add(1, Ordering::Relaxed);
                return Err(PoolError::Timeout(timeout));
            }

            match self.inner.try_acquire() {
                Ok(parked) => return Ok(self.checkout(parked, start.elapsed())),
                Err(PoolError::Closed) => return Err(PoolError::Closed),
                Err(_transient) => thread::sleep(self.inner.config.retry_backoff),
            }
        }
    }

    /// Async variant of [`get`](Self::get).
    pub async fn get_async(&self) -> PoolResult<PooledResource<T>> {
        self.get_with_timeout_async(self.inner.config.acquire_timeout)
            .await
    }

    /// Async variant of [`get_with_timeout`](Self::get_with_timeout); the
    /// backoff yields to the runtime instead of parking the thread.
    pub async fn get_with_timeout_async(
        &self,
        timeout: Duration,
    ) -> PoolResult<PooledResource<T>> {
        let start = Instant::now();

        let acquired = tokio::time::timeout(timeout, async {
            loop {
                match self.inner.try_acquire() {
                    Ok(parked) => return Ok(parked),
                    Err(PoolError::Closed) => return Err(PoolError::Closed),
                    Err(_transient) => {
                        tokio::time::sleep(self.inner.config.retry_backoff).await;
                    }
                }
            }
        })
        .await;

        match acquired {
            Ok(Ok(parked)) => Ok(self.checkout(parked, start.elapsed())),
            Ok(Err(err)) => Err(err),
            Err(_elapsed) => {
                self.inner.counters.timeouts.fetch_add(1, Ordering::Relaxed);
                Err(PoolError::Timeout(timeout))
            }
        }
    }

    fn checkout(&self, parked: Parked<T>, waited: Duration) -> PooledResource<T> {
        self.inner.report_wait(waited);
        PooledResource {
            parked: Some(parked),
            pool: Arc::clone(&self.inner),
        }
    }

    /// Shut the pool down: close every idle resource, discard all free
    /// tickets, and fail subsequent acquisitions with
    /// [`PoolError::Closed`].
    ///
    /// Resources checked out at this moment are untouched; returning or
    /// destroying them later still runs the close callback, and their
    /// tickets are silently dropped.
    pub fn close(&self) {
        self.inner.shut_down();
    }

    /// Racy point-in-time occupancy snapshot.
    ///
    /// After [`close`](Self::close) the drained ticket queue reads as fully
    /// consumed, so `resources_open` reports the cap; the pool is inert at
    /// that point and the numbers stop meaning anything.
    pub fn stats(&self) -> PoolStats {
        self.inner.stats()
    }

    /// Lifetime counters since construction.
    pub fn counters(&self) -> PoolCounters {
        self.inner.counters.snapshot()
    }

    /// Health snapshot derived from [`stats`](Self::stats).
    pub fn health_status(&self) -> HealthStatus {
        HealthStatus::from_stats(&self.stats())
    }
}

/// One checked-out resource.
///
/// Dropping the handle returns the resource to the idle reserve, or closes
/// it when the reserve is full. [`destroy`](Self::destroy) discards the
/// resource outright. Either way the admission ticket is returned exactly
/// once; a double release cannot be expressed.
pub struct PooledResource<T: Send + 'static> {
    parked: Option<Parked<T>>,
    pool: Arc<PoolInner<T>>,
}

impl<T: Send + 'static> PooledResource<T> {
    /// Close the underlying resource and free its ticket immediately,
    /// bypassing the reserve. For resources the caller no longer trusts.
    pub fn destroy(mut self) {
        if let Some(parked) = self.parked.take() {
            self.pool.discard(parked);
        }
    }
}

impl<T: Send + 'static> Deref for PooledResource<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self
            .parked
            .as_ref()
            .expect("resource already released")
            .resource
    }
}

impl<T: Send + 'static> DerefMut for PooledResource<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self
            .parked
            .as_mut()
            .expect("resource already released")
            .resource
    }
}

impl<T: Send + 'static> Drop for PooledResource<T> {
    fn drop(&mut self) {
        if let Some(parked) = self.parked.take() {
            self.pool.release(parked);
        }
    }
}
