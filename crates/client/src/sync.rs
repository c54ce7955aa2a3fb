//! Polling synchronizer.
//!
//! A [`Synchronizer`] owns one background task that fetches a collection on
//! a fixed interval and publishes [`SyncState`] over a `watch` channel. The
//! published snapshot is only replaced when the fetched records differ from
//! the previous ones, so consumers can compare snapshots with
//! [`Arc::ptr_eq`] instead of walking them. Derived stats follow the same
//! rule and are recomputed only when the snapshot is replaced.
//!
//! Cycles never overlap: a tick that lands while a fetch is in flight is
//! skipped, and a refetch request made during a fetch runs right after it.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use mtxpanel_core::error::{user_message, Classify};
use mtxpanel_core::model::Record;
use mtxpanel_core::stats::TotalStats;
use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

pub const DEFAULT_POLLING_INTERVAL: Duration = Duration::from_millis(7000);

/// Shared, immutable view of one fetch result.
pub type Snapshot<T> = Arc<Vec<T>>;

pub type ComputeStats<T, S> = Arc<dyn Fn(&[T]) -> S + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchState {
    /// A cycle is in flight.
    Loading,
    /// The last cycle failed; holds the operator-facing message.
    Error(String),
    Ready,
}

#[derive(Debug)]
pub struct SyncState<T, S> {
    pub data: Snapshot<T>,
    pub stats: Arc<S>,
    pub status: FetchState,
}

impl<T, S> Clone for SyncState<T, S> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
            stats: Arc::clone(&self.stats),
            status: self.status.clone(),
        }
    }
}

impl<T, S> SyncState<T, S> {
    pub fn is_loading(&self) -> bool {
        self.status == FetchState::Loading
    }

    pub fn error(&self) -> Option<&str> {
        match &self.status {
            FetchState::Error(msg) => Some(msg),
            _ => None,
        }
    }
}

pub struct SyncOptions<T, S> {
    pub polling_interval: Duration,
    pub compute_stats: ComputeStats<T, S>,
}

impl<T, S> Clone for SyncOptions<T, S> {
    fn clone(&self) -> Self {
        Self {
            polling_interval: self.polling_interval,
            compute_stats: Arc::clone(&self.compute_stats),
        }
    }
}

impl<T: 'static> Default for SyncOptions<T, TotalStats> {
    fn default() -> Self {
        Self {
            polling_interval: DEFAULT_POLLING_INTERVAL,
            compute_stats: Arc::new(|items: &[T]| TotalStats::compute(items)),
        }
    }
}

impl<T, S> SyncOptions<T, S> {
    pub fn new(
        polling_interval: Duration,
        compute_stats: impl Fn(&[T]) -> S + Send + Sync + 'static,
    ) -> Self {
        Self {
            polling_interval,
            compute_stats: Arc::new(compute_stats),
        }
    }

    pub fn with_interval(mut self, polling_interval: Duration) -> Self {
        self.polling_interval = polling_interval;
        self
    }

    pub fn with_stats<S2>(
        self,
        compute_stats: impl Fn(&[T]) -> S2 + Send + Sync + 'static,
    ) -> SyncOptions<T, S2> {
        SyncOptions {
            polling_interval: self.polling_interval,
            compute_stats: Arc::new(compute_stats),
        }
    }
}

/// True when `next` must replace `prev`: lengths differ, or some position
/// holds a different record id or different content.
pub fn snapshot_changed<T: Record + PartialEq>(prev: &[T], next: &[T]) -> bool {
    prev.len() != next.len()
        || prev
            .iter()
            .zip(next)
            .any(|(a, b)| a.record_id() != b.record_id() || a != b)
}

/// Handle to a running poll loop. Dropping it detaches the loop.
pub struct Synchronizer<T, S> {
    state: watch::Receiver<SyncState<T, S>>,
    refetch: Arc<Notify>,
    stop: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl<T, S> Synchronizer<T, S>
where
    T: Record + PartialEq + Send + Sync + 'static,
    S: Send + Sync + 'static,
{
    /// Starts polling `base_url` with `fetch`. Must be called inside a tokio
    /// runtime. The first cycle runs immediately.
    pub fn spawn<F, Fut, E>(
        fetch: F,
        base_url: impl Into<String>,
        options: SyncOptions<T, S>,
    ) -> Self
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Vec<T>, E>> + Send + 'static,
        E: Classify + Send + 'static,
    {
        let data: Snapshot<T> = Arc::new(Vec::new());
        let stats = Arc::new((options.compute_stats)(&data));
        let (state_tx, state_rx) = watch::channel(SyncState {
            data,
            stats,
            status: FetchState::Loading,
        });
        let (stop_tx, stop_rx) = watch::channel(false);
        let refetch = Arc::new(Notify::new());

        let driver = Driver {
            fetch,
            base_url: base_url.into(),
            options,
            state: state_tx,
            stop: stop_rx,
            refetch: Arc::clone(&refetch),
        };
        let task = tokio::spawn(driver.run());

        Self {
            state: state_rx,
            refetch,
            stop: stop_tx,
            task: Some(task),
        }
    }
}

impl<T, S> Synchronizer<T, S> {
    pub fn current(&self) -> SyncState<T, S> {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SyncState<T, S>> {
        self.state.clone()
    }

    /// Requests an immediate cycle. Coalesces with one already pending.
    pub fn refetch(&self) {
        self.refetch.notify_one();
    }

    /// Stops the loop. A fetch already in flight is left to finish but its
    /// result is discarded.
    pub fn detach(&self) {
        self.stop.send_replace(true);
    }

    pub fn is_detached(&self) -> bool {
        *self.stop.borrow()
    }

    /// Detaches and waits for the background task to exit.
    pub async fn shutdown(mut self) {
        self.detach();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "synchronizer task ended abnormally");
            }
        }
    }
}

impl<T, S> Drop for Synchronizer<T, S> {
    fn drop(&mut self) {
        self.detach();
    }
}

struct Driver<F, T, S> {
    fetch: F,
    base_url: String,
    options: SyncOptions<T, S>,
    state: watch::Sender<SyncState<T, S>>,
    stop: watch::Receiver<bool>,
    refetch: Arc<Notify>,
}

impl<F, Fut, E, T, S> Driver<F, T, S>
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<Vec<T>, E>>,
    E: Classify,
    T: Record + PartialEq,
{
    async fn run(mut self) {
        // interval() panics on a zero period
        let period = self.options.polling_interval.max(Duration::from_millis(1));
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tracing::debug!(
            base_url = %self.base_url,
            interval_ms = period.as_millis() as u64,
            "synchronizer started"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = self.refetch.notified() => {}
                changed = self.stop.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
            if self.detached() {
                break;
            }
            if !self.cycle().await {
                break;
            }
        }

        tracing::debug!(base_url = %self.base_url, "synchronizer stopped");
    }

    fn detached(&self) -> bool {
        *self.stop.borrow() || self.stop.has_changed().is_err()
    }

    /// Runs one fetch and publishes its outcome. Returns false when the
    /// handle detached while the fetch was in flight.
    async fn cycle(&mut self) -> bool {
        self.state.send_modify(|s| s.status = FetchState::Loading);

        let result = (self.fetch)(self.base_url.clone()).await;
        if self.detached() {
            tracing::debug!(base_url = %self.base_url, "discarding result fetched after detach");
            return false;
        }

        match result {
            Ok(items) => {
                let compute = &self.options.compute_stats;
                let mut replaced = false;
                self.state.send_modify(|s| {
                    if snapshot_changed(&s.data, &items) {
                        let data = Arc::new(items);
                        s.stats = Arc::new(compute(&data));
                        s.data = data;
                        replaced = true;
                    }
                    s.status = FetchState::Ready;
                });
                tracing::debug!(base_url = %self.base_url, replaced, "poll cycle complete");
            }
            Err(e) => {
                let err = e.classify();
                tracing::warn!(
                    base_url = %self.base_url,
                    kind = ?err.kind,
                    status = ?err.status,
                    error = %err.message,
                    "poll cycle failed"
                );
                self.state
                    .send_modify(|s| s.status = FetchState::Error(user_message(&err)));
            }
        }
        true
    }
}
