//! Periodic dashboard refresh.
//!
//! [`RefreshScheduler`] runs a background task that performs a refresh cycle
//! (see [`run_cycle`](crate::cycle::run_cycle)) every period and delivers the
//! results through a channel. The first cycle starts immediately.
//!
//! At most one cycle is ever in flight. A tick that arrives while a cycle is
//! still running is dropped rather than queued, so a slow store never causes
//! a burst of back-to-back fetches or an older result landing after a newer
//! one.
//!
//! The scheduler supports graceful shutdown via [`RefreshScheduler::close`],
//! its cancellation token, or simply dropping it. Cancelling drops any
//! in-flight cycle and no update is delivered afterwards.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::task::{Context, Poll};
use std::time::Duration;

use futures::stream::Stream;
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use farmwatch_types::DeviceSnapshot;

use crate::cycle::{CycleOutput, run_cycle};
use crate::error::{Error, Result};
use crate::traits::TelemetrySource;

/// Default refresh period.
pub const DEFAULT_REFRESH_PERIOD: Duration = Duration::from_secs(60);

/// Options for the refresh scheduler.
///
/// ```
/// use std::time::Duration;
/// use farmwatch_core::SchedulerOptions;
///
/// let options = SchedulerOptions::builder()
///     .period(Duration::from_secs(30))
///     .buffer_size(4)
///     .build();
/// assert!(options.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct SchedulerOptions {
    /// Time between cycle starts.
    /// Default: 60 seconds.
    pub period: Duration,
    /// Buffer size for the update channel.
    /// Default: 8 updates.
    pub buffer_size: usize,
}

impl Default for SchedulerOptions {
    fn default() -> Self {
        Self {
            period: DEFAULT_REFRESH_PERIOD,
            buffer_size: 8,
        }
    }
}

impl SchedulerOptions {
    pub fn builder() -> SchedulerOptionsBuilder {
        SchedulerOptionsBuilder::default()
    }

    /// Options with a specific period and default buffering.
    pub fn with_period(period: Duration) -> Self {
        Self {
            period,
            ..Default::default()
        }
    }

    /// Validate the options.
    ///
    /// Both `period` and `buffer_size` must be non-zero.
    pub fn validate(&self) -> Result<()> {
        if self.period.is_zero() {
            return Err(Error::invalid_config("period must be > 0"));
        }
        if self.buffer_size == 0 {
            return Err(Error::invalid_config("buffer_size must be > 0"));
        }
        Ok(())
    }
}

/// Builder for [`SchedulerOptions`].
#[derive(Debug, Clone, Default)]
pub struct SchedulerOptionsBuilder {
    options: SchedulerOptions,
}

impl SchedulerOptionsBuilder {
    #[must_use]
    pub fn period(mut self, period: Duration) -> Self {
        self.options.period = period;
        self
    }

    #[must_use]
    pub fn buffer_size(mut self, size: usize) -> Self {
        self.options.buffer_size = size;
        self
    }

    #[must_use]
    pub fn build(self) -> SchedulerOptions {
        self.options
    }
}

/// Result of one refresh cycle, as delivered to the consumer.
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshUpdate {
    /// Fresh snapshots, ordered by device id. Replaces the previous view.
    Snapshots(Vec<DeviceSnapshot>),
    /// The cycle was abandoned; keep showing the previous view.
    Failed(String),
}

/// Whether a cycle is currently running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SchedulerState {
    Idle,
    Fetching,
}

/// Counters observed since the scheduler started.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SchedulerStats {
    pub cycles_completed: u64,
    pub cycles_failed: u64,
    /// Ticks that fired while a cycle was still running.
    pub ticks_dropped: u64,
    /// Reading records excluded by the reducer, summed over all cycles.
    pub readings_skipped: u64,
}

#[derive(Debug, Default)]
struct Shared {
    fetching: AtomicBool,
    cycles_completed: AtomicU64,
    cycles_failed: AtomicU64,
    ticks_dropped: AtomicU64,
    readings_skipped: AtomicU64,
}

impl Shared {
    fn stats(&self) -> SchedulerStats {
        SchedulerStats {
            cycles_completed: self.cycles_completed.load(Ordering::Relaxed),
            cycles_failed: self.cycles_failed.load(Ordering::Relaxed),
            ticks_dropped: self.ticks_dropped.load(Ordering::Relaxed),
            readings_skipped: self.readings_skipped.load(Ordering::Relaxed),
        }
    }

    fn record(&self, result: Result<CycleOutput>) -> RefreshUpdate {
        self.fetching.store(false, Ordering::SeqCst);
        match result {
            Ok(output) => {
                self.cycles_completed.fetch_add(1, Ordering::Relaxed);
                self.readings_skipped
                    .fetch_add(output.skipped as u64, Ordering::Relaxed);
                RefreshUpdate::Snapshots(output.snapshots)
            }
            Err(e) => {
                self.cycles_failed.fetch_add(1, Ordering::Relaxed);
                warn!("Refresh failed, keeping previous view: {}", e);
                RefreshUpdate::Failed(e.to_string())
            }
        }
    }
}

type CycleFuture = Pin<Box<dyn Future<Output = Result<CycleOutput>> + Send>>;

/// Await the in-flight cycle, or never resolve when there is none.
async fn in_flight_cycle(cycle: &mut Option<CycleFuture>) -> Result<CycleOutput> {
    match cycle {
        Some(fut) => fut.await,
        None => std::future::pending().await,
    }
}

/// Periodic refresher driving a [`TelemetrySource`].
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use farmwatch_core::{RefreshScheduler, RefreshUpdate, SchedulerOptions, StoreClient};
///
/// # async fn example() -> farmwatch_core::Result<()> {
/// let client = Arc::new(StoreClient::new("http://127.0.0.1:3000")?);
/// let mut scheduler = RefreshScheduler::new(client, SchedulerOptions::default())?;
///
/// while let Some(update) = scheduler.recv().await {
///     match update {
///         RefreshUpdate::Snapshots(devices) => println!("{} devices", devices.len()),
///         RefreshUpdate::Failed(reason) => eprintln!("refresh failed: {reason}"),
///     }
/// }
/// # Ok(())
/// # }
/// ```
pub struct RefreshScheduler {
    receiver: mpsc::Receiver<RefreshUpdate>,
    handle: tokio::task::JoinHandle<()>,
    cancel_token: CancellationToken,
    shared: Arc<Shared>,
}

impl RefreshScheduler {
    /// Start refreshing from `source`.
    ///
    /// Spawns the background task, so this must be called within a tokio
    /// runtime.
    pub fn new<S>(source: Arc<S>, options: SchedulerOptions) -> Result<Self>
    where
        S: TelemetrySource + ?Sized + 'static,
    {
        Self::with_cancellation(source, options, CancellationToken::new())
    }

    /// Start refreshing, stopping when `token` is cancelled.
    pub fn with_cancellation<S>(
        source: Arc<S>,
        options: SchedulerOptions,
        token: CancellationToken,
    ) -> Result<Self>
    where
        S: TelemetrySource + ?Sized + 'static,
    {
        options.validate()?;

        let (tx, rx) = mpsc::channel(options.buffer_size);
        let shared = Arc::new(Shared::default());
        let task_shared = Arc::clone(&shared);
        let task_token = token.clone();
        let period = options.period;

        let handle = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut cycle: Option<CycleFuture> = None;

            info!(period_secs = period.as_secs_f64(), "Refresh scheduler started");

            loop {
                tokio::select! {
                    biased;
                    _ = task_token.cancelled() => {
                        debug!("Scheduler cancelled, stopping");
                        break;
                    }
                    result = in_flight_cycle(&mut cycle), if cycle.is_some() => {
                        cycle = None;
                        let update = task_shared.record(result);
                        tokio::select! {
                            biased;
                            _ = task_token.cancelled() => break,
                            sent = tx.send(update) => {
                                if sent.is_err() {
                                    debug!("Update receiver dropped, stopping");
                                    break;
                                }
                            }
                        }
                    }
                    _ = ticker.tick() => {
                        if cycle.is_some() {
                            task_shared.ticks_dropped.fetch_add(1, Ordering::Relaxed);
                            debug!("Refresh still in flight, dropping tick");
                            continue;
                        }
                        task_shared.fetching.store(true, Ordering::SeqCst);
                        let source = Arc::clone(&source);
                        cycle = Some(Box::pin(async move { run_cycle(source.as_ref()).await }));
                    }
                }
            }

            // Release the in-flight cycle before the channel closes.
            drop(cycle);
            task_shared.fetching.store(false, Ordering::SeqCst);
        });

        Ok(Self {
            receiver: rx,
            handle,
            cancel_token: token,
            shared,
        })
    }

    /// Wait for the next update. Returns `None` once the scheduler stopped.
    ///
    /// After cancellation, updates still buffered in the channel are
    /// discarded rather than delivered.
    pub async fn recv(&mut self) -> Option<RefreshUpdate> {
        let update = tokio::select! {
            biased;
            _ = self.cancel_token.cancelled() => None,
            update = self.receiver.recv() => update,
        };
        if self.cancel_token.is_cancelled() {
            self.discard_buffered();
            return None;
        }
        update
    }

    fn discard_buffered(&mut self) {
        self.receiver.close();
        while self.receiver.try_recv().is_ok() {}
    }

    /// Stop the scheduler. Any in-flight cycle is dropped.
    pub fn close(self) {
        self.cancel_token.cancel();
    }

    /// A token that stops the scheduler when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    pub fn state(&self) -> SchedulerState {
        if self.shared.fetching.load(Ordering::SeqCst) {
            SchedulerState::Fetching
        } else {
            SchedulerState::Idle
        }
    }

    pub fn stats(&self) -> SchedulerStats {
        self.shared.stats()
    }

    /// Check if the background task is still running.
    pub fn is_active(&self) -> bool {
        !self.handle.is_finished()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel_token.is_cancelled()
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}

impl Stream for RefreshScheduler {
    type Item = RefreshUpdate;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.cancel_token.is_cancelled() {
            this.discard_buffered();
            return Poll::Ready(None);
        }
        this.receiver.poll_recv(cx)
    }
}
