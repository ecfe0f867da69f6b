//! Periodic refresh of the daily snapshot.
//!
//! A single background task ticks every `refresh_interval`. Manual refreshes
//! and date changes wake it early. A generation counter is bumped on every
//! date change; a response that comes back under an older generation is
//! dropped instead of overwriting the newer date's data, and the refresh
//! that dropped it goes again for the new date.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult};
use crate::models::productivity::DailyReportSnapshot;
use crate::services::api_client::ProductividadApi;
use crate::utils::time::format_date;

/// What observers see. Replaced wholesale on every change.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PollerState {
    pub date: Option<NaiveDate>,
    pub generation: u64,
    pub snapshot: Option<DailyReportSnapshot>,
    pub last_error: Option<String>,
    pub last_updated: Option<DateTime<Utc>>,
    pub refreshing: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Updated,
    /// Another refresh was already running; it refreshes again once done.
    Skipped,
    /// The date changed while the request was in flight and the follow-up
    /// could not start because another refresh took over.
    Discarded,
}

struct PollerInner {
    api: Arc<dyn ProductividadApi>,
    date: RwLock<Option<NaiveDate>>,
    generation: AtomicU64,
    in_flight: AtomicBool,
    /// Set when a refresh was asked for while another was running.
    pending: AtomicBool,
    wake: Notify,
    state: watch::Sender<PollerState>,
}

/// Clears the in-flight flag however the refresh ends.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl PollerInner {
    fn current_date(&self) -> Option<NaiveDate> {
        *self.date.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs attempts until one lands for the current date. A caller that
    /// finds a refresh in flight leaves a pending mark and returns
    /// `Skipped`; the running caller then goes again once it is done.
    async fn refresh(&self) -> AppResult<RefreshOutcome> {
        let mut previous = None;
        loop {
            if self
                .in_flight
                .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                .is_err()
            {
                if previous.is_none() {
                    debug!(target: "app::poller", "refresh already in flight, queued behind it");
                    self.pending.store(true, Ordering::Release);
                }
                return Ok(previous.unwrap_or(RefreshOutcome::Skipped));
            }
            self.pending.store(false, Ordering::Release);

            let outcome = {
                let _guard = InFlightGuard(&self.in_flight);
                self.attempt().await?
            };

            let queued = self.pending.swap(false, Ordering::AcqRel);
            if outcome == RefreshOutcome::Discarded || queued {
                previous = Some(outcome);
                continue;
            }
            return Ok(outcome);
        }
    }

    async fn attempt(&self) -> AppResult<RefreshOutcome> {
        let (generation, date) = {
            let state = self.state.borrow();
            (state.generation, state.date)
        };
        self.state.send_modify(|state| state.refreshing = true);

        match self.api.fetch_daily(date).await {
            Ok(snapshot) => {
                let date_label = snapshot.date.clone();
                let users = snapshot.users.len();
                let applied = self.apply_if_current(generation, |state| {
                    state.snapshot = Some(snapshot);
                    state.last_error = None;
                    state.last_updated = Some(Utc::now());
                });
                if !applied {
                    return Ok(self.discarded(generation));
                }
                debug!(target: "app::poller", date = %date_label, users, "snapshot refreshed");
                Ok(RefreshOutcome::Updated)
            }
            Err(err) => {
                let message = err.to_string();
                if !self.apply_if_current(generation, |state| state.last_error = Some(message)) {
                    return Ok(self.discarded(generation));
                }
                warn!(target: "app::poller", error = %err, "refresh failed");
                Err(err)
            }
        }
    }

    /// Applies `update` only while the state still belongs to `generation`.
    /// The check and the write happen under the same channel lock, so a
    /// concurrent `set_date` either lands first and wins or lands after and
    /// clears the result.
    fn apply_if_current(&self, generation: u64, update: impl FnOnce(&mut PollerState)) -> bool {
        let mut applied = false;
        self.state.send_modify(|state| {
            state.refreshing = false;
            if state.generation == generation {
                update(state);
                applied = true;
            }
        });
        applied
    }

    fn discarded(&self, generation: u64) -> RefreshOutcome {
        debug!(
            target: "app::poller",
            requested_generation = generation,
            "discarding response for superseded date"
        );
        RefreshOutcome::Discarded
    }
}

pub struct ReportPoller {
    inner: Arc<PollerInner>,
    interval: Duration,
    task: Mutex<Option<(JoinHandle<()>, watch::Sender<bool>)>>,
}

impl ReportPoller {
    pub fn new(
        api: Arc<dyn ProductividadApi>,
        interval: Duration,
        date: Option<NaiveDate>,
    ) -> AppResult<Self> {
        if interval.is_zero() {
            return Err(AppError::validation("el intervalo de refresco debe ser mayor que 0"));
        }
        let (state, _) = watch::channel(PollerState {
            date,
            ..PollerState::default()
        });
        Ok(Self {
            inner: Arc::new(PollerInner {
                api,
                date: RwLock::new(date),
                generation: AtomicU64::new(0),
                in_flight: AtomicBool::new(false),
                pending: AtomicBool::new(false),
                wake: Notify::new(),
                state,
            }),
            interval,
            task: Mutex::new(None),
        })
    }

    pub fn subscribe(&self) -> watch::Receiver<PollerState> {
        self.inner.state.subscribe()
    }

    pub fn state(&self) -> PollerState {
        self.inner.state.borrow().clone()
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.inner.current_date()
    }

    pub fn generation(&self) -> u64 {
        self.inner.generation.load(Ordering::Acquire)
    }

    pub fn is_running(&self) -> bool {
        self.task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|(handle, _)| !handle.is_finished())
    }

    /// Spawns the refresh loop. The first refresh runs immediately. Calling
    /// `start` on a running poller does nothing.
    pub fn start(&self) {
        let mut task = self.task.lock().unwrap_or_else(PoisonError::into_inner);
        if task.as_ref().is_some_and(|(handle, _)| !handle.is_finished()) {
            return;
        }

        let inner = Arc::clone(&self.inner);
        let period = self.interval;
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            info!(target: "app::poller", interval_secs = period.as_secs(), "poller started");

            loop {
                tokio::select! {
                    _ = shutdown_rx.changed() => break,
                    _ = ticker.tick() => {}
                    _ = inner.wake.notified() => {}
                }
                // Failures are already recorded in the state.
                let _ = inner.refresh().await;
            }

            info!(target: "app::poller", "poller stopped");
        });

        *task = Some((handle, shutdown_tx));
    }

    /// Stops the loop and waits for it to finish. A refresh in progress is
    /// cancelled.
    pub async fn stop(&self) {
        let running = self
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some((handle, shutdown)) = running {
            let _ = shutdown.send(true);
            handle.abort();
            let _ = handle.await;
            self.inner.state.send_modify(|state| state.refreshing = false);
        }
    }

    /// Refreshes right away on the caller's task. If the date changes while
    /// the request is in flight, the stale response is dropped and the new
    /// date is fetched before returning.
    pub async fn refresh_now(&self) -> AppResult<RefreshOutcome> {
        self.inner.refresh().await
    }

    /// Asks the background loop to refresh. When a refresh is already running,
    /// the request is folded into a follow-up run rather than dropped.
    pub fn request_refresh(&self) {
        self.inner.wake.notify_one();
    }

    /// Switches the observed date. Any response still in flight for the old
    /// date is discarded, and the current snapshot is cleared.
    pub fn set_date(&self, date: Option<NaiveDate>) {
        let inner = &self.inner;
        let changed = inner.state.send_if_modified(|state| {
            let mut current = inner.date.write().unwrap_or_else(PoisonError::into_inner);
            if *current == date {
                return false;
            }
            *current = date;
            state.date = date;
            state.generation = inner.generation.fetch_add(1, Ordering::AcqRel) + 1;
            state.snapshot = None;
            state.last_error = None;
            true
        });
        if !changed {
            return;
        }
        debug!(
            target: "app::poller",
            date = %date.map(format_date).unwrap_or_else(|| "hoy".to_string()),
            generation = self.generation(),
            "date changed"
        );
        inner.wake.notify_one();
    }
}

impl Drop for ReportPoller {
    fn drop(&mut self) {
        if let Some((handle, _)) = self
            .task
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            handle.abort();
        }
    }
}
