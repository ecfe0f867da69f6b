// Background refresh: stale responses, overlapping refreshes, lifecycle

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;

use productividad_app_lib::error::{ApiErrorCode, AppError, AppResult};
use productividad_app_lib::models::activity::ActivityRecord;
use productividad_app_lib::models::productivity::{DailyReportSnapshot, UserDailyRecord, UserDetail};
use productividad_app_lib::models::revisiones::RevisionesReport;
use productividad_app_lib::services::api_client::ProductividadApi;
use productividad_app_lib::services::poller::{RefreshOutcome, ReportPoller};
use tokio::sync::Notify;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

/// Answers `fetch_daily` with a one-user snapshot for the requested date.
/// The first request for `gated` blocks until `release` is notified.
struct FakeApi {
    gated: Option<NaiveDate>,
    gate_used: AtomicBool,
    failing: bool,
    release: Notify,
    calls: AtomicUsize,
}

impl FakeApi {
    fn new(gated: Option<NaiveDate>) -> Arc<Self> {
        Arc::new(Self {
            gated,
            gate_used: AtomicBool::new(false),
            failing: false,
            release: Notify::new(),
            calls: AtomicUsize::new(0),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            gated: None,
            gate_used: AtomicBool::new(false),
            failing: true,
            release: Notify::new(),
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn wait_for_calls(&self, expected: usize) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while self.calls() < expected {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("fetch was not issued in time");
    }
}

async fn wait_for_snapshot(poller: &ReportPoller, date: &str) {
    tokio::time::timeout(Duration::from_secs(5), async {
        let mut updates = poller.subscribe();
        loop {
            let current = updates.borrow_and_update().snapshot.clone();
            if current.is_some_and(|snapshot| snapshot.date == date) {
                break;
            }
            updates.changed().await.expect("sender alive");
        }
    })
    .await
    .expect("snapshot for the requested date");
}

#[async_trait]
impl ProductividadApi for FakeApi {
    async fn fetch_daily(&self, date: Option<NaiveDate>) -> AppResult<DailyReportSnapshot> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing {
            return Err(AppError::http_status(500, "caído", None));
        }
        if date.is_some() && date == self.gated && !self.gate_used.swap(true, Ordering::SeqCst) {
            self.release.notified().await;
        }
        let date = date.unwrap_or_else(|| day(2024, 1, 12));
        Ok(DailyReportSnapshot {
            date: date.format("%Y-%m-%d").to_string(),
            users: vec![UserDailyRecord {
                user_id: "1".to_string(),
                colaborador: "Ana".to_string(),
                tiempo_total: 60,
                ..UserDailyRecord::default()
            }],
        })
    }

    async fn fetch_user_detail(&self, _: &str, _: Option<NaiveDate>) -> AppResult<UserDetail> {
        Err(AppError::api(ApiErrorCode::InvalidRequest, "no usado"))
    }

    async fn fetch_revisiones_day(&self, _: NaiveDate) -> AppResult<RevisionesReport> {
        Ok(RevisionesReport::default())
    }

    async fn fetch_revisiones_range(&self, _: NaiveDate, _: NaiveDate) -> AppResult<RevisionesReport> {
        Ok(RevisionesReport::default())
    }

    async fn fetch_actividades(&self) -> AppResult<Vec<ActivityRecord>> {
        Ok(Vec::new())
    }
}

#[tokio::test]
async fn zero_interval_is_rejected() {
    let api = FakeApi::new(None);
    assert!(ReportPoller::new(api, Duration::ZERO, None).is_err());
}

#[tokio::test]
async fn response_for_previous_date_is_discarded_and_new_date_fetched() {
    let old_date = day(2024, 1, 11);
    let new_date = day(2024, 1, 12);
    let api = FakeApi::new(Some(old_date));
    let poller = Arc::new(
        ReportPoller::new(api.clone(), Duration::from_secs(3600), Some(old_date)).expect("poller"),
    );

    let pending = tokio::spawn({
        let poller = Arc::clone(&poller);
        async move { poller.refresh_now().await }
    });
    api.wait_for_calls(1).await;

    poller.set_date(Some(new_date));
    assert_eq!(poller.generation(), 1);
    api.release.notify_one();

    let outcome = pending.await.expect("join").expect("refresh");
    assert_eq!(outcome, RefreshOutcome::Updated);
    assert_eq!(api.calls(), 2);
    let state = poller.state();
    assert_eq!(state.date, Some(new_date));
    assert_eq!(state.snapshot.expect("snapshot").date, "2024-01-12");
    assert!(!state.refreshing);
}

#[tokio::test]
async fn date_change_while_loop_waits_on_manual_refresh_fetches_new_date() {
    let old_date = day(2024, 1, 11);
    let new_date = day(2024, 1, 12);
    let api = FakeApi::new(Some(old_date));
    let poller = Arc::new(
        ReportPoller::new(api.clone(), Duration::from_secs(3600), Some(old_date)).expect("poller"),
    );

    let manual = tokio::spawn({
        let poller = Arc::clone(&poller);
        async move { poller.refresh_now().await }
    });
    api.wait_for_calls(1).await;

    // The loop's first tick and the date-change wake both find the manual
    // refresh in flight.
    poller.start();
    poller.set_date(Some(new_date));
    api.release.notify_one();

    wait_for_snapshot(&poller, "2024-01-12").await;
    manual.await.expect("join").expect("manual refresh");
    assert_eq!(poller.state().date, Some(new_date));
    assert!(api.calls() >= 2);

    poller.stop().await;
}

#[tokio::test]
async fn overlapping_refresh_is_skipped() {
    let gated = day(2024, 1, 12);
    let api = FakeApi::new(Some(gated));
    let poller = Arc::new(
        ReportPoller::new(api.clone(), Duration::from_secs(3600), Some(gated)).expect("poller"),
    );

    let first = tokio::spawn({
        let poller = Arc::clone(&poller);
        async move { poller.refresh_now().await }
    });
    api.wait_for_calls(1).await;

    let second = poller.refresh_now().await.expect("second refresh");
    assert_eq!(second, RefreshOutcome::Skipped);
    assert_eq!(api.calls(), 1);

    api.release.notify_one();
    let first = first.await.expect("join").expect("first refresh");
    assert_eq!(first, RefreshOutcome::Updated);
    // The skipped request runs as a follow-up of the first one.
    assert_eq!(api.calls(), 2);
    assert!(poller.state().snapshot.is_some());
}

#[tokio::test]
async fn failures_are_recorded_in_state() {
    let poller = ReportPoller::new(FakeApi::failing(), Duration::from_secs(3600), None).expect("poller");

    let err = poller.refresh_now().await.expect_err("failing api");
    assert_eq!(err.http_status_code(), Some(500));

    let state = poller.state();
    assert_eq!(state.last_error.as_deref(), Some("caído"));
    assert!(state.snapshot.is_none());
    assert!(!state.refreshing);
}

#[tokio::test]
async fn background_loop_refreshes_on_start_and_on_request() {
    let api = FakeApi::new(None);
    let poller = ReportPoller::new(api.clone(), Duration::from_secs(3600), None).expect("poller");
    let mut updates = poller.subscribe();

    poller.start();
    assert!(poller.is_running());

    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            updates.changed().await.expect("sender alive");
            if updates.borrow_and_update().snapshot.is_some() {
                break;
            }
        }
    })
    .await
    .expect("first tick refreshes immediately");
    assert_eq!(api.calls(), 1);

    poller.request_refresh();
    api.wait_for_calls(2).await;

    poller.stop().await;
    assert!(!poller.is_running());
}
