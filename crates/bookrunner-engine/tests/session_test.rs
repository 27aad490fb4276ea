mod common;

use bookrunner_common::request::BookingRequest;
use bookrunner_engine::runner::{BookingJob, JobStatus};
use bookrunner_engine::session::{BrowserSession, run_booking};
use common::{FakePage, fast_config};
use std::time::Duration;

fn request() -> BookingRequest {
    BookingRequest {
        email: "a@b.com".into(),
        password: "hunter2".into(),
        facility_name: "acme gym".into(),
        target_date: "2025-11-20".into(),
        target_time: "8:00 am".into(),
        debug: false,
    }
}

#[tokio::test]
async fn closing_twice_does_not_raise() {
    let mut page = FakePage::permissive();
    {
        let mut session = BrowserSession::open(&mut page).await.unwrap();
        session.close().await;
        session.close().await;
        assert!(!session.is_open());
    }
    assert_eq!(page.close_calls, 1);
}

#[tokio::test]
async fn close_errors_are_swallowed() {
    let mut page = FakePage::permissive();
    page.fail_close = true;

    let resp = run_booking(&mut page, &request(), &fast_config()).await;

    assert!(resp.ok);
    assert_eq!(page.close_calls, 1);
}

#[tokio::test]
async fn launch_failure_is_reported() {
    let mut page = FakePage::permissive();
    page.fail_launch = true;

    let resp = run_booking(&mut page, &request(), &fast_config()).await;

    assert!(!resp.ok);
    assert_eq!(
        resp.error.as_deref(),
        Some("Browser launch failed: chrome not found")
    );
    assert!(resp.steps.is_empty());
}

#[tokio::test(start_paused = true)]
async fn watchdog_reports_still_running_then_finishes() {
    let mut page = FakePage::permissive();
    page.navigate_delay = Duration::from_secs(30);

    let job = BookingJob::spawn(page, request(), fast_config());
    let job = match job.wait(Duration::from_secs(5)).await {
        JobStatus::StillRunning(job) => job,
        JobStatus::Finished(resp) => panic!("finished too early: {resp:?}"),
    };

    let resp = job.finish().await;
    assert!(resp.ok, "{:?}", resp.error);
}

#[tokio::test]
async fn fast_job_finishes_within_bound() {
    let job = BookingJob::spawn(FakePage::permissive(), request(), fast_config());
    match job.wait(Duration::from_secs(60)).await {
        JobStatus::Finished(resp) => assert!(resp.ok),
        JobStatus::StillRunning(_) => panic!("job should have finished"),
    }
}
