mod common;

use bookrunner_common::error::{InteractionError, WorkflowError};
use bookrunner_common::protocol::ListedElement;
use bookrunner_common::selector::SelectorStrategy;
use bookrunner_common::request::BookingRequest;
use bookrunner_common::time::{MonthYear, TargetDate, TargetTime};
use bookrunner_engine::session::run_booking;
use bookrunner_engine::workflow::{
    WorkflowContext, calendar, checkout, class_lookup, login, selectors,
};
use common::{FakePage, fast_config};
use serde_json::json;

const PASSWORD_FIELD: &str = "input[type='password']";

fn css(selector: &str) -> SelectorStrategy {
    SelectorStrategy::Css(selector.to_string())
}

fn request(time: &str) -> BookingRequest {
    serde_json::from_value(json!({
        "email": "a@b.com",
        "password": "hunter2",
        "facilityName": "acme gym",
        "targetDate": "2025-11-20",
        "targetTime": time
    }))
    .unwrap()
}

#[tokio::test]
async fn permissive_page_books_successfully() {
    common::init_tracing();
    let mut page = FakePage::permissive();
    let config = fast_config();

    let resp = run_booking(&mut page, &request("8:00 am"), &config).await;

    assert!(resp.ok, "unexpected failure: {:?}", resp.error);
    assert!(resp.steps.len() >= 8);
    assert!(resp.steps.iter().all(|s| s.error.is_none()));
    assert_eq!(resp.message.as_deref(), Some("Booking confirmed (success)"));
    assert_eq!(page.navigations, vec![config.site.login_url.clone()]);
    assert_eq!(page.typed, "acme gyma@b.com");
    assert_eq!(page.close_calls, 1);
    assert!(resp.screenshots.is_empty());
}

#[tokio::test]
async fn debug_mode_collects_named_screenshots() {
    let mut page = FakePage::permissive();
    let mut req = request("8:00 am");
    req.debug = true;

    let resp = run_booking(&mut page, &req, &fast_config()).await;

    assert!(resp.ok);
    let names: Vec<&str> = resp.screenshots.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["login-page", "signed-in", "date-selected", "booked"]
    );
    assert_eq!(resp.screenshots[0].data, "iVBORw==");
}

#[tokio::test]
async fn missing_class_fails_and_names_requested_time() {
    let mut page = FakePage::permissive();
    page.events = vec!["9:00am Yoga".to_string()];

    let resp = run_booking(&mut page, &request("8:00 am"), &fast_config()).await;

    assert!(!resp.ok);
    let error = resp.error.unwrap();
    assert!(error.contains("8:00 am"), "{error}");
    assert!(error.contains("9:00am"));
    let last = resp.steps.last().unwrap();
    assert_eq!(last.label, "find class");
    assert!(last.error.is_some());
    assert_eq!(page.close_calls, 1);
}

#[tokio::test]
async fn invalid_request_never_launches() {
    let mut page = FakePage::permissive();

    let resp = run_booking(&mut page, &request("25:00"), &fast_config()).await;

    assert!(!resp.ok);
    assert!(resp.error.unwrap().starts_with("Invalid request"));
    assert!(!page.launched);
    assert_eq!(page.close_calls, 0);
}

#[tokio::test]
async fn soft_failure_after_charge_still_succeeds() {
    let mut page = FakePage::permissive();
    page.reveal_on_click = None;

    let resp = run_booking(&mut page, &request("8:00 am"), &fast_config()).await;

    assert!(resp.ok);
    assert_eq!(
        resp.message.as_deref(),
        Some("Charge submitted; no confirmation detected")
    );
    assert_eq!(page.clicked("charge"), 1);
}

#[tokio::test]
async fn selects_evening_class_by_exact_time() {
    let mut page = FakePage::permissive();
    let config = fast_config();
    let req = request("8:00 pm");
    let ctx = WorkflowContext::new(&config, &req);

    let class = class_lookup::find_class(
        &mut page,
        &ctx,
        TargetDate::parse("2025-11-20").unwrap(),
        TargetTime::parse("20:00").unwrap(),
    )
    .await
    .unwrap();

    assert_eq!(class.text, "8:00pm HIIT");
}

#[tokio::test]
async fn unmatched_time_reports_every_observed_time() {
    let mut page = FakePage::permissive();
    let config = fast_config();
    let req = request("9:00");
    let ctx = WorkflowContext::new(&config, &req);

    let err = class_lookup::find_class(
        &mut page,
        &ctx,
        TargetDate::parse("2025-11-20").unwrap(),
        TargetTime::parse("9:00").unwrap(),
    )
    .await
    .unwrap_err();

    match err {
        WorkflowError::NoMatchingClass { available, .. } => {
            assert_eq!(available, vec!["7:00am", "8:00am", "8:00pm"]);
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[tokio::test]
async fn date_picker_pages_forward_to_target_month() {
    let mut page = FakePage::permissive();
    page.month = MonthYear {
        year: 2025,
        month: 9,
    };
    let config = fast_config();
    let req = request("8:00 am");
    let ctx = WorkflowContext::new(&config, &req);

    calendar::select_date(&mut page, &ctx, TargetDate::parse("2025-11-20").unwrap())
        .await
        .unwrap();

    assert_eq!(page.clicked("th.next"), 2);
    assert_eq!(page.clicked("th.prev"), 0);
    assert_eq!(page.month, MonthYear { year: 2025, month: 11 });
    assert!(page.clicks.last().unwrap().value().contains("='20'"));
}

#[tokio::test]
async fn date_picker_pages_backward_across_year() {
    let mut page = FakePage::permissive();
    page.month = MonthYear {
        year: 2026,
        month: 1,
    };
    let config = fast_config();
    let req = request("8:00 am");
    let ctx = WorkflowContext::new(&config, &req);

    calendar::select_date(&mut page, &ctx, TargetDate::parse("2025-11-20").unwrap())
        .await
        .unwrap();

    assert_eq!(page.clicked("th.prev"), 2);
    assert_eq!(page.clicked("th.next"), 0);
}

#[tokio::test]
async fn date_picker_gives_up_after_max_clicks() {
    let mut page = FakePage::permissive();
    page.month = MonthYear {
        year: 2025,
        month: 1,
    };
    page.month_moves = false;
    let config = fast_config();
    let req = request("8:00 am");
    let ctx = WorkflowContext::new(&config, &req);

    let err = calendar::select_date(&mut page, &ctx, TargetDate::parse("2025-11-20").unwrap())
        .await
        .unwrap_err();

    assert!(matches!(err, WorkflowError::DateNavigation { .. }));
    assert_eq!(page.clicked("th.next"), 12);
}

#[tokio::test]
async fn facility_without_suggestion_presses_enter() {
    let mut page = FakePage::permissive();
    page.suggestions = vec!["Other Gym".to_string()];
    let config = fast_config();
    let req = request("8:00 am");
    let ctx = WorkflowContext::new(&config, &req);

    login::select_facility(&mut page, &ctx).await.unwrap();

    assert_eq!(page.typed, "acme gym");
    assert_eq!(page.keys, vec!["Enter"]);
}

#[tokio::test]
async fn facility_search_falls_back_to_first_visible_input() {
    let mut page = FakePage::permissive();
    for strategy in selectors::facility_search().strategies() {
        page.elements.insert(strategy.clone(), false);
    }
    let config = fast_config();
    let req = request("8:00 am");
    let ctx = WorkflowContext::new(&config, &req);

    login::select_facility(&mut page, &ctx).await.unwrap();

    assert!(page.lookups.contains(&css("[data-bookrunner-ref='m1']")));
    assert_eq!(page.typed, "acme gym");
    assert_eq!(page.clicked("ref='l0'"), 1);
    assert!(page.keys.is_empty());
}

#[tokio::test]
async fn filled_password_field_is_not_a_second_prompt() {
    let mut page = FakePage::permissive();
    page.visible_targets.insert(css(PASSWORD_FIELD));
    let config = fast_config();
    let req = request("8:00 am");
    let ctx = WorkflowContext::new(&config, &req);

    login::sign_in(&mut page, &ctx).await.unwrap();

    assert_eq!(page.clicked("button[type='submit']"), 1);
    assert_eq!(page.values.get(PASSWORD_FIELD).map(String::as_str), Some("hunter2"));
}

#[tokio::test]
async fn empty_second_password_prompt_is_answered_once() {
    let reprompt = "[data-bookrunner-ref='pw2']";
    let mut page = FakePage::permissive().show(css(reprompt));
    page.extra_inputs
        .push((PASSWORD_FIELD.to_string(), reprompt.to_string()));
    let config = fast_config();
    let req = request("8:00 am");
    let ctx = WorkflowContext::new(&config, &req);

    login::sign_in(&mut page, &ctx).await.unwrap();

    assert_eq!(page.clicked("button[type='submit']"), 2);
    assert_eq!(page.values.get(reprompt).map(String::as_str), Some("hunter2"));
}

#[tokio::test]
async fn view_dropdown_opens_through_later_tier() {
    let mut page = FakePage::permissive().hide(css("#calendar-view-select"));
    page.hide_target(".dropdown-menu.show");
    page.show_on_click
        .push(("dropdown-toggle".to_string(), css(".dropdown-menu.show")));
    let config = fast_config();
    let req = request("8:00 am");
    let ctx = WorkflowContext::new(&config, &req);

    calendar::switch_to_daily_view(&mut page, &ctx).await.unwrap();

    assert_eq!(page.clicked("#calendar-view-select"), 0);
    assert_eq!(page.clicked("dropdown-toggle"), 1);
    assert_eq!(page.clicked(".fc-right"), 0);
    assert_eq!(page.clicked("[data-view='day']"), 1);
}

#[tokio::test]
async fn view_dropdown_that_never_opens_is_an_error() {
    let mut page = FakePage::permissive();
    page.hide_target(".dropdown-menu.show");
    let config = fast_config();
    let req = request("8:00 am");
    let ctx = WorkflowContext::new(&config, &req);

    let err = calendar::switch_to_daily_view(&mut page, &ctx)
        .await
        .unwrap_err();

    match err {
        WorkflowError::Interaction(InteractionError::AllStrategiesExhausted {
            action,
            attempted,
            last_error,
        }) => {
            assert_eq!(action, "open view dropdown");
            assert_eq!(attempted.len(), 6);
            assert_eq!(last_error.as_deref(), Some("dropdown did not open"));
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(page.clicked(".fc-right"), 1);
    assert_eq!(page.clicked("[data-view='day']"), 0);
}

#[tokio::test]
async fn stale_class_marker_is_found_again_by_time() {
    let stale = ".fc-event[data-bookrunner-ref='stale']";
    let mut page = FakePage::permissive().hide(css(stale));
    let config = fast_config();
    let req = request("8:00 am");
    let ctx = WorkflowContext::new(&config, &req);
    let class = ListedElement {
        selector: stale.to_string(),
        text: "8:00am Spin".to_string(),
    };

    class_lookup::open_class(&mut page, &ctx, &class, TargetTime::parse("8:00").unwrap())
        .await
        .unwrap();

    assert_eq!(page.clicked("ref='stale'"), 0);
    assert_eq!(page.clicked(".fc-event[data-bookrunner-ref='l1']"), 1);
    assert!(page.dispatched.is_empty());
}

#[tokio::test]
async fn unclickable_class_is_dispatched_in_page() {
    let mut page = FakePage::permissive();
    for i in 0..3 {
        page.elements
            .insert(css(&format!(".fc-event[data-bookrunner-ref='l{i}']")), false);
    }
    let config = fast_config();
    let req = request("8:00 am");
    let ctx = WorkflowContext::new(&config, &req);
    let time = TargetTime::parse("8:00").unwrap();

    let date = TargetDate::parse("2025-11-20").unwrap();

    let class = class_lookup::find_class(&mut page, &ctx, date, time)
        .await
        .unwrap();
    class_lookup::open_class(&mut page, &ctx, &class, time)
        .await
        .unwrap();

    assert_eq!(class.text, "8:00am Spin");
    assert_eq!(page.dispatched, vec![css(&class.selector)]);
}

#[tokio::test]
async fn visible_success_text_skips_charge() {
    let mut page = FakePage::permissive();
    page.page_text = "Your class is booked".to_string();

    let resp = run_booking(&mut page, &request("8:00 am"), &fast_config()).await;

    assert!(resp.ok);
    assert_eq!(resp.message.as_deref(), Some("Booking confirmed (booked)"));
    assert_eq!(page.clicked("charge"), 0);
}

#[tokio::test]
async fn unseen_modal_does_not_count_as_closed() {
    let mut page = FakePage::permissive();
    page.hide_target(".modal.show");

    let resp = run_booking(&mut page, &request("8:00 am"), &fast_config()).await;

    assert!(resp.ok);
    assert_eq!(resp.message.as_deref(), Some("Booking confirmed (success)"));
    assert_eq!(page.clicked("charge"), 1);
}

#[tokio::test]
async fn modal_seen_then_closed_completes_without_charge() {
    let mut page = FakePage::permissive();
    page.hide_target(".modal.show");
    page.visible_targets.insert(css("[role='dialog']"));
    let config = fast_config();
    let req = request("8:00 am");
    let ctx = WorkflowContext::new(&config, &req);

    let seen = checkout::confirm_with_credits(&mut page, &ctx).await.unwrap();
    assert!(seen);
    page.hide_target("[role='dialog']");

    let message = checkout::confirm_payment(&mut page, &ctx, seen).await.unwrap();

    assert_eq!(message, "Booking completed");
    assert_eq!(page.clicked("charge"), 0);
}
