mod common;

use bookrunner_common::error::ErrorKind;
use bookrunner_common::selector::{SelectorSet, SelectorStrategy};
use bookrunner_engine::action;
use bookrunner_engine::primitives::{InteractionOptions, click_element, dispatch_click, fill_input};
use bookrunner_engine::resolver::resolve;
use common::{FakePage, fast_config};
use std::time::Duration;

fn css(s: &str) -> SelectorStrategy {
    SelectorStrategy::Css(s.to_string())
}

fn options() -> InteractionOptions {
    InteractionOptions::from_config(&fast_config(), true)
}

#[tokio::test]
async fn resolves_through_third_strategy_in_declared_order() {
    let mut page = FakePage::default().show(css("#third"));
    let set = SelectorSet::css("#first").or_css("#second").or_css("#third");

    let el = resolve(&mut page, &set, Duration::from_millis(100), false)
        .await
        .unwrap();

    assert_eq!(el.strategy, css("#third"));
    assert_eq!(page.lookups, vec![css("#first"), css("#second"), css("#third")]);
}

#[tokio::test]
async fn first_visible_match_wins_without_trying_later_entries() {
    let mut page = FakePage::default().show(css("#a")).show(css("#b"));
    let set = SelectorSet::css("#a").or_css("#b");

    let el = resolve(&mut page, &set, Duration::from_millis(100), false)
        .await
        .unwrap();

    assert_eq!(el.strategy, css("#a"));
    assert_eq!(page.lookups.len(), 1);
}

#[tokio::test]
async fn hidden_elements_are_skipped() {
    let mut page = FakePage::default().hide(css("#hidden")).show(css("#shown"));
    let set = SelectorSet::css("#hidden").or_css("#shown");

    let el = resolve(&mut page, &set, Duration::from_millis(100), false)
        .await
        .unwrap();
    assert_eq!(el.strategy, css("#shown"));
}

#[tokio::test]
async fn text_strategy_resolves_through_page_marker() {
    let text = SelectorStrategy::TextContains("Book Customer".into());
    let mut page = FakePage::default();
    page.text_matches.insert(text.clone());
    let set = SelectorSet::css("#missing").or_text("Book Customer");

    let el = resolve(&mut page, &set, Duration::from_millis(100), false)
        .await
        .unwrap();

    assert_eq!(el.strategy, text);
    assert!(matches!(&el.page_target, SelectorStrategy::Css(s) if s.contains("data-bookrunner-ref")));
}

#[tokio::test]
async fn not_found_lists_every_attempt() {
    let mut page = FakePage::default();
    let set = SelectorSet::css("#a").or_aria("Book").or_text("Book now");

    let err = resolve(&mut page, &set, Duration::from_millis(100), false)
        .await
        .unwrap_err()
        .to_string();

    assert!(err.contains("css=#a"));
    assert!(err.contains("aria=Book"));
    assert!(err.contains("text=Book now"));
    assert!(err.contains("no in-page match"));
}

#[tokio::test]
async fn set_value_dispatches_one_input_and_one_change() {
    let mut page = FakePage::default().show(css("#email"));
    let set = SelectorSet::css("#email");

    let outcome = fill_input(&mut page, &set, "email", "a@b.com", &options())
        .await
        .unwrap();

    assert!(outcome.succeeded);
    assert_eq!(page.values.get("#email").map(String::as_str), Some("a@b.com"));
    let count = |name: &str| page.value_events.iter().filter(|e| *e == name).count();
    assert_eq!(count("input"), 1);
    assert_eq!(count("change"), 1);
    assert_eq!(page.value_events, vec!["input", "change", "focus", "blur"]);
}

#[tokio::test]
async fn click_falls_back_to_in_page_dispatch() {
    let mut page = FakePage::default().show(css("#covered"));
    page.fail_native_click = true;
    let set = SelectorSet::css("#covered");

    let el = resolve(&mut page, &set, Duration::from_millis(100), false)
        .await
        .unwrap();
    let outcome = action::click(&mut page, &el).await;

    assert!(outcome.succeeded);
    assert_eq!(page.dispatched, vec![css("#covered")]);
}

#[tokio::test]
async fn click_element_reports_exhaustion() {
    let mut page = FakePage::default();
    let set = SelectorSet::css("button.charge").or_text("Charge");

    let err = click_element(&mut page, &set, &options())
        .await
        .unwrap_err()
        .to_string();

    assert!(err.starts_with("click failed for every strategy [css=button.charge, text=Charge]"));
}

#[tokio::test]
async fn dispatch_click_uses_first_strategy_that_lands() {
    let mut page = FakePage::default().show(css(".btn-credits"));
    let set = SelectorSet::xpath("//button[@id='credits']")
        .or_aria("Pay with credits")
        .or_css(".btn-credits");

    let outcome = dispatch_click(&mut page, &set, &options()).await.unwrap();

    assert_eq!(outcome.strategy_used, Some(css(".btn-credits")));
    assert_eq!(page.dispatched, vec![css(".btn-credits")]);
}

#[tokio::test]
async fn value_mismatch_is_reported() {
    let mut page = FakePage::default().show(css("#phone"));
    page.mask_values = true;
    let set = SelectorSet::css("#phone");
    let el = resolve(&mut page, &set, Duration::from_millis(100), false)
        .await
        .unwrap();

    let outcome = action::set_value(&mut page, &el, "555-0100").await;
    assert!(!outcome.succeeded);
    assert_eq!(outcome.error, Some(ErrorKind::ValueMismatch));
}
