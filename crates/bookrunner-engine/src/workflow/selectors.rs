//! Selector chains for the booking site. Earlier entries are the ones seen
//! most often; later ones cover older layouts.

use bookrunner_common::selector::{SelectorSet, SelectorStrategy};

pub fn facility_search() -> SelectorSet {
    SelectorSet::css("input[placeholder*='facility' i]")
        .or_css("input[placeholder*='studio' i]")
        .or_css("input[name='facility']")
        .or_aria("Search for your facility")
        .or_css("input[type='search']")
}

/// Autocomplete entries under the facility and customer search boxes.
pub const SUGGESTION_ITEMS: &str =
    "[role='option'], .autocomplete-suggestion, .typeahead li, ul.dropdown-menu li";

pub fn email_input() -> SelectorSet {
    SelectorSet::css("input[type='email']")
        .or_css("input[name='email']")
        .or_css("input#email")
        .or_aria("Email")
}

pub fn password_input() -> SelectorSet {
    SelectorSet::css("input[type='password']")
        .or_css("input[name='password']")
        .or_aria("Password")
}

pub fn submit_login() -> SelectorSet {
    SelectorSet::css("button[type='submit']")
        .or_css("input[type='submit']")
        .or_text("Log in")
        .or_text("Sign in")
}

/// Password fields checked for a second, still empty prompt after submit.
pub const PASSWORD_PROMPT: &str = "input[type='password']";

/// Ways to open the calendar view dropdown, one tier per entry, tried until
/// the dropdown is seen open.
pub fn view_dropdown_tiers() -> Vec<SelectorSet> {
    vec![
        SelectorSet::css("#calendar-view-select"),
        SelectorSet::text("Week").or_text("Month"),
        SelectorSet::css(".calendar-view .dropdown-toggle").or_css(".fc-toolbar .dropdown-toggle"),
        SelectorSet::css(".fc-toolbar .fc-right").at_offset(20.0, 15.0),
    ]
}

pub fn view_dropdown_open() -> Vec<SelectorStrategy> {
    vec![
        SelectorStrategy::Css(".dropdown-menu.show".to_string()),
        SelectorStrategy::Css(".dropdown.open .dropdown-menu".to_string()),
        SelectorStrategy::Css("[role='listbox']".to_string()),
    ]
}

pub fn daily_view_option() -> SelectorSet {
    SelectorSet::css("[data-view='day']")
        .or_css(".dropdown-menu.show [data-value='day']")
        .or_aria("Day")
        .or_text("Day")
}

pub fn date_picker_trigger() -> SelectorSet {
    SelectorSet::css("[data-toggle='daterangepicker']")
        .or_css(".date-range-picker input")
        .or_css("input[name='daterange']")
        .or_aria("Select date")
}

pub fn date_picker_open() -> Vec<SelectorStrategy> {
    vec![SelectorStrategy::Css(".daterangepicker".to_string())]
}

pub const DATE_PICKER_HEADER: &[&str] = &[
    ".daterangepicker .drp-calendar.left th.month",
    ".daterangepicker th.month",
];

pub fn next_month() -> SelectorSet {
    SelectorSet::css(".daterangepicker .drp-calendar.left th.next")
        .or_css(".daterangepicker th.next")
        .or_aria("Next month")
}

pub fn previous_month() -> SelectorSet {
    SelectorSet::css(".daterangepicker .drp-calendar.left th.prev")
        .or_css(".daterangepicker th.prev")
        .or_aria("Previous month")
}

/// Enabled day cell of the displayed month whose text is exactly `day`.
pub fn day_cell(day: u8) -> SelectorSet {
    SelectorSet::xpath(format!(
        "//div[contains(@class,'drp-calendar') and contains(@class,'left')]\
         //td[contains(@class,'available') and not(contains(@class,'off')) \
         and normalize-space(text())='{}']",
        day
    ))
    .or_xpath(format!(
        "//td[contains(@class,'available') and not(contains(@class,'off')) \
         and normalize-space(text())='{}']",
        day
    ))
}

pub fn apply_date() -> SelectorSet {
    SelectorSet::css(".daterangepicker .applyBtn").or_aria("Apply")
}

pub const CALENDAR_EVENTS: &str = ".fc-event";

pub fn book_customer() -> SelectorSet {
    SelectorSet::css("button.book-customer")
        .or_aria("Book Customer")
        .or_text("Book Customer")
}

pub fn customer_search() -> SelectorSet {
    SelectorSet::css(".modal.show input[placeholder*='search' i]")
        .or_css("input[name='customer']")
        .or_aria("Search customer")
}

pub fn booking_modal() -> Vec<SelectorStrategy> {
    vec![
        SelectorStrategy::Css(".modal.show".to_string()),
        SelectorStrategy::Css("[role='dialog']".to_string()),
    ]
}

pub fn pay_with_credits() -> SelectorSet {
    SelectorSet::xpath(
        "//button[contains(translate(normalize-space(.),'CREDIT','credit'),'credit')]",
    )
    .or_aria("Pay with credits")
    .or_css("button.btn-credits")
}

pub fn charge() -> SelectorSet {
    SelectorSet::css("button.charge")
        .or_aria("Charge")
        .or_text("Charge")
}
