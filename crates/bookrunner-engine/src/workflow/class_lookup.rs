//! Finding the class that starts at the requested time and opening it.

use super::WorkflowContext;
use super::selectors;
use crate::backend::Backend;
use crate::poll::{PollPolicy, poll_until};
use crate::primitives::{click_element, dispatch_click};
use crate::probes::ElementsProbe;
use bookrunner_common::error::WorkflowError;
use bookrunner_common::protocol::ListedElement;
use bookrunner_common::selector::SelectorSet;
use bookrunner_common::time::{
    CalendarEventCandidate, EventMatch, TargetDate, TargetTime, match_event,
};
use tracing::{debug, info, warn};

fn events_probe() -> ElementsProbe {
    ElementsProbe {
        selector: selectors::CALENDAR_EVENTS.to_string(),
    }
}

fn match_items(items: &[ListedElement], time: TargetTime) -> EventMatch {
    let candidates: Vec<CalendarEventCandidate> = items
        .iter()
        .map(|item| CalendarEventCandidate::from_text(&item.text))
        .collect();
    match_event(&candidates, time)
}

/// Waits for events to render and returns the one starting exactly at `time`.
pub async fn find_class<B: Backend + ?Sized>(
    backend: &mut B,
    ctx: &WorkflowContext<'_>,
    date: TargetDate,
    time: TargetTime,
) -> Result<ListedElement, WorkflowError> {
    let policy = ctx.poll(ctx.config.timing.events_attempts);
    let items = poll_until(backend, &events_probe(), policy)
        .await
        .unwrap_or_default();
    debug!(count = items.len(), "calendar events visible");

    match match_items(&items, time) {
        EventMatch::Found { index, matches } => {
            let item = items[index].clone();
            if matches > 1 {
                warn!(matches, chosen = %item.text, "several classes at the same time, taking the first");
            }
            info!(class = %item.text, "class found");
            Ok(item)
        }
        EventMatch::NotFound { available } => {
            warn!(
                requested = %ctx.request.target_time,
                available = ?available,
                "no class at the requested time"
            );
            Err(WorkflowError::NoMatchingClass {
                requested: ctx.request.target_time.clone(),
                date: date.to_string(),
                available,
            })
        }
    }
}

/// Clicks the class through its marker selector, then through a fresh scan
/// that finds it again by time, then by dispatching the click in the page.
pub async fn open_class<B: Backend + ?Sized>(
    backend: &mut B,
    ctx: &WorkflowContext<'_>,
    class: &ListedElement,
    time: TargetTime,
) -> Result<(), WorkflowError> {
    let direct = SelectorSet::css(class.selector.clone());
    match click_element(backend, &direct, &ctx.options).await {
        Ok(_) => return Ok(()),
        Err(e) => debug!(error = %e, "marker click failed, rescanning events"),
    }

    let rescanned = poll_until(backend, &events_probe(), PollPolicy::once())
        .await
        .unwrap_or_default();
    if let EventMatch::Found { index, .. } = match_items(&rescanned, time) {
        let fresh = SelectorSet::css(rescanned[index].selector.clone());
        match click_element(backend, &fresh, &ctx.options).await {
            Ok(_) => return Ok(()),
            Err(e) => debug!(error = %e, "rescanned click failed, dispatching in page"),
        }
    }

    let fallback = SelectorSet::css(class.selector.clone()).or_text(class.text.clone());
    dispatch_click(backend, &fallback, &ctx.options).await?;
    Ok(())
}
