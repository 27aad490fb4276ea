//! Element resolution over a [`SelectorSet`].
//!
//! Direct strategies (css, accessible name, xpath) go through the backend's
//! own lookup, one at a time and in declared order. Each gets half of the
//! overall timeout to attach and must then be visible. When none of them
//! yields a visible element and the set holds text strategies, a single
//! in-page routine scans for text/aria-label containment and then re-tries
//! the XPath entries inside the page. The first visible match wins; there is
//! no scoring between strategies.

use crate::backend::{Backend, BackendError, ElementHandle, Rect};
use bookrunner_common::error::ResolveError;
use bookrunner_common::protocol::{FindElementRequest, PageQuery, PageReply};
use bookrunner_common::selector::{ClickOffset, SelectorSet, SelectorStrategy};
use std::time::Duration;
use tracing::{info, trace};

/// A visible element located in the live page.
#[derive(Debug, Clone)]
pub struct ResolvedElement {
    pub handle: ElementHandle,
    /// Strategy from the caller's set that located the element.
    pub strategy: SelectorStrategy,
    /// Strategy the page script can use to address this exact element.
    pub page_target: SelectorStrategy,
    pub rect: Rect,
    pub offset: Option<ClickOffset>,
}

pub(crate) fn log_attempt(debug: bool, action: &str, strategy: &SelectorStrategy, outcome: &str) {
    if debug {
        info!(action, strategy = %strategy, outcome, "strategy attempt");
    } else {
        trace!(action, strategy = %strategy, outcome, "strategy attempt");
    }
}

pub async fn resolve<B: Backend + ?Sized>(
    backend: &mut B,
    set: &SelectorSet,
    timeout: Duration,
    debug: bool,
) -> Result<ResolvedElement, ResolveError> {
    let per_strategy = timeout / 2;
    let mut attempted = Vec::new();
    let mut last_error = None;

    for entry in set.entries().iter().filter(|e| e.strategy.is_direct()) {
        let strategy = &entry.strategy;
        attempted.push(strategy.to_string());

        match locate_visible(backend, strategy, per_strategy).await {
            Ok(Some((handle, rect))) => {
                log_attempt(debug, "resolve", strategy, "visible");
                return Ok(ResolvedElement {
                    handle,
                    strategy: strategy.clone(),
                    page_target: strategy.clone(),
                    rect,
                    offset: entry.offset,
                });
            }
            Ok(None) => {
                log_attempt(debug, "resolve", strategy, "not visible");
                last_error = Some(format!("{} matched a hidden element", strategy));
            }
            Err(e) => {
                log_attempt(debug, "resolve", strategy, "not found");
                last_error = Some(e.to_string());
            }
        }
    }

    let text_strategies: Vec<SelectorStrategy> =
        set.strategies().filter(|s| !s.is_direct()).cloned().collect();

    if !text_strategies.is_empty() {
        attempted.extend(text_strategies.iter().map(|s| s.to_string()));

        let mut in_page = text_strategies.clone();
        in_page.extend(
            set.strategies()
                .filter(|s| matches!(s, SelectorStrategy::Xpath(_)))
                .cloned(),
        );

        match find_in_page(backend, in_page, per_strategy).await {
            Ok(Some((marker, matched, handle, rect))) => {
                let strategy = matched.unwrap_or_else(|| text_strategies[0].clone());
                log_attempt(debug, "resolve", &strategy, "visible (in page)");
                let offset = set.offset_for(&strategy);
                return Ok(ResolvedElement {
                    handle,
                    strategy,
                    page_target: marker,
                    rect,
                    offset,
                });
            }
            Ok(None) => {
                for s in &text_strategies {
                    log_attempt(debug, "resolve", s, "no in-page match");
                }
                last_error = Some("no in-page match".to_string());
            }
            Err(e) => {
                last_error = Some(e.to_string());
            }
        }
    }

    Err(ResolveError::NotFound {
        attempted,
        last_error,
    })
}

/// Waits for attachment, then checks visibility. `Ok(None)` means the
/// element exists but is not rendered.
async fn locate_visible<B: Backend + ?Sized>(
    backend: &mut B,
    strategy: &SelectorStrategy,
    timeout: Duration,
) -> Result<Option<(ElementHandle, Rect)>, BackendError> {
    let handle = backend.wait_for_element(strategy, timeout).await?;
    let rect = backend.element_box(handle).await?;
    Ok(rect.filter(Rect::has_area).map(|r| (handle, r)))
}

type InPageHit = (SelectorStrategy, Option<SelectorStrategy>, ElementHandle, Rect);

async fn find_in_page<B: Backend + ?Sized>(
    backend: &mut B,
    strategies: Vec<SelectorStrategy>,
    timeout: Duration,
) -> Result<Option<InPageHit>, BackendError> {
    let reply = backend
        .evaluate(PageQuery::FindElement(FindElementRequest { strategies }))
        .await?;
    let matched = match &reply {
        PageReply::Marker { matched, .. } => matched.clone(),
        _ => None,
    };
    let Some(marker) = reply.into_marker()? else {
        return Ok(None);
    };

    let marker = SelectorStrategy::Css(marker);
    Ok(locate_visible(backend, &marker, timeout)
        .await?
        .map(|(handle, rect)| (marker, matched, handle, rect)))
}
