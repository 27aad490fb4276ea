//! Resolver plus executor, with bounded timeouts and fallback tiers.
//!
//! Each primitive either returns the successful [`ActionOutcome`] or an
//! [`InteractionError::AllStrategiesExhausted`] naming every selector it
//! tried and the last thing that went wrong.

use crate::action;
use crate::backend::Backend;
use crate::config::BookrunnerConfig;
use crate::resolver::{self, ResolvedElement, log_attempt};
use bookrunner_common::error::{InteractionError, ResolveError};
use bookrunner_common::formatter::mask_sensitive;
use bookrunner_common::protocol::{DispatchClickRequest, PageQuery, PageReply};
use bookrunner_common::report::ActionOutcome;
use bookrunner_common::selector::SelectorSet;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct InteractionOptions {
    pub timeout: Duration,
    /// Pause after a successful click so the page can react.
    pub settle: Duration,
    pub typing_delay: Duration,
    pub debug: bool,
    /// Field names whose values are masked in logs.
    pub sensitive_fields: Vec<String>,
}

impl Default for InteractionOptions {
    fn default() -> Self {
        Self::from_config(&BookrunnerConfig::default(), false)
    }
}

impl InteractionOptions {
    pub fn from_config(config: &BookrunnerConfig, debug: bool) -> Self {
        Self {
            timeout: config.timing.resolve_timeout(),
            settle: config.timing.settle(),
            typing_delay: config.timing.typing_delay(),
            debug,
            sensitive_fields: config.security.sensitive_fields.clone(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

fn exhausted(action: &str, set: &SelectorSet, last_error: Option<String>) -> InteractionError {
    InteractionError::AllStrategiesExhausted {
        action: action.to_string(),
        attempted: set.describe(),
        last_error,
    }
}

async fn resolve_for<B: Backend + ?Sized>(
    backend: &mut B,
    action: &str,
    set: &SelectorSet,
    options: &InteractionOptions,
) -> Result<ResolvedElement, InteractionError> {
    resolver::resolve(backend, set, options.timeout, options.debug)
        .await
        .map_err(|ResolveError::NotFound { last_error, .. }| exhausted(action, set, last_error))
}

fn check(action: &str, set: &SelectorSet, outcome: ActionOutcome) -> Result<ActionOutcome, InteractionError> {
    if outcome.succeeded {
        Ok(outcome)
    } else {
        Err(exhausted(action, set, outcome.detail))
    }
}

pub async fn click_element<B: Backend + ?Sized>(
    backend: &mut B,
    set: &SelectorSet,
    options: &InteractionOptions,
) -> Result<ActionOutcome, InteractionError> {
    let element = resolve_for(backend, "click", set, options).await?;
    let outcome = check("click", set, action::click(backend, &element).await)?;
    if !options.settle.is_zero() {
        tokio::time::sleep(options.settle).await;
    }
    Ok(outcome)
}

/// Fast structural fill. `field` names the value for log masking.
pub async fn fill_input<B: Backend + ?Sized>(
    backend: &mut B,
    set: &SelectorSet,
    field: &str,
    value: &str,
    options: &InteractionOptions,
) -> Result<ActionOutcome, InteractionError> {
    let element = resolve_for(backend, "fill", set, options).await?;
    debug!(
        field,
        value = %mask_sensitive(value, field, &options.sensitive_fields),
        strategy = %element.strategy,
        "filling input"
    );
    check("fill", set, action::set_value(backend, &element, value).await)
}

/// Typed fill, one key event per character.
pub async fn type_into<B: Backend + ?Sized>(
    backend: &mut B,
    set: &SelectorSet,
    text: &str,
    options: &InteractionOptions,
) -> Result<ActionOutcome, InteractionError> {
    let element = resolve_for(backend, "type", set, options).await?;
    check(
        "type",
        set,
        action::type_text(backend, &element, text, options.typing_delay).await,
    )
}

/// Sends the pointer-event triplet inside the page for each strategy in turn.
/// The first strategy whose element receives the events wins.
pub async fn dispatch_click<B: Backend + ?Sized>(
    backend: &mut B,
    set: &SelectorSet,
    options: &InteractionOptions,
) -> Result<ActionOutcome, InteractionError> {
    let mut last_error = None;
    for strategy in set.strategies() {
        let query = PageQuery::DispatchClick(DispatchClickRequest {
            target: strategy.clone(),
            pointer_events: true,
        });
        match backend.evaluate(query).await.and_then(PageReply::into_flag) {
            Ok(true) => {
                log_attempt(options.debug, "dispatch_click", strategy, "dispatched");
                if !options.settle.is_zero() {
                    tokio::time::sleep(options.settle).await;
                }
                return Ok(ActionOutcome::success(strategy.clone()));
            }
            Ok(false) => {
                log_attempt(options.debug, "dispatch_click", strategy, "no element");
                last_error = Some(format!("no element for {}", strategy));
            }
            Err(e) => {
                log_attempt(options.debug, "dispatch_click", strategy, "error");
                last_error = Some(e.to_string());
            }
        }
    }
    Err(exhausted("dispatch_click", set, last_error))
}
