//! Booking modal: customer selection, credits confirmation and payment.

use super::selectors;
use super::{SuggestionProbe, WorkflowContext};
use crate::backend::Backend;
use crate::poll::{PollPolicy, poll_until};
use crate::primitives::{click_element, dispatch_click, type_into};
use crate::probes::{Presence, TextProbe};
use bookrunner_common::error::WorkflowError;
use bookrunner_common::selector::SelectorSet;
use tracing::{info, warn};

pub async fn book_customer<B: Backend + ?Sized>(
    backend: &mut B,
    ctx: &WorkflowContext<'_>,
) -> Result<(), WorkflowError> {
    click_element(backend, &selectors::book_customer(), &ctx.options).await?;
    Ok(())
}

pub async fn select_customer<B: Backend + ?Sized>(
    backend: &mut B,
    ctx: &WorkflowContext<'_>,
) -> Result<(), WorkflowError> {
    let customer = ctx.customer().to_string();
    type_into(backend, &selectors::customer_search(), &customer, &ctx.options).await?;

    let probe = SuggestionProbe {
        needle: customer.clone(),
    };
    let policy = ctx.poll(ctx.config.timing.suggestion_attempts);
    let target = match poll_until(backend, &probe, policy).await {
        Some(item) => SelectorSet::css(item.selector).or_text(customer),
        None => SelectorSet::text(customer),
    };
    click_element(backend, &target, &ctx.options).await?;
    Ok(())
}

/// Clicks the credits confirmation. Returns whether the booking modal was
/// seen open beforehand.
pub async fn confirm_with_credits<B: Backend + ?Sized>(
    backend: &mut B,
    ctx: &WorkflowContext<'_>,
) -> Result<bool, WorkflowError> {
    let modal = Presence::visible("booking modal", selectors::booking_modal());
    let modal_seen = poll_until(backend, &modal, ctx.poll(ctx.config.timing.suggestion_attempts))
        .await
        .is_some();
    if !modal_seen {
        warn!("booking modal not detected, trying the credits button anyway");
    }
    dispatch_click(backend, &selectors::pay_with_credits(), &ctx.options).await?;
    Ok(modal_seen)
}

/// Returns the message reported to the caller. A missing confirmation after
/// charging is logged and still counts as success.
///
/// A closed modal only means the booking went through when it was seen open
/// in the previous step.
pub async fn confirm_payment<B: Backend + ?Sized>(
    backend: &mut B,
    ctx: &WorkflowContext<'_>,
    modal_seen: bool,
) -> Result<String, WorkflowError> {
    let success = TextProbe::new(ctx.config.vocabulary.success.clone());
    if let Some(word) = poll_until(backend, &success, PollPolicy::once()).await {
        info!(signal = %word, "booking already confirmed");
        return Ok(format!("Booking confirmed ({})", word));
    }
    let modal_closed = Presence::absent("booking modal closed", selectors::booking_modal());
    if modal_seen && poll_until(backend, &modal_closed, PollPolicy::once()).await.is_some() {
        info!("booking modal closed without a charge step");
        return Ok("Booking completed".to_string());
    }

    click_element(backend, &selectors::charge(), &ctx.options).await?;

    let policy = PollPolicy::new(
        ctx.config.timing.confirmation_attempts,
        ctx.config.timing.confirmation_interval(),
    );
    match poll_until(backend, &success, policy).await {
        Some(word) => {
            info!(signal = %word, "payment confirmed");
            Ok(format!("Booking confirmed ({})", word))
        }
        None => {
            warn!(
                attempts = policy.attempts,
                "no confirmation text after charging; reporting success without a signal"
            );
            Ok("Charge submitted; no confirmation detected".to_string())
        }
    }
}
