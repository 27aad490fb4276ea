//! Primitive actions on a resolved element.

use crate::backend::{Backend, BackendError};
use crate::resolver::ResolvedElement;
use bookrunner_common::error::ErrorKind;
use bookrunner_common::protocol::{DispatchClickRequest, PageQuery, PageReply, SetValueRequest};
use bookrunner_common::report::ActionOutcome;
use std::time::Duration;
use tracing::debug;

/// Native click, then an in-page `element.click()` if the native one fails.
pub async fn click<B: Backend + ?Sized>(backend: &mut B, element: &ResolvedElement) -> ActionOutcome {
    let native_err = match backend.click(element.handle, element.offset).await {
        Ok(()) => return ActionOutcome::success(element.strategy.clone()),
        Err(e) => e,
    };
    debug!(strategy = %element.strategy, error = %native_err, "native click failed, dispatching in page");

    let query = PageQuery::DispatchClick(DispatchClickRequest {
        target: element.page_target.clone(),
        pointer_events: false,
    });
    match backend.evaluate(query).await.and_then(PageReply::into_flag) {
        Ok(true) => ActionOutcome::success(element.strategy.clone()),
        Ok(false) => ActionOutcome::failure(
            Some(element.strategy.clone()),
            ErrorKind::NotInteractable,
            format!("{}; in-page click found no element", native_err),
        ),
        Err(e) => ActionOutcome::failure(
            Some(element.strategy.clone()),
            ErrorKind::Backend,
            format!("{}; {}", native_err, e),
        ),
    }
}

/// Assigns through the native value setter inside the page, which then fires
/// `input`, `change`, `focus`, `blur`. The outcome only succeeds when the
/// field reads back the supplied value.
pub async fn set_value<B: Backend + ?Sized>(
    backend: &mut B,
    element: &ResolvedElement,
    value: &str,
) -> ActionOutcome {
    let query = PageQuery::SetValue(SetValueRequest {
        target: element.page_target.clone(),
        value: value.to_string(),
    });
    let reply = match backend.evaluate(query).await {
        Ok(reply) => reply,
        Err(e) => {
            return ActionOutcome::failure(
                Some(element.strategy.clone()),
                ErrorKind::Backend,
                e.to_string(),
            );
        }
    };

    match reply {
        PageReply::Assigned { value: actual, events } if actual == value => {
            debug!(strategy = %element.strategy, events = ?events, "value assigned");
            ActionOutcome::success(element.strategy.clone())
        }
        PageReply::Assigned { .. } => ActionOutcome::failure(
            Some(element.strategy.clone()),
            ErrorKind::ValueMismatch,
            "field did not keep the assigned value",
        ),
        PageReply::Error { message } => ActionOutcome::failure(
            Some(element.strategy.clone()),
            ErrorKind::NotInteractable,
            message,
        ),
        other => ActionOutcome::failure(
            Some(element.strategy.clone()),
            ErrorKind::Backend,
            format!("unexpected reply {:?}", other),
        ),
    }
}

/// Focuses the element by clicking it, then sends one key event per
/// character with `delay` in between.
pub async fn type_text<B: Backend + ?Sized>(
    backend: &mut B,
    element: &ResolvedElement,
    text: &str,
    delay: Duration,
) -> ActionOutcome {
    let focused = match backend.click(element.handle, element.offset).await {
        Ok(()) => Ok(()),
        Err(_) => backend.focus(element.handle).await,
    };
    if let Err(e) = focused {
        return ActionOutcome::failure(
            Some(element.strategy.clone()),
            ErrorKind::NotInteractable,
            e.to_string(),
        );
    }

    match type_chars(backend, element, text, delay).await {
        Ok(()) => ActionOutcome::success(element.strategy.clone()),
        Err(e) => ActionOutcome::failure(
            Some(element.strategy.clone()),
            ErrorKind::Backend,
            e.to_string(),
        ),
    }
}

async fn type_chars<B: Backend + ?Sized>(
    backend: &mut B,
    element: &ResolvedElement,
    text: &str,
    delay: Duration,
) -> Result<(), BackendError> {
    let mut buf = [0u8; 4];
    for (i, c) in text.chars().enumerate() {
        if i > 0 && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        backend.type_text(element.handle, c.encode_utf8(&mut buf)).await?;
    }
    Ok(())
}
