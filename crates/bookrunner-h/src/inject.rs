use bookrunner_engine::backend::BackendError;
use bookrunner_engine::protocol::{PageQuery, PageReply};
use chromiumoxide::Page;
use std::time::Duration;

const PAGE_JS: &str = include_str!("page.js");

/// Evaluation timeout. A JavaScript dialog blocks the page thread, so a
/// query must never wait on it indefinitely.
const EVAL_TIMEOUT: Duration = Duration::from_secs(10);

/// Retries when the execution context disappears mid navigation.
const MAX_CONTEXT_RETRIES: u32 = 10;

const CONTEXT_RETRY_DELAY: Duration = Duration::from_millis(100);

fn is_context_error(err: &str) -> bool {
    err.contains("Cannot find context")
        || err.contains("Execution context was destroyed")
        || err.contains("-32000")
}

enum EvalError {
    Timeout,
    Context(String),
    Other(String),
}

async fn evaluate_with_timeout(
    page: &Page,
    expression: &str,
) -> Result<serde_json::Value, EvalError> {
    match tokio::time::timeout(EVAL_TIMEOUT, page.evaluate(expression)).await {
        Err(_) => Err(EvalError::Timeout),
        Ok(Err(e)) => {
            let err_str = e.to_string();
            if is_context_error(&err_str) {
                Err(EvalError::Context(err_str))
            } else {
                Err(EvalError::Other(err_str))
            }
        }
        Ok(Ok(remote_object)) => remote_object
            .into_value::<serde_json::Value>()
            .map_err(|e| EvalError::Other(format!("Failed to get result: {}", e))),
    }
}

async fn ensure_injected(page: &Page) -> Result<(), EvalError> {
    let loaded = evaluate_with_timeout(page, "typeof window.Bookrunner !== 'undefined'").await?;
    if loaded.as_bool() != Some(true) {
        evaluate_with_timeout(page, PAGE_JS).await?;
    }
    Ok(())
}

/// Runs `query` through `window.Bookrunner.process`, injecting the page
/// script first when the current document does not have it yet.
pub async fn run_query(page: &Page, query: &PageQuery) -> Result<PageReply, BackendError> {
    let expression = format!("window.Bookrunner.process({})", serde_json::to_string(query)?);
    tracing::trace!(action = query.name(), "evaluating page query");

    let mut last_error = None;
    for attempt in 0..MAX_CONTEXT_RETRIES {
        let result = match ensure_injected(page).await {
            Ok(()) => evaluate_with_timeout(page, &expression).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(value) => return Ok(serde_json::from_value(value)?),
            Err(EvalError::Timeout) => {
                return Err(BackendError::Timeout {
                    operation: format!(
                        "{} (page possibly blocked by a dialog)",
                        query.name()
                    ),
                });
            }
            Err(EvalError::Context(err_str)) => {
                tracing::debug!(
                    action = query.name(),
                    attempt = attempt + 1,
                    max = MAX_CONTEXT_RETRIES,
                    "context lost, retrying"
                );
                last_error = Some(err_str);
                tokio::time::sleep(CONTEXT_RETRY_DELAY).await;
            }
            Err(EvalError::Other(err_str)) => return Err(BackendError::ScriptError(err_str)),
        }
    }

    Err(BackendError::ScriptError(last_error.unwrap_or_else(|| {
        format!("{} failed after retries", query.name())
    })))
}
