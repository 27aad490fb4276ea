use super::selectors;
use super::{SuggestionProbe, WorkflowContext};
use crate::backend::Backend;
use crate::poll::poll_until;
use crate::primitives::{click_element, fill_input, type_into};
use crate::probes::EmptyField;
use crate::resolver;
use bookrunner_common::error::WorkflowError;
use bookrunner_common::protocol::PageQuery;
use bookrunner_common::selector::SelectorSet;
use tracing::{debug, info, warn};

pub async fn open_login_page<B: Backend + ?Sized>(
    backend: &mut B,
    ctx: &WorkflowContext<'_>,
) -> Result<(), WorkflowError> {
    let nav = backend.navigate(&ctx.config.site.login_url).await?;
    info!(url = %nav.url, title = %nav.title, "login page loaded");
    Ok(())
}

/// Types the facility name into the search box and picks the matching
/// suggestion. Enter is pressed when no suggestion shows up.
pub async fn select_facility<B: Backend + ?Sized>(
    backend: &mut B,
    ctx: &WorkflowContext<'_>,
) -> Result<(), WorkflowError> {
    let facility = &ctx.request.facility_name;
    let search = facility_input(backend, ctx).await?;
    type_into(backend, &search, facility, &ctx.options).await?;

    let probe = SuggestionProbe {
        needle: facility.clone(),
    };
    let policy = ctx.poll(ctx.config.timing.suggestion_attempts);
    match poll_until(backend, &probe, policy).await {
        Some(item) => {
            debug!(suggestion = %item.text, "facility suggestion found");
            let target = SelectorSet::css(item.selector).or_text(item.text);
            click_element(backend, &target, &ctx.options).await?;
        }
        None => {
            warn!(facility = %facility, "no facility suggestion appeared, pressing Enter");
            backend.press_key("Enter").await?;
        }
    }
    Ok(())
}

/// The facility search box, or the first visible input when none of the
/// known selectors match.
async fn facility_input<B: Backend + ?Sized>(
    backend: &mut B,
    ctx: &WorkflowContext<'_>,
) -> Result<SelectorSet, WorkflowError> {
    let known = selectors::facility_search();
    if resolver::resolve(backend, &known, ctx.options.timeout / 2, ctx.options.debug)
        .await
        .is_ok()
    {
        return Ok(known);
    }

    debug!("facility search box not found, using first visible input");
    let marker = backend
        .evaluate(PageQuery::FirstVisibleInput)
        .await?
        .into_marker()?;
    Ok(match marker {
        Some(selector) => SelectorSet::css(selector),
        None => known,
    })
}

/// Fills the credentials and submits. Some tenants ask for the password a
/// second time; that prompt is answered once. The field filled before submit
/// still holds the password, so only an empty password field counts.
pub async fn sign_in<B: Backend + ?Sized>(
    backend: &mut B,
    ctx: &WorkflowContext<'_>,
) -> Result<(), WorkflowError> {
    let request = ctx.request;
    fill_input(backend, &selectors::email_input(), "email", &request.email, &ctx.options).await?;
    fill_input(
        backend,
        &selectors::password_input(),
        "password",
        &request.password,
        &ctx.options,
    )
    .await?;
    click_element(backend, &selectors::submit_login(), &ctx.options).await?;

    let reprompt = EmptyField {
        selector: selectors::PASSWORD_PROMPT.to_string(),
    };
    if let Some(field) = poll_until(backend, &reprompt, ctx.poll(2)).await {
        info!("second password prompt, re-entering password");
        fill_input(
            backend,
            &SelectorSet::css(field),
            "password",
            &request.password,
            &ctx.options,
        )
        .await?;
        click_element(backend, &selectors::submit_login(), &ctx.options).await?;
    }

    backend
        .wait_for_navigation(ctx.config.timing.navigation_timeout())
        .await?;
    Ok(())
}
