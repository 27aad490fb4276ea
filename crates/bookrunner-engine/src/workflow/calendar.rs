//! Calendar view switching and date-picker navigation.

use super::WorkflowContext;
use super::selectors;
use crate::backend::Backend;
use crate::poll::{PollPolicy, poll_until};
use crate::primitives::click_element;
use crate::probes::{CalendarHeaderProbe, Presence};
use bookrunner_common::error::{InteractionError, WorkflowError};
use bookrunner_common::time::{MonthStep, MonthYear, TargetDate};
use tracing::{debug, info};

/// Opens the view dropdown through whichever tier gets it open, then picks
/// the daily view.
pub async fn switch_to_daily_view<B: Backend + ?Sized>(
    backend: &mut B,
    ctx: &WorkflowContext<'_>,
) -> Result<(), WorkflowError> {
    let open = Presence::visible("view dropdown open", selectors::view_dropdown_open());
    let tiers = selectors::view_dropdown_tiers();
    // Each tier gets a short budget so a missing trigger does not eat the
    // whole resolve timeout.
    let options = ctx.options.clone().with_timeout(ctx.options.timeout / 2);

    let mut attempted = Vec::new();
    let mut last_error = None;
    let mut opened = false;
    for tier in &tiers {
        attempted.extend(tier.describe());
        match click_element(backend, tier, &options).await {
            Ok(outcome) => {
                if poll_until(backend, &open, ctx.poll(2)).await.is_some() {
                    debug!(strategy = ?outcome.strategy_used, "view dropdown opened");
                    opened = true;
                    break;
                }
                last_error = Some("dropdown did not open".to_string());
            }
            Err(e) => last_error = Some(e.to_string()),
        }
    }
    if !opened {
        return Err(InteractionError::AllStrategiesExhausted {
            action: "open view dropdown".to_string(),
            attempted,
            last_error,
        }
        .into());
    }

    click_element(backend, &selectors::daily_view_option(), &ctx.options).await?;
    Ok(())
}

pub async fn open_date_picker<B: Backend + ?Sized>(
    backend: &mut B,
    ctx: &WorkflowContext<'_>,
) -> Result<(), WorkflowError> {
    click_element(backend, &selectors::date_picker_trigger(), &ctx.options).await?;
    let open = Presence::visible("date picker open", selectors::date_picker_open());
    if poll_until(backend, &open, ctx.poll(3)).await.is_none() {
        return Err(WorkflowError::DateNavigation {
            target: "date picker".to_string(),
            reason: "picker did not open".to_string(),
        });
    }
    Ok(())
}

/// Pages the picker to the target month, then clicks the day cell.
pub async fn select_date<B: Backend + ?Sized>(
    backend: &mut B,
    ctx: &WorkflowContext<'_>,
    date: TargetDate,
) -> Result<(), WorkflowError> {
    let target = date.month_year();
    let max_steps = ctx.config.timing.max_month_steps;
    let fail = |reason: String| WorkflowError::DateNavigation {
        target: date.to_string(),
        reason,
    };

    let mut clicks = 0;
    loop {
        let shown = read_header(backend, ctx.poll(3)).await.ok_or_else(|| {
            fail("calendar header unreadable".to_string())
        })?;
        let step = shown.step_towards(&target);
        debug!(
            shown = %format_month(&shown),
            target = %format_month(&target),
            ?step,
            "date picker month"
        );

        let nav = match step {
            MonthStep::Stay => break,
            MonthStep::Forward => selectors::next_month(),
            MonthStep::Backward => selectors::previous_month(),
        };
        if clicks >= max_steps {
            return Err(fail(format!(
                "still on {} after {} navigation clicks",
                format_month(&shown),
                clicks
            )));
        }
        click_element(backend, &nav, &ctx.options).await?;
        clicks += 1;
    }

    click_element(backend, &selectors::day_cell(date.day), &ctx.options).await?;

    let apply = selectors::apply_date();
    let apply_visible = Presence::visible("apply button", apply.strategies().cloned().collect());
    if poll_until(backend, &apply_visible, PollPolicy::once()).await.is_some() {
        click_element(backend, &apply, &ctx.options).await?;
    }
    info!(date = %date, clicks, "date selected");
    Ok(())
}

async fn read_header<B: Backend + ?Sized>(backend: &mut B, policy: PollPolicy) -> Option<MonthYear> {
    let probe = CalendarHeaderProbe {
        selectors: selectors::DATE_PICKER_HEADER
            .iter()
            .map(|s| s.to_string())
            .collect(),
    };
    poll_until(backend, &probe, policy).await
}

fn format_month(m: &MonthYear) -> String {
    format!("{:04}-{:02}", m.year, m.month)
}
