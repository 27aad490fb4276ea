//! The booking pipeline: a fixed sequence of named steps run through a
//! [`StepRunner`].

pub mod calendar;
pub mod checkout;
pub mod class_lookup;
pub mod login;
pub mod selectors;

use crate::backend::{Backend, BackendError};
use crate::config::BookrunnerConfig;
use crate::diagnostics::Diagnostics;
use crate::orchestrator::StepRunner;
use crate::poll::PollPolicy;
use crate::primitives::InteractionOptions;
use crate::probes::Probe;
use async_trait::async_trait;
use bookrunner_common::error::WorkflowError;
use bookrunner_common::protocol::{ListElementsRequest, ListedElement, PageQuery};
use bookrunner_common::request::BookingRequest;
use bookrunner_common::time::{TargetDate, TargetTime};
use tracing::info;

/// Everything a step needs besides the backend.
pub struct WorkflowContext<'a> {
    pub config: &'a BookrunnerConfig,
    pub request: &'a BookingRequest,
    pub options: InteractionOptions,
}

impl<'a> WorkflowContext<'a> {
    pub fn new(config: &'a BookrunnerConfig, request: &'a BookingRequest) -> Self {
        Self {
            config,
            request,
            options: InteractionOptions::from_config(config, request.debug),
        }
    }

    pub fn poll(&self, attempts: u32) -> PollPolicy {
        PollPolicy::new(attempts, self.config.timing.poll_interval())
    }

    /// Customer picked in the booking modal.
    pub fn customer(&self) -> &str {
        let configured = self.config.site.customer_name.trim();
        if configured.is_empty() {
            &self.request.email
        } else {
            configured
        }
    }
}

pub struct BookingWorkflow<'a> {
    ctx: WorkflowContext<'a>,
}

impl<'a> BookingWorkflow<'a> {
    pub fn new(config: &'a BookrunnerConfig, request: &'a BookingRequest) -> Self {
        Self {
            ctx: WorkflowContext::new(config, request),
        }
    }

    /// Runs every step in order and returns the success message. The first
    /// failing step ends the run; a screenshot named `failure` is taken
    /// before returning in debug mode.
    pub async fn run<B: Backend + ?Sized>(
        &self,
        backend: &mut B,
        runner: &mut StepRunner,
        diagnostics: &mut Diagnostics,
    ) -> Result<String, WorkflowError> {
        let result = self.run_steps(backend, runner, diagnostics).await;
        if result.is_err() {
            diagnostics.capture(backend, "failure").await;
        }
        result
    }

    async fn run_steps<B: Backend + ?Sized>(
        &self,
        backend: &mut B,
        runner: &mut StepRunner,
        diagnostics: &mut Diagnostics,
    ) -> Result<String, WorkflowError> {
        let ctx = &self.ctx;

        runner
            .run_step("open login page", login::open_login_page(backend, ctx))
            .await?;
        diagnostics.capture(backend, "login-page").await;
        runner
            .run_step("select facility", login::select_facility(backend, ctx))
            .await?;
        runner
            .run_step("sign in", login::sign_in(backend, ctx))
            .await?;
        diagnostics.capture(backend, "signed-in").await;

        let (date, time) = runner
            .run_step("resolve target", async { resolve_target(ctx.request) })
            .await?;

        runner
            .run_step("switch to daily view", calendar::switch_to_daily_view(backend, ctx))
            .await?;
        runner
            .run_step("open date picker", calendar::open_date_picker(backend, ctx))
            .await?;
        runner
            .run_step("select date", calendar::select_date(backend, ctx, date))
            .await?;
        diagnostics.capture(backend, "date-selected").await;

        let class = runner
            .run_step("find class", class_lookup::find_class(backend, ctx, date, time))
            .await?;
        runner
            .run_step("open class", class_lookup::open_class(backend, ctx, &class, time))
            .await?;

        runner
            .run_step("book customer", checkout::book_customer(backend, ctx))
            .await?;
        runner
            .run_step("select customer", checkout::select_customer(backend, ctx))
            .await?;
        let modal_seen = runner
            .run_step("confirm with credits", checkout::confirm_with_credits(backend, ctx))
            .await?;
        let message = runner
            .run_step("confirm payment", checkout::confirm_payment(backend, ctx, modal_seen))
            .await?;
        diagnostics.capture(backend, "booked").await;

        Ok(message)
    }
}

fn resolve_target(request: &BookingRequest) -> Result<(TargetDate, TargetTime), WorkflowError> {
    let (date, time) = request.validate()?;
    info!(date = %date, time = %time, requested = %request.target_time, "booking target");
    Ok((date, time))
}

/// First visible autocomplete entry whose text contains `needle`,
/// case-insensitively.
#[derive(Debug, Clone)]
pub struct SuggestionProbe {
    pub needle: String,
}

#[async_trait]
impl Probe for SuggestionProbe {
    type Output = ListedElement;

    fn name(&self) -> &str {
        "suggestion"
    }

    async fn check<B: Backend + ?Sized>(
        &self,
        backend: &mut B,
    ) -> Result<Option<ListedElement>, BackendError> {
        let needle = self.needle.to_lowercase();
        let items = backend
            .evaluate(PageQuery::ListElements(ListElementsRequest {
                selector: selectors::SUGGESTION_ITEMS.to_string(),
            }))
            .await?
            .into_elements()?;
        Ok(items
            .into_iter()
            .find(|item| item.text.to_lowercase().contains(&needle)))
    }
}
