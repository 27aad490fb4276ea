//! Browser lifecycle around one booking attempt.

use crate::backend::{Backend, BackendError};
use crate::config::BookrunnerConfig;
use crate::diagnostics::Diagnostics;
use crate::orchestrator::StepRunner;
use crate::workflow::BookingWorkflow;
use bookrunner_common::error::WorkflowError;
use bookrunner_common::request::{BookingRequest, BookingResponse};
use tracing::{error, info, warn};

/// A launched backend. `close` runs at most once and never fails.
pub struct BrowserSession<'a, B: Backend + ?Sized> {
    backend: &'a mut B,
    open: bool,
}

impl<'a, B: Backend + ?Sized> BrowserSession<'a, B> {
    pub async fn open(backend: &'a mut B) -> Result<Self, WorkflowError> {
        if let Err(e) = backend.launch().await {
            // A half-started browser may still hold a process.
            if let Err(close_err) = backend.close().await {
                warn!(error = %close_err, "cleanup after failed launch");
            }
            return Err(match e {
                BackendError::Launch(reason) => WorkflowError::LaunchFailure(reason),
                other => WorkflowError::LaunchFailure(other.to_string()),
            });
        }
        info!("browser session open");
        Ok(Self {
            backend,
            open: true,
        })
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut *self.backend
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub async fn close(&mut self) {
        if !self.open {
            return;
        }
        self.open = false;
        match self.backend.close().await {
            Ok(()) => info!("browser session closed"),
            Err(e) => warn!(error = %e, "browser close reported an error"),
        }
    }
}

/// Runs one booking end to end: validate, launch, run every step, close.
/// The browser is closed on every path.
pub async fn run_booking<B: Backend + ?Sized>(
    backend: &mut B,
    request: &BookingRequest,
    config: &BookrunnerConfig,
) -> BookingResponse {
    info!(request = ?request, "booking requested");
    if let Err(e) = request.validate() {
        error!(error = %e, "rejected booking request");
        return BookingResponse::failure(e.to_string());
    }

    let mut session = match BrowserSession::open(backend).await {
        Ok(session) => session,
        Err(e) => {
            error!(error = %e, "could not start browser");
            return BookingResponse::failure(e.to_string());
        }
    };

    let mut runner = StepRunner::new();
    let mut diagnostics = Diagnostics::new(request.debug);
    let workflow = BookingWorkflow::new(config, request);
    let outcome = workflow
        .run(session.backend_mut(), &mut runner, &mut diagnostics)
        .await;
    session.close().await;

    let report = runner.finish();
    let mut response = match outcome {
        Ok(message) => {
            info!(steps = report.succeeded_count(), total_ms = report.total_ms(), "booking finished");
            BookingResponse::success(message)
        }
        Err(e) => {
            error!(error = %e, "booking aborted");
            BookingResponse::failure(e.to_string())
        }
    };
    response.steps = report.steps().to_vec();
    response.screenshots = diagnostics.into_shots();
    response
}
