use bookrunner_common::error::WorkflowError;
use bookrunner_common::report::{StepOutcome, StepResult, WorkflowReport};
use std::future::Future;
use std::time::Instant;
use tracing::{error, info};

/// Runs named steps in order and records each one. The first failure is
/// returned to the caller, which is expected to stop there.
#[derive(Debug, Default)]
pub struct StepRunner {
    report: WorkflowReport,
}

impl StepRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn run_step<T, F>(&mut self, label: &str, step: F) -> Result<T, WorkflowError>
    where
        F: Future<Output = Result<T, WorkflowError>>,
    {
        let index = self.report.steps().len() + 1;
        info!(step = label, index, "step started");
        let started = Instant::now();
        let result = step.await;
        let duration_ms = started.elapsed().as_millis() as u64;

        match &result {
            Ok(_) => {
                info!(step = label, duration_ms, "step succeeded");
                self.report.push(StepResult {
                    label: label.to_string(),
                    duration_ms,
                    outcome: StepOutcome::Succeeded,
                    error: None,
                });
            }
            Err(e) => {
                error!(step = label, duration_ms, reason = %e, "step failed");
                self.report.push(StepResult {
                    label: label.to_string(),
                    duration_ms,
                    outcome: StepOutcome::Failed,
                    error: Some(e.to_string()),
                });
            }
        }
        result
    }

    pub fn report(&self) -> &WorkflowReport {
        &self.report
    }

    /// Marks the run completed unless a step already aborted it.
    pub fn finish(mut self) -> WorkflowReport {
        self.report.complete();
        self.report
    }
}
