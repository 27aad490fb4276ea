use crate::error::ErrorKind;
use crate::selector::SelectorStrategy;
use serde::{Deserialize, Serialize};

/// Result of one primitive action. Callers branch on `succeeded` only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionOutcome {
    pub succeeded: bool,
    pub strategy_used: Option<SelectorStrategy>,
    pub error: Option<ErrorKind>,
    /// Underlying cause, for logs and exhaustion errors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ActionOutcome {
    pub fn success(strategy: SelectorStrategy) -> Self {
        Self {
            succeeded: true,
            strategy_used: Some(strategy),
            error: None,
            detail: None,
        }
    }

    pub fn failure(
        strategy: Option<SelectorStrategy>,
        error: ErrorKind,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            succeeded: false,
            strategy_used: strategy,
            error: Some(error),
            detail: Some(detail.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepOutcome {
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepResult {
    pub label: String,
    pub duration_ms: u64,
    pub outcome: StepOutcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Terminal state of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Running,
    Completed,
    Aborted,
}

/// Append-only record of every step that ran.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowReport {
    steps: Vec<StepResult>,
    state: RunState,
}

impl Default for WorkflowReport {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkflowReport {
    pub fn new() -> Self {
        Self {
            steps: Vec::new(),
            state: RunState::Running,
        }
    }

    /// Records a finished step. A failed step moves the report to `Aborted`;
    /// nothing is recorded after that.
    pub fn push(&mut self, result: StepResult) {
        if self.state == RunState::Aborted {
            return;
        }
        if result.outcome == StepOutcome::Failed {
            self.state = RunState::Aborted;
        }
        self.steps.push(result);
    }

    pub fn complete(&mut self) {
        if self.state == RunState::Running {
            self.state = RunState::Completed;
        }
    }

    pub fn steps(&self) -> &[StepResult] {
        &self.steps
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn succeeded_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| s.outcome == StepOutcome::Succeeded)
            .count()
    }

    pub fn failed_step(&self) -> Option<&StepResult> {
        self.steps
            .iter()
            .find(|s| s.outcome == StepOutcome::Failed)
    }

    pub fn total_ms(&self) -> u64 {
        self.steps.iter().map(|s| s.duration_ms).sum()
    }
}
