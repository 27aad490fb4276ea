use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by a browser backend.
#[derive(Error, Debug, Clone)]
pub enum BackendError {
    // ============================================================
    // Lifecycle
    // ============================================================
    #[error("Browser launch failed: {0}")]
    Launch(String),

    #[error("Not ready")]
    NotReady,

    // ============================================================
    // Navigation
    // ============================================================
    #[error("Navigation failed: {0}")]
    Navigation(String),

    #[error("Navigation did not settle within {timeout_ms}ms")]
    NavigationTimeout { timeout_ms: u64 },

    // ============================================================
    // Elements
    // ============================================================
    #[error("No element matches {selector}")]
    ElementNotFound { selector: String },

    #[error("Element handle {handle} is stale")]
    ElementStale { handle: u32 },

    #[error("Invalid selector: {selector}")]
    SelectorInvalid { selector: String },

    #[error("Input failed: {0}")]
    Input(String),

    // ============================================================
    // Page script
    // ============================================================
    #[error("Script execution error: {0}")]
    ScriptError(String),

    #[error("Unexpected page reply: {0}")]
    Scanner(String),

    #[error("Timeout: {operation}")]
    Timeout { operation: String },

    // ============================================================
    // System
    // ============================================================
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Other: {0}")]
    Other(String),
}

impl From<serde_json::Error> for BackendError {
    fn from(err: serde_json::Error) -> Self {
        BackendError::Serialization(err.to_string())
    }
}

/// Coarse failure classification carried by an `ActionOutcome`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotInteractable,
    ValueMismatch,
    Backend,
}

#[derive(Error, Debug, Clone)]
pub enum ResolveError {
    #[error("No visible element for [{}]{}", attempted.join(", "), last_error_suffix(last_error))]
    NotFound {
        attempted: Vec<String>,
        last_error: Option<String>,
    },
}

#[derive(Error, Debug, Clone)]
pub enum InteractionError {
    #[error("{action} failed for every strategy [{}]{}", attempted.join(", "), last_error_suffix(last_error))]
    AllStrategiesExhausted {
        action: String,
        attempted: Vec<String>,
        last_error: Option<String>,
    },
}

fn last_error_suffix(last_error: &Option<String>) -> String {
    match last_error {
        Some(e) => format!(": {}", e),
        None => String::new(),
    }
}

/// Everything a workflow step can fail with.
#[derive(Error, Debug, Clone)]
pub enum WorkflowError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Interaction(#[from] InteractionError),

    #[error("No class found at {requested} on {date} (available: {})", format_available(available))]
    NoMatchingClass {
        requested: String,
        date: String,
        available: Vec<String>,
    },

    #[error("Could not reach {target} in the date picker: {reason}")]
    DateNavigation { target: String, reason: String },

    #[error("Navigation timeout: {0}")]
    NavigationTimeout(String),

    #[error("Browser launch failed: {0}")]
    LaunchFailure(String),

    #[error("Backend error: {0}")]
    Backend(BackendError),
}

fn format_available(available: &[String]) -> String {
    if available.is_empty() {
        "none".to_string()
    } else {
        available.join(", ")
    }
}

impl From<BackendError> for WorkflowError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::NavigationTimeout { .. } => {
                WorkflowError::NavigationTimeout(err.to_string())
            }
            BackendError::Launch(msg) => WorkflowError::LaunchFailure(msg),
            other => WorkflowError::Backend(other),
        }
    }
}
