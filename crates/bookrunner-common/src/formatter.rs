use crate::report::{RunState, StepOutcome, WorkflowReport};
use crate::request::BookingResponse;

/// Field names whose values are never written to logs or terminal output.
const DEFAULT_SENSITIVE_FIELDS: &[&str] = &[
    "password",
    "secret",
    "token",
    "cvv",
    "card_number",
    "credit_card",
];

pub fn format_report(report: &WorkflowReport) -> String {
    let mut output = String::new();
    for (i, step) in report.steps().iter().enumerate() {
        let mark = match step.outcome {
            StepOutcome::Succeeded => "ok",
            StepOutcome::Failed => "FAILED",
        };
        output.push_str(&format!(
            "{:>2}. {:<28} {:>6}ms  {}",
            i + 1,
            step.label,
            step.duration_ms,
            mark
        ));
        if let Some(err) = &step.error {
            output.push_str(&format!("\n    {}", err));
        }
        output.push('\n');
    }

    let state = match report.state() {
        RunState::Completed => "completed",
        RunState::Aborted => "aborted",
        RunState::Running => "running",
    };
    output.push_str(&format!(
        "# {} ({} steps, {}ms)",
        state,
        report.steps().len(),
        report.total_ms()
    ));
    output
}

pub fn format_response(resp: &BookingResponse) -> String {
    let mut output = if resp.ok {
        format!("ok {}", resp.message.as_deref().unwrap_or("booked"))
    } else {
        format!("Error: {}", resp.error.as_deref().unwrap_or("unknown failure"))
    };
    if !resp.screenshots.is_empty() {
        let names: Vec<&str> = resp.screenshots.iter().map(|s| s.name.as_str()).collect();
        output.push_str(&format!("\n# screenshots: {}", names.join(", ")));
    }
    output
}

pub fn mask_sensitive(value: &str, field_name: &str, sensitive_fields: &[String]) -> String {
    let lower_field = field_name.to_lowercase();

    let is_sensitive = sensitive_fields
        .iter()
        .any(|f| lower_field.contains(&f.to_lowercase()))
        || DEFAULT_SENSITIVE_FIELDS
            .iter()
            .any(|f| lower_field.contains(*f));

    if is_sensitive {
        "••••••••".to_string()
    } else {
        value.to_string()
    }
}
