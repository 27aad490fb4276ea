use bookrunner_engine::formatter::{format_report, format_response};
use bookrunner_engine::report::WorkflowReport;
use bookrunner_engine::request::BookingResponse;

/// Step table followed by the one-line outcome.
pub fn pretty(response: &BookingResponse) -> String {
    if response.steps.is_empty() {
        return format_response(response);
    }
    let mut report = WorkflowReport::new();
    for step in &response.steps {
        report.push(step.clone());
    }
    report.complete();
    format!("{}\n{}", format_report(&report), format_response(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookrunner_engine::report::{StepOutcome, StepResult};

    #[test]
    fn pretty_output_lists_steps_before_outcome() {
        let mut response = BookingResponse::success("Booking confirmed (booked)");
        response.steps.push(StepResult {
            label: "open login page".into(),
            duration_ms: 40,
            outcome: StepOutcome::Succeeded,
            error: None,
        });

        let text = pretty(&response);
        assert!(text.starts_with(" 1. open login page"));
        assert!(text.contains("# completed (1 steps, 40ms)"));
        assert!(text.ends_with("ok Booking confirmed (booked)"));
    }

    #[test]
    fn pretty_output_without_steps_is_one_line() {
        let response = BookingResponse::failure("Invalid request: email is required");
        assert_eq!(pretty(&response), "Error: Invalid request: email is required");
    }
}
