use sar_publish_core::contract::PublishSummary;
use sar_publish_core::error::PublishError;

/// API limit for `executionDetails.summary` on PutJobSuccessResult.
pub const MAX_SUCCESS_SUMMARY_CHARS: usize = 2048;
/// API limit for `failureDetails.message` on PutJobFailureResult.
pub const MAX_FAILURE_MESSAGE_CHARS: usize = 5000;

pub trait JobStatusReporter {
    fn report_success(&self, job_id: &str, summary: &PublishSummary) -> Result<(), String>;
    fn report_failure(&self, job_id: &str, error: &PublishError) -> Result<(), String>;
}

/// The summary as JSON, or a short `application_id`/`actions` line when the
/// JSON does not fit the API limit.
pub fn success_summary_text(summary: &PublishSummary) -> String {
    match serde_json::to_string(summary) {
        Ok(text) if text.chars().count() <= MAX_SUCCESS_SUMMARY_CHARS => text,
        _ => truncate_chars(&short_summary(summary), MAX_SUCCESS_SUMMARY_CHARS),
    }
}

fn short_summary(summary: &PublishSummary) -> String {
    let actions: Vec<&str> = summary.actions.iter().map(|action| action.as_str()).collect();
    format!(
        "application_id={} actions={}",
        summary.application_id,
        actions.join(",")
    )
}

pub fn failure_message(error: &PublishError) -> String {
    truncate_chars(&error.to_string(), MAX_FAILURE_MESSAGE_CHARS)
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => text[..byte_index].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use sar_publish_core::contract::PublishAction;

    use super::*;

    #[test]
    fn summary_text_is_the_summary_json() {
        let summary = PublishSummary {
            application_id: "sample-application-id".to_string(),
            actions: vec![PublishAction::UpdateApplication],
            details: serde_json::Map::new(),
        };

        let text = success_summary_text(&summary);
        let parsed: serde_json::Value = serde_json::from_str(&text).expect("summary is json");
        assert_eq!(parsed["actions"][0], "UPDATE_APPLICATION");
    }

    #[test]
    fn oversized_summary_falls_back_to_short_line() {
        let mut details = serde_json::Map::new();
        details.insert(
            "ReadmeUrl".to_string(),
            serde_json::Value::from("x".repeat(MAX_SUCCESS_SUMMARY_CHARS)),
        );
        let summary = PublishSummary {
            application_id: "sample-application-id".to_string(),
            actions: vec![
                PublishAction::UpdateApplication,
                PublishAction::CreateApplicationVersion,
            ],
            details,
        };

        let text = success_summary_text(&summary);
        assert_eq!(
            text,
            "application_id=sample-application-id actions=UPDATE_APPLICATION,CREATE_APPLICATION_VERSION"
        );
    }

    #[test]
    fn failure_message_respects_api_limit_on_char_boundaries() {
        let error = PublishError::PublishRejected {
            code: None,
            message: "é".repeat(MAX_FAILURE_MESSAGE_CHARS + 10),
        };

        let message = failure_message(&error);
        assert_eq!(message.chars().count(), MAX_FAILURE_MESSAGE_CHARS);
    }

    #[test]
    fn short_text_is_kept_whole() {
        assert_eq!(truncate_chars("Access Denied", 2048), "Access Denied");
    }
}
