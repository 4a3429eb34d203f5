use serde_json::Value;

use crate::contract::JOB_EVENT_KEY;

pub const HIDDEN_VALUE: &str = "__HIDDEN__";

const CREDENTIAL_FIELDS: [&str; 3] = ["accessKeyId", "secretAccessKey", "sessionToken"];

/// Returns a copy of the job event that is safe to log. The input is left
/// untouched so downstream calls still see the real credentials.
pub fn redact_event(event: &Value) -> Value {
    let mut redacted = event.clone();

    let credentials = redacted
        .get_mut(JOB_EVENT_KEY)
        .and_then(|job| job.get_mut("data"))
        .and_then(|data| data.get_mut("artifactCredentials"))
        .and_then(Value::as_object_mut);

    if let Some(credentials) = credentials {
        for field in CREDENTIAL_FIELDS {
            credentials.insert(field.to_string(), Value::from(HIDDEN_VALUE));
        }
    }

    redacted
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn event_with_credentials() -> Value {
        json!({
            "CodePipeline.job": {
                "id": "sample-codepipeline-job-id",
                "data": {
                    "inputArtifacts": [],
                    "artifactCredentials": {
                        "secretAccessKey": "sample-secret-access-key",
                        "sessionToken": "sample-session-token",
                        "accessKeyId": "sample-access-key-id"
                    }
                }
            }
        })
    }

    #[test]
    fn replaces_all_three_credential_fields() {
        let redacted = redact_event(&event_with_credentials());
        let credentials = &redacted["CodePipeline.job"]["data"]["artifactCredentials"];

        assert_eq!(credentials["accessKeyId"], HIDDEN_VALUE);
        assert_eq!(credentials["secretAccessKey"], HIDDEN_VALUE);
        assert_eq!(credentials["sessionToken"], HIDDEN_VALUE);
        assert_eq!(redacted["CodePipeline.job"]["id"], "sample-codepipeline-job-id");
    }

    #[test]
    fn leaves_original_event_untouched() {
        let event = event_with_credentials();
        let snapshot = event.clone();

        let _ = redact_event(&event);

        assert_eq!(event, snapshot);
        assert_eq!(
            event["CodePipeline.job"]["data"]["artifactCredentials"]["sessionToken"],
            "sample-session-token"
        );
    }

    #[test]
    fn hides_fields_missing_from_partial_credentials() {
        let event = json!({
            "CodePipeline.job": {
                "id": "job",
                "data": {"artifactCredentials": {"accessKeyId": "only-key"}}
            }
        });

        let redacted = redact_event(&event);
        let rendered = redacted.to_string();
        assert!(!rendered.contains("only-key"));
        assert_eq!(
            redacted["CodePipeline.job"]["data"]["artifactCredentials"]["sessionToken"],
            HIDDEN_VALUE
        );
    }

    #[test]
    fn events_without_credentials_pass_through() {
        let event = json!({"CodePipeline.job": {"id": "job"}});
        assert_eq!(redact_event(&event), event);
    }
}
