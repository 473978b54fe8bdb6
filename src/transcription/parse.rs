use serde_json::Value;

use super::messages::BackendResult;
use crate::error::VoiceError;

/// Interpret a 2xx response body from the transcription service.
///
/// `success: true` yields the body's `payload` field, or the whole body
/// when there is none. Anything else is `RemoteRejected`.
pub fn interpret_body(body: &str) -> BackendResult {
    let Some(mut value) = parse_lenient(body) else {
        return Err(VoiceError::RemoteRejected("malformed response body".to_string()));
    };

    match value.get("success").and_then(Value::as_bool) {
        Some(true) => Ok(match value.get_mut("payload") {
            Some(payload) => payload.take(),
            None => value,
        }),
        Some(false) => {
            let reason = value
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("success=false");
            Err(VoiceError::RemoteRejected(reason.to_string()))
        }
        None => Err(VoiceError::RemoteRejected(
            "response has no success field".to_string(),
        )),
    }
}

/// Parse JSON, tolerating Markdown code fences and surrounding prose
fn parse_lenient(body: &str) -> Option<Value> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(value) = serde_json::from_str(trimmed) {
        return Some(value);
    }

    if let Some(inner) = strip_code_fence(trimmed) {
        if let Ok(value) = serde_json::from_str(inner) {
            return Some(value);
        }
    }

    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&trimmed[start..=end]).ok()
}

fn strip_code_fence(text: &str) -> Option<&str> {
    let open = text.find("```")?;
    let after_open = &text[open + 3..];
    // Skip the info string (```json, ```javascript)
    let body_start = after_open.find('\n').map(|i| i + 1).unwrap_or(0);
    let body = &after_open[body_start..];
    let close = body.rfind("```")?;
    Some(body[..close].trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_with_payload_field() {
        let body = r#"{"success": true, "payload": {"intent": "greet"}}"#;
        assert_eq!(interpret_body(body).unwrap(), json!({"intent": "greet"}));
    }

    #[test]
    fn test_success_without_payload_field_passes_body_through() {
        let body = r#"{"success": true, "result": "ok", "transcribed_text": "hello"}"#;
        let payload = interpret_body(body).unwrap();
        assert_eq!(payload["transcribed_text"], "hello");
        assert_eq!(payload["success"], true);
    }

    #[test]
    fn test_success_false_is_rejected() {
        let body = r#"{"success": false, "error": "processor failed"}"#;
        assert_eq!(
            interpret_body(body),
            Err(VoiceError::RemoteRejected("processor failed".to_string()))
        );
    }

    #[test]
    fn test_missing_success_field_is_rejected() {
        let body = r#"{"result": "ok"}"#;
        assert!(matches!(interpret_body(body), Err(VoiceError::RemoteRejected(_))));
    }

    #[test]
    fn test_non_boolean_success_is_rejected() {
        let body = r#"{"success": "yes"}"#;
        assert!(matches!(interpret_body(body), Err(VoiceError::RemoteRejected(_))));
    }

    #[test]
    fn test_malformed_body_is_rejected() {
        assert!(matches!(
            interpret_body("<html>502 Bad Gateway</html>"),
            Err(VoiceError::RemoteRejected(_))
        ));
        assert!(matches!(interpret_body(""), Err(VoiceError::RemoteRejected(_))));
    }

    #[test]
    fn test_fenced_json_is_accepted() {
        let body = "```json\n{\"success\": true, \"payload\": {\"intent\": \"greet\"}}\n```";
        assert_eq!(interpret_body(body).unwrap(), json!({"intent": "greet"}));
    }

    #[test]
    fn test_json_embedded_in_prose_is_accepted() {
        let body = "Here you go: {\"success\": true, \"payload\": 42} done";
        assert_eq!(interpret_body(body).unwrap(), json!(42));
    }
}
