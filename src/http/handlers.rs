use super::state::AppState;
use crate::transcription::messages::{
    AUDIO_FIELD, BROWSER_PREVIEW, BROWSER_PREVIEW_FIELD, DEFAULT_USER_ID, INPUT_METHOD_FIELD,
    INPUT_METHOD_VOICE, TIMESTAMP_FIELD, TRANSCRIPT_FIELD, USER_ID_FIELD,
};
use crate::transcription::ProcessResponse;
use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Serialize;
use serde_json::json;
use std::time::Instant;
use tracing::{error, info};

// ============================================================================
// Request/Response Types
// ============================================================================

/// Fields of a hand-off form, with the service's defaults applied
#[derive(Debug)]
struct ProcessForm {
    browser_transcript: Option<String>,
    user_id: String,
    timestamp: Option<String>,
    input_method: String,
    browser_preview: String,
    audio: Option<Vec<u8>>,
}

impl Default for ProcessForm {
    fn default() -> Self {
        Self {
            browser_transcript: None,
            user_id: DEFAULT_USER_ID.to_string(),
            timestamp: None,
            input_method: INPUT_METHOD_VOICE.to_string(),
            browser_preview: BROWSER_PREVIEW.to_string(),
            audio: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub request_id: String,
}

fn error_response(status: StatusCode, error: String, request_id: String) -> axum::response::Response {
    (
        status,
        Json(ErrorResponse {
            success: false,
            error,
            request_id,
        }),
    )
        .into_response()
}

async fn read_form(multipart: &mut Multipart) -> Result<ProcessForm, String> {
    let mut form = ProcessForm::default();

    while let Some(field) = multipart.next_field().await.map_err(|e| e.to_string())? {
        let name = field.name().unwrap_or_default().to_string();

        if name == AUDIO_FIELD {
            let bytes = field.bytes().await.map_err(|e| e.to_string())?;
            form.audio = Some(bytes.to_vec());
            continue;
        }

        let value = field.text().await.map_err(|e| e.to_string())?;
        match name.as_str() {
            TRANSCRIPT_FIELD => form.browser_transcript = Some(value),
            USER_ID_FIELD => form.user_id = value,
            TIMESTAMP_FIELD => form.timestamp = Some(value),
            INPUT_METHOD_FIELD => form.input_method = value,
            BROWSER_PREVIEW_FIELD => form.browser_preview = value,
            _ => info!("Ignoring unknown form field: {}", name),
        }
    }

    Ok(form)
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/process
/// Accept a final transcript plus optional audio
pub async fn process_voice_input(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let request_id = uuid::Uuid::new_v4().to_string();
    let started = Instant::now();

    let form = match read_form(&mut multipart).await {
        Ok(form) => form,
        Err(e) => {
            error!("Request {}: invalid form: {}", request_id, e);
            return error_response(StatusCode::BAD_REQUEST, format!("Invalid form: {}", e), request_id);
        }
    };

    let Some(transcript) = form.browser_transcript else {
        return error_response(
            StatusCode::BAD_REQUEST,
            format!("{} is required", TRANSCRIPT_FIELD),
            request_id,
        );
    };

    let served = state.record_request();
    let audio_bytes = form.audio.as_ref().map(Vec::len).unwrap_or(0);
    info!(
        "Request {}: transcript from user {} ({} audio bytes, #{})",
        request_id, form.user_id, audio_bytes, served
    );

    let timestamp = form
        .timestamp
        .unwrap_or_else(|| chrono::Utc::now().to_rfc3339());

    let response = ProcessResponse {
        success: true,
        result: json!({
            "user_id": form.user_id,
            "timestamp": timestamp,
            "input_method": form.input_method,
            "browser_preview": form.browser_preview.eq_ignore_ascii_case("true"),
        }),
        transcribed_text: transcript,
        audio_bytes,
        processing_time_ms: started.elapsed().as_millis() as u64,
        request_id,
    };

    (StatusCode::OK, Json(response)).into_response()
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
