use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, Uri};
use axum::response::{IntoResponse, Response};
use axum::Form;
use base64::Engine;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha1::Sha1;

use crate::errors::AppError;
use crate::handlers::twiml;
use crate::models::{CallSession, DialogueStep, StateId};
use crate::services::dialogue::{self, TurnInput};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct IncomingCallForm {
    #[serde(rename = "CallSid")]
    pub call_sid: Option<String>,
    #[serde(rename = "From")]
    pub from: Option<String>,
    #[serde(rename = "To")]
    pub to: Option<String>,
}

#[derive(Deserialize)]
pub struct VoiceTurnForm {
    #[serde(rename = "CallSid")]
    pub call_sid: Option<String>,
    #[serde(rename = "From")]
    pub from: Option<String>,
    #[serde(rename = "To")]
    pub to: Option<String>,
    #[serde(rename = "SpeechResult")]
    pub speech_result: Option<String>,
    #[serde(rename = "Digits")]
    pub digits: Option<String>,
}

#[derive(Deserialize)]
pub struct TurnQuery {
    pub state: String,
    pub session: String,
}

fn validate_twilio_signature(
    auth_token: &str,
    signature: &str,
    url: &str,
    params: &[(&str, &str)],
) -> bool {
    // Data to sign: full URL + params concatenated in sorted key order
    let mut data = url.to_string();
    let mut sorted_params = params.to_vec();
    sorted_params.sort_by(|a, b| a.0.cmp(b.0));
    for (key, value) in &sorted_params {
        data.push_str(key);
        data.push_str(value);
    }

    let mut mac = match Hmac::<Sha1>::new_from_slice(auth_token.as_bytes()) {
        Ok(m) => m,
        Err(_) => return false,
    };
    mac.update(data.as_bytes());
    let result = mac.finalize().into_bytes();
    let expected = base64::engine::general_purpose::STANDARD.encode(result);

    expected == signature
}

/// Reconstruct the webhook URL Twilio signed — honor X-Forwarded-Proto/Host
/// when behind a proxy, and keep the query string, which is part of the
/// signed URL.
fn request_url(headers: &HeaderMap, uri: &Uri) -> String {
    let proto = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("https");
    let host = headers
        .get("x-forwarded-host")
        .or_else(|| headers.get("host"))
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");
    let path_and_query = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| uri.path());
    format!("{proto}://{host}{path_and_query}")
}

fn check_signature(
    state: &AppState,
    headers: &HeaderMap,
    uri: &Uri,
    params: &[(&str, &str)],
) -> Result<(), AppError> {
    // Skip if auth token is empty — dev mode
    if state.config.twilio_auth_token.is_empty() {
        return Ok(());
    }

    let signature = headers
        .get("x-twilio-signature")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    if signature.is_empty() {
        tracing::warn!("missing X-Twilio-Signature header");
        return Err(AppError::InvalidSignature);
    }

    let url = request_url(headers, uri);
    if !validate_twilio_signature(&state.config.twilio_auth_token, signature, &url, params) {
        tracing::warn!("invalid Twilio signature");
        return Err(AppError::InvalidSignature);
    }
    Ok(())
}

pub async fn incoming_call(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    uri: Uri,
    Form(form): Form<IncomingCallForm>,
) -> Result<Response, AppError> {
    let mut params: Vec<(&str, &str)> = Vec::new();
    if let Some(v) = &form.call_sid {
        params.push(("CallSid", v));
    }
    if let Some(v) = &form.from {
        params.push(("From", v));
    }
    if let Some(v) = &form.to {
        params.push(("To", v));
    }
    check_signature(&state, &headers, &uri, &params)?;

    tracing::info!(
        call_sid = form.call_sid.as_deref().unwrap_or(""),
        from = form.from.as_deref().unwrap_or(""),
        "incoming call"
    );

    let step = dialogue::greeting_step(&state.config);
    Ok(twiml_response(&twiml::render(&step, &state.config.voice)))
}

pub async fn voice_turn(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    uri: Uri,
    Query(query): Query<TurnQuery>,
    Form(form): Form<VoiceTurnForm>,
) -> Result<Response, AppError> {
    let mut params: Vec<(&str, &str)> = Vec::new();
    if let Some(v) = &form.call_sid {
        params.push(("CallSid", v));
    }
    if let Some(v) = &form.from {
        params.push(("From", v));
    }
    if let Some(v) = &form.to {
        params.push(("To", v));
    }
    if let Some(v) = &form.speech_result {
        params.push(("SpeechResult", v));
    }
    if let Some(v) = &form.digits {
        params.push(("Digits", v));
    }
    check_signature(&state, &headers, &uri, &params)?;

    let state_id = StateId::parse(&query.state)
        .ok_or_else(|| AppError::BadRequest(format!("unknown state '{}'", query.state)))?;

    // A corrupt token means the caller is still on the line but their
    // context is gone. Escalate instead of failing the request.
    let session = match CallSession::decode_token(&query.session) {
        Ok(session) => session,
        Err(e) => {
            tracing::warn!(error = %e, "undecodable session token, transferring");
            let step = DialogueStep::terminal_transfer(
                vec!["Transferring you to a pharmacist. Please hold.".to_string()],
                CallSession::default(),
                &state.config.pharmacy.transfer_number,
            );
            return Ok(twiml_response(&twiml::render(&step, &state.config.voice)));
        }
    };

    tracing::info!(
        call_sid = form.call_sid.as_deref().unwrap_or(""),
        state = state_id.as_str(),
        speech = form.speech_result.as_deref().unwrap_or(""),
        digits = form.digits.as_deref().unwrap_or(""),
        "voice turn"
    );

    let input = TurnInput {
        free_text: form.speech_result.as_deref(),
        keypress: form.digits.as_deref(),
    };
    let step = dialogue::handle_turn(
        &state.config,
        state.ai.as_ref(),
        state.records.as_ref(),
        state_id,
        session,
        input,
    )
    .await;

    Ok(twiml_response(&twiml::render(&step, &state.config.voice)))
}

fn twiml_response(body: &str) -> Response {
    (
        [(header::CONTENT_TYPE, "text/xml")],
        body.to_string(),
    )
        .into_response()
}
