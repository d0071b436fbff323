use crate::phone::normalize_sender;
use crate::state::AppState;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use dispatch::Notifier;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, warn};

pub const REJECTION_NOTICE: &str = "Service not available for this number.";
pub const NON_AUDIO_REPLY: &str = "Sorry, this service is only to transcribe audio messages. Please try sending a voice note.";

/// Inbound handshake token did not match the shared secret.
#[derive(Debug, thiserror::Error)]
#[error("webhook verification failed: token mismatch")]
pub struct VerificationError;

impl IntoResponse for VerificationError {
	fn into_response(self) -> Response {
		(StatusCode::FORBIDDEN, "Verification token mismatch").into_response()
	}
}

#[derive(Deserialize)]
pub struct VerifyParams {
	#[serde(rename = "hub.mode")]
	mode: Option<String>,
	#[serde(rename = "hub.challenge")]
	challenge: Option<String>,
	#[serde(rename = "hub.verify_token")]
	verify_token: Option<String>,
}

/// Challenge/response handshake the platform performs when the webhook is
/// registered. Echoes the challenge back on a token match.
pub async fn verify(State(state): State<AppState>, Query(params): Query<VerifyParams>) -> Result<String, VerificationError> {
	let subscribe = params.mode.as_deref() == Some("subscribe");
	let token_matches = params.verify_token.as_deref() == Some(state.verify_token.as_str());

	if subscribe && token_matches {
		Ok(params.challenge.unwrap_or_default())
	} else {
		warn!(mode = ?params.mode, "webhook verification failed");
		Err(VerificationError)
	}
}

#[derive(Deserialize, Default)]
pub struct WebhookPayload {
	#[serde(default)]
	entry: Vec<Entry>,
}

#[derive(Deserialize, Default)]
struct Entry {
	#[serde(default)]
	changes: Vec<Change>,
}

#[derive(Deserialize, Default)]
struct Change {
	#[serde(default)]
	value: ChangeValue,
}

#[derive(Deserialize, Default)]
struct ChangeValue {
	#[serde(default)]
	messages: Vec<Message>,
}

#[derive(Deserialize)]
struct Message {
	#[serde(rename = "type", default)]
	kind: String,
	#[serde(default)]
	from: String,
	audio: Option<AudioContent>,
}

#[derive(Deserialize)]
struct AudioContent {
	id: Option<String>,
}

/// Event-delivery endpoint. Admission-side work only: nothing here blocks
/// on media, transcription or replies, so the response is immediate.
pub async fn receive(State(state): State<AppState>, Json(payload): Json<WebhookPayload>) -> Json<Value> {
	for entry in payload.entry {
		for change in entry.changes {
			for message in change.value.messages {
				handle_message(&state, &message);
			}
		}
	}
	Json(json!({ "status": "success" }))
}

fn handle_message(state: &AppState, message: &Message) {
	let sender = normalize_sender(&message.from);
	info!(sender = %sender, kind = %message.kind, "message received");

	if !state.allowed_numbers.contains(&sender) {
		reply_in_background(Arc::clone(&state.notifier), sender, REJECTION_NOTICE);
		return;
	}

	if message.kind == "audio" {
		if let Some(media_id) = message.audio.as_ref().and_then(|a| a.id.as_deref()) {
			// Duplicate ids (webhook retries) are dropped by the dispatcher
			let _ = state.dispatcher.admit(media_id, &sender);
		}
	} else {
		reply_in_background(Arc::clone(&state.notifier), sender, NON_AUDIO_REPLY);
	}
}

fn reply_in_background(notifier: Arc<dyn Notifier>, to: String, body: &'static str) {
	tokio::spawn(async move {
		if let Err(e) = notifier.notify(&to, body).await {
			warn!(to = %to, error = %e, "reply delivery failed");
		}
	});
}
