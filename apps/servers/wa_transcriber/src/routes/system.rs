use crate::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use prometheus::{Encoder, TextEncoder};

pub async fn health() -> &'static str {
	"ok"
}

/// Prometheus text exposition of the dispatch metrics.
pub async fn metrics(State(state): State<AppState>) -> Result<String, StatusCode> {
	let encoder = TextEncoder::new();
	let mut buffer = Vec::new();
	encoder.encode(&state.registry.gather(), &mut buffer).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
	String::from_utf8(buffer).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}
