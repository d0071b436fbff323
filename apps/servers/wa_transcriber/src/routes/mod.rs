pub mod system;
pub mod webhook;

use crate::state::AppState;
use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/webhook", get(webhook::verify).post(webhook::receive))
		.route("/health", get(system::health))
		.route("/metrics", get(system::metrics))
		// Enables logging. Use `RUST_LOG=tower_http=debug`
		.layer(TraceLayer::new_for_http())
		.with_state(state)
}
