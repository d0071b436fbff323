use dispatch::{Dispatcher, Notifier};
use prometheus::Registry;
use std::collections::HashSet;
use std::sync::Arc;

/// Shared handles for the webhook handlers.
#[derive(Clone)]
pub struct AppState {
	pub verify_token: Arc<String>,
	pub allowed_numbers: Arc<HashSet<String>>,
	pub dispatcher: Arc<Dispatcher>,
	pub notifier: Arc<dyn Notifier>,
	pub registry: Registry,
}
