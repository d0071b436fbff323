use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global tracing subscriber: env-filtered fmt output,
/// defaulting to info for our crates.
pub fn init_tracing() {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,dispatch=info,wa_transcriber=info"));

	tracing_subscriber::registry().with(filter).with(tracing_subscriber::fmt::layer()).init();
}
