use anyhow::Context;
use clap::Parser;
use dispatch::{Deduplicator, Dispatcher, MediaFetcher, Notifier, ResourcePool, Transcriber, WorkQueue, WorkerPool};
use prometheus::Registry;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use wa_transcriber::transcribe::EngineClient;
use wa_transcriber::whatsapp::WhatsAppClient;
use wa_transcriber::{observability, routes, AppState, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	dotenvy::dotenv().ok();
	observability::init_tracing();

	let config = Config::parse();
	config.validate().map_err(anyhow::Error::msg)?;

	let registry = Registry::new();
	let pool = Arc::new(ResourcePool::new(&config.dispatch.resources));
	let dedup = Arc::new(Deduplicator::new());
	let queue = WorkQueue::new();
	let dispatcher = Arc::new(Dispatcher::new(Arc::clone(&pool), dedup, queue.clone()));

	let whatsapp = Arc::new(WhatsAppClient::new(&config).context("building Graph API client")?);
	let engine = Arc::new(EngineClient::new(&config).context("building transcription engine client")?);

	let fetcher: Arc<dyn MediaFetcher> = Arc::clone(&whatsapp) as Arc<dyn MediaFetcher>;
	let notifier: Arc<dyn Notifier> = Arc::clone(&whatsapp) as Arc<dyn Notifier>;
	let transcriber: Arc<dyn Transcriber> = engine;

	let workers = WorkerPool::new(
		config.dispatch.clone(),
		Arc::clone(&pool),
		queue,
		fetcher,
		transcriber,
		Arc::clone(&notifier),
		&registry,
	)?;
	tokio::spawn(async move { workers.start().await });

	for id in pool.ids() {
		info!(resource = %pool.name(id), capacity = pool.capacity(id), workers = config.dispatch.workers_per_resource, "resource registered");
	}

	let state = AppState {
		verify_token: Arc::new(config.verify_token.clone()),
		allowed_numbers: Arc::new(config.allowed_numbers.iter().cloned().collect::<HashSet<_>>()),
		dispatcher,
		notifier,
		registry,
	};

	let app = routes::router(state);
	let listener = TcpListener::bind(&config.listen_addr).await.context("binding listen address")?;
	info!("listening on {}", listener.local_addr()?);
	axum::serve(listener, app).await?;

	Ok(())
}
