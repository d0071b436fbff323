use async_trait::async_trait;
use dispatch::{
	Admission, Config, Deduplicator, DeliveryError, Dispatcher, MediaError, MediaFetcher, Notifier, ProcessingError, ResourcePool, Transcriber, WorkQueue,
	WorkerPool,
};
use prometheus::Registry;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;

struct EchoFetcher;

#[async_trait]
impl MediaFetcher for EchoFetcher {
	async fn fetch(&self, media_id: &str) -> Result<Vec<u8>, MediaError> {
		Ok(media_id.as_bytes().to_vec())
	}
}

struct EchoTranscriber;

#[async_trait]
impl Transcriber for EchoTranscriber {
	async fn transcribe(&self, audio: &[u8], _device: &str) -> Result<String, ProcessingError> {
		// Yield so tasks interleave across workers
		tokio::task::yield_now().await;
		Ok(String::from_utf8_lossy(audio).to_string())
	}
}

struct RecordingNotifier {
	sent_tx: mpsc::UnboundedSender<(String, String)>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
	async fn notify(&self, to: &str, body: &str) -> Result<(), DeliveryError> {
		let _ = self.sent_tx.send((to.to_owned(), body.to_owned()));
		Ok(())
	}
}

fn build_pipeline() -> (Dispatcher, Arc<ResourcePool>, mpsc::UnboundedReceiver<(String, String)>) {
	let config = Config {
		resources: vec![
			dispatch::ResourceSpec {
				name: "cuda:0".into(),
				capacity: 2,
			},
			dispatch::ResourceSpec {
				name: "cuda:1".into(),
				capacity: 2,
			},
		],
		workers_per_resource: 2,
		task_timeout: Duration::from_secs(5),
	};
	let pool = Arc::new(ResourcePool::new(&config.resources));
	let queue = WorkQueue::new();
	let dispatcher = Dispatcher::new(Arc::clone(&pool), Arc::new(Deduplicator::new()), queue.clone());

	let (sent_tx, sent_rx) = mpsc::unbounded_channel();
	let workers = WorkerPool::new(
		config,
		Arc::clone(&pool),
		queue,
		Arc::new(EchoFetcher),
		Arc::new(EchoTranscriber),
		Arc::new(RecordingNotifier { sent_tx }),
		&Registry::new(),
	)
	.unwrap();
	tokio::spawn(async move { workers.start().await });

	(dispatcher, pool, sent_rx)
}

#[tokio::test]
async fn test_every_admitted_item_is_processed_exactly_once() {
	let (dispatcher, pool, mut sent_rx) = build_pipeline();
	let total = 50;

	for i in 0..total {
		assert!(matches!(dispatcher.admit(&format!("M{i}"), "541155613212"), Admission::Enqueued(_)));
	}

	let mut delivered = HashSet::new();
	for _ in 0..total {
		let (_, body) = timeout(Duration::from_secs(5), sent_rx.recv()).await.unwrap().unwrap();
		assert!(delivered.insert(body), "duplicate processing");
	}

	// Nothing extra ever shows up and all slots drain back to zero
	assert!(timeout(Duration::from_millis(100), sent_rx.recv()).await.is_err());
	timeout(Duration::from_secs(2), async {
		while pool.ids().map(|id| pool.current_load(id)).sum::<usize>() != 0 {
			tokio::task::yield_now().await;
		}
	})
	.await
	.unwrap();
}

#[tokio::test]
async fn test_webhook_retry_of_same_item_is_processed_once() {
	let (dispatcher, _pool, mut sent_rx) = build_pipeline();

	assert!(matches!(dispatcher.admit("M1", "541155613212"), Admission::Enqueued(_)));
	assert_eq!(dispatcher.admit("M1", "541155613212"), Admission::Duplicate);

	let (to, body) = timeout(Duration::from_secs(2), sent_rx.recv()).await.unwrap().unwrap();
	assert_eq!(to, "541155613212");
	assert_eq!(body, "M1");
	assert!(timeout(Duration::from_millis(100), sent_rx.recv()).await.is_err());
}
