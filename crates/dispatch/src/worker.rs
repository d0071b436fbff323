use crate::collaborators::{MediaFetcher, Notifier, Transcriber};
use crate::config::Config;
use crate::error::{DispatchError, TaskFailure};
use crate::pool::{ResourceId, ResourcePool};
use crate::queue::{Task, WorkQueue};
use prometheus::{Counter, Gauge, Registry};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::time::sleep;
use tracing::{info, warn};

/// Terminal state of one task, reported by the worker that ran it.
#[derive(Debug)]
pub enum TaskStatus {
	Completed,
	Failed(TaskFailure),
	TimedOut,
}

#[derive(Debug)]
pub struct TaskOutcome {
	pub item_id: String,
	pub resource: ResourceId,
	pub status: TaskStatus,
	pub execution_time: Duration,
}

/// Fixed set of workers, N per resource, all pulling from one FIFO queue.
///
/// A worker is bound to its resource at startup. It takes the globally-next
/// task, waits for a slot on its own resource, runs fetch -> transcribe ->
/// reply under a timeout, and reports the outcome. The slot is held by a
/// guard, so it is returned on every exit path. Failures terminate the task,
/// never the worker.
pub struct WorkerPool {
	config: Config,
	pool: Arc<ResourcePool>,
	queue: WorkQueue,
	fetcher: Arc<dyn MediaFetcher>,
	transcriber: Arc<dyn Transcriber>,
	notifier: Arc<dyn Notifier>,
	tasks_processed: Counter,
	task_errors: Counter,
	queue_depth: Gauge,
	active_workers: Gauge,
}

impl WorkerPool {
	pub fn new(
		config: Config,
		pool: Arc<ResourcePool>,
		queue: WorkQueue,
		fetcher: Arc<dyn MediaFetcher>,
		transcriber: Arc<dyn Transcriber>,
		notifier: Arc<dyn Notifier>,
		registry: &Registry,
	) -> Result<Self, DispatchError> {
		let tasks_processed = Counter::new("dispatch_tasks_processed", "Total tasks that reached a terminal state")?;
		let task_errors = Counter::new("dispatch_task_errors", "Total tasks that failed or timed out")?;
		let queue_depth = Gauge::new("dispatch_queue_depth", "Tasks currently waiting in the work queue")?;
		let active_workers = Gauge::new("dispatch_active_workers", "Number of spawned workers")?;

		registry.register(Box::new(tasks_processed.clone()))?;
		registry.register(Box::new(task_errors.clone()))?;
		registry.register(Box::new(queue_depth.clone()))?;
		registry.register(Box::new(active_workers.clone()))?;

		Ok(Self {
			config,
			pool,
			queue,
			fetcher,
			transcriber,
			notifier,
			tasks_processed,
			task_errors,
			queue_depth,
			active_workers,
		})
	}

	/// Spawns the workers and then consumes their outcomes until every
	/// worker has exited (i.e. the queue closed).
	pub async fn start(&self) {
		let (tx, mut rx) = mpsc::channel(100);

		let mut worker_id = 0;
		for resource in self.pool.ids() {
			for _ in 0..self.config.workers_per_resource {
				let worker = Worker {
					id: worker_id,
					resource,
					pool: Arc::clone(&self.pool),
					queue: self.queue.clone(),
					fetcher: Arc::clone(&self.fetcher),
					transcriber: Arc::clone(&self.transcriber),
					notifier: Arc::clone(&self.notifier),
					task_timeout: self.config.task_timeout,
				};
				let worker_tx = tx.clone();
				tokio::spawn(async move {
					worker.run(worker_tx).await;
				});
				self.active_workers.inc();
				worker_id += 1;
			}
		}
		drop(tx);

		while let Some(outcome) = rx.recv().await {
			self.handle_outcome(&outcome);
		}
	}

	fn handle_outcome(&self, outcome: &TaskOutcome) {
		self.tasks_processed.inc();
		if !matches!(outcome.status, TaskStatus::Completed) {
			self.task_errors.inc();
		}
		self.queue_depth.set(self.queue.size() as f64);
	}
}

struct Worker {
	id: usize,
	resource: ResourceId,
	pool: Arc<ResourcePool>,
	queue: WorkQueue,
	fetcher: Arc<dyn MediaFetcher>,
	transcriber: Arc<dyn Transcriber>,
	notifier: Arc<dyn Notifier>,
	task_timeout: Duration,
}

impl Worker {
	async fn run(&self, result_tx: mpsc::Sender<TaskOutcome>) {
		info!(worker = self.id, resource = %self.pool.name(self.resource), "worker started");

		while let Some(task) = self.queue.dequeue().await {
			// Slot wait is outside the task timeout: queueing for a busy
			// device is normal, only the work itself is bounded
			let slot = self.pool.acquire(self.resource).await;
			let start = Instant::now();

			let status = tokio::select! {
				() = sleep(self.task_timeout) => TaskStatus::TimedOut,
				result = self.execute(&task) => match result {
					Ok(()) => TaskStatus::Completed,
					Err(e) => TaskStatus::Failed(e),
				}
			};
			drop(slot);

			match &status {
				TaskStatus::Completed => {
					info!(worker = self.id, item_id = %task.item_id, pending = self.queue.size(), "task completed");
				}
				TaskStatus::Failed(e) => {
					// Not retried, not requeued: the task is dropped
					warn!(worker = self.id, item_id = %task.item_id, error = %e, "task failed, dropping");
				}
				TaskStatus::TimedOut => {
					warn!(worker = self.id, item_id = %task.item_id, "task timed out, dropping");
				}
			}

			let outcome = TaskOutcome {
				item_id: task.item_id,
				resource: self.resource,
				status,
				execution_time: start.elapsed(),
			};
			if result_tx.send(outcome).await.is_err() {
				break;
			}
		}

		info!(worker = self.id, "worker exiting, queue closed");
	}

	async fn execute(&self, task: &Task) -> Result<(), TaskFailure> {
		let device = self.pool.name(self.resource);
		let audio = self.fetcher.fetch(&task.item_id).await?;
		let text = self.transcriber.transcribe(&audio, device).await?;
		self.notifier.notify(&task.destination, &text).await?;
		Ok(())
	}
}
