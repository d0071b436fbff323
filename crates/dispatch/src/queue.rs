use crate::pool::ResourceId;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};

/// One admitted unit of work. Immutable after creation; owned exclusively
/// by the single worker that dequeues it.
#[derive(Clone, Debug)]
pub struct Task {
	pub item_id: String,
	pub destination: String,
	/// Advisory pick made at admission time. The enforcing acquire happens
	/// in the worker, so this may be stale by the time the task runs.
	pub assigned_resource: ResourceId,
}

impl Task {
	#[must_use]
	pub fn new(item_id: impl Into<String>, destination: impl Into<String>, assigned_resource: ResourceId) -> Self {
		Self {
			item_id: item_id.into(),
			destination: destination.into(),
			assigned_resource,
		}
	}
}

/// Unbounded FIFO buffer decoupling admission from execution.
///
/// Many producers, many consumers: the receiver sits behind an async mutex
/// so each dequeued task goes to exactly one worker, in enqueue order.
#[derive(Clone)]
pub struct WorkQueue {
	inner: Arc<Inner>,
}

struct Inner {
	tx: mpsc::UnboundedSender<Task>,
	rx: Mutex<mpsc::UnboundedReceiver<Task>>,
	depth: AtomicUsize,
}

impl Default for WorkQueue {
	fn default() -> Self {
		Self::new()
	}
}

impl WorkQueue {
	#[must_use]
	pub fn new() -> Self {
		let (tx, rx) = mpsc::unbounded_channel();
		Self {
			inner: Arc::new(Inner {
				tx,
				rx: Mutex::new(rx),
				depth: AtomicUsize::new(0),
			}),
		}
	}

	/// Appends to the tail. Never blocks; the queue is logically unbounded
	/// and offers no backpressure to the admission side.
	pub fn enqueue(&self, task: Task) {
		self.inner.depth.fetch_add(1, Ordering::Relaxed);
		if self.inner.tx.send(task).is_err() {
			// Only possible mid-shutdown once all consumers are gone
			self.inner.depth.fetch_sub(1, Ordering::Relaxed);
			tracing::error!("work queue closed, task dropped");
		}
	}

	/// Removes and returns the head task, suspending until one is available.
	/// `None` means the queue was closed.
	pub async fn dequeue(&self) -> Option<Task> {
		let mut rx = self.inner.rx.lock().await;
		let task = rx.recv().await;
		if task.is_some() {
			self.inner.depth.fetch_sub(1, Ordering::Relaxed);
		}
		task
	}

	/// Instantaneous pending count. Observability only.
	#[must_use]
	pub fn size(&self) -> usize {
		self.inner.depth.load(Ordering::Relaxed)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::HashSet;
	use std::time::Duration;

	fn resource_zero() -> ResourceId {
		use crate::pool::{ResourcePool, ResourceSpec};
		ResourcePool::new(&[ResourceSpec { name: "cuda:0".into(), capacity: 1 }]).ids().next().unwrap()
	}

	#[tokio::test]
	async fn test_fifo_order() {
		let queue = WorkQueue::new();
		let r0 = resource_zero();

		for i in 0..5 {
			queue.enqueue(Task::new(format!("M{i}"), "541155613212", r0));
		}
		assert_eq!(queue.size(), 5);

		for i in 0..5 {
			let task = queue.dequeue().await.unwrap();
			assert_eq!(task.item_id, format!("M{i}"));
		}
		assert_eq!(queue.size(), 0);
	}

	#[tokio::test]
	async fn test_every_task_delivered_exactly_once_across_consumers() {
		let queue = WorkQueue::new();
		let r0 = resource_zero();
		let total = 100;

		for i in 0..total {
			queue.enqueue(Task::new(format!("M{i}"), "541155613212", r0));
		}

		let seen = Arc::new(Mutex::new(HashSet::new()));
		let mut consumers = Vec::new();
		for _ in 0..4 {
			let queue = queue.clone();
			let seen = Arc::clone(&seen);
			consumers.push(tokio::spawn(async move {
				loop {
					let next = tokio::time::timeout(Duration::from_millis(100), queue.dequeue()).await;
					match next {
						Ok(Some(task)) => {
							assert!(seen.lock().await.insert(task.item_id), "duplicate delivery");
						}
						_ => break,
					}
				}
			}));
		}

		for consumer in consumers {
			consumer.await.unwrap();
		}
		assert_eq!(seen.lock().await.len(), total);
	}
}
