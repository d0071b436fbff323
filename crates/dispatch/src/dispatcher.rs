use crate::dedup::Deduplicator;
use crate::pool::{ResourceId, ResourcePool};
use crate::queue::{Task, WorkQueue};
use std::sync::Arc;
use tracing::info;

/// Outcome of one admission attempt.
#[derive(Debug, PartialEq, Eq)]
pub enum Admission {
	/// First sighting of this item; a task now sits in the queue.
	Enqueued(ResourceId),
	/// Item id already admitted earlier (webhook retry). Nothing enqueued.
	Duplicate,
}

/// Single entry point from the inbound boundary into the pipeline.
///
/// Admission never blocks and never fails: duplicates are dropped, everything
/// else is routed to the least-loaded resource and enqueued. The routing pick
/// is advisory; the worker's own acquire enforces capacity.
pub struct Dispatcher {
	pool: Arc<ResourcePool>,
	dedup: Arc<Deduplicator>,
	queue: WorkQueue,
}

impl Dispatcher {
	#[must_use]
	pub fn new(pool: Arc<ResourcePool>, dedup: Arc<Deduplicator>, queue: WorkQueue) -> Self {
		Self { pool, dedup, queue }
	}

	/// Least-loaded resource under the current load snapshot, ties broken by
	/// declaration order. Does not reserve anything.
	#[must_use]
	pub fn route(&self) -> ResourceId {
		self.pool.least_loaded()
	}

	pub fn admit(&self, item_id: &str, destination: &str) -> Admission {
		if !self.dedup.admit(item_id) {
			info!(item_id, "duplicate item ignored");
			return Admission::Duplicate;
		}

		let resource = self.route();
		self.queue.enqueue(Task::new(item_id, destination, resource));
		info!(item_id, resource = %self.pool.name(resource), pending = self.queue.size(), "task enqueued");
		Admission::Enqueued(resource)
	}
}
