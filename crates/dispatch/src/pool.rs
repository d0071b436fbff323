use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Notify;

/// One accelerator device as declared in config: a name and a fixed
/// ceiling on concurrent occupants.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSpec {
	pub name: String,
	pub capacity: usize,
}

/// Handle to one resource in a [`ResourcePool`]. Indexes the pool's
/// declaration order, which is also the routing tie-break order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ResourceId(usize);

impl ResourceId {
	#[must_use]
	pub fn index(self) -> usize {
		self.0
	}
}

impl fmt::Display for ResourceId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "resource[{}]", self.0)
	}
}

struct Resource {
	name: String,
	capacity: usize,
	load: AtomicUsize,
	slot_freed: Notify,
}

/// Fixed set of exclusive-capacity resources with atomic admission.
///
/// `try_acquire`/`release` are the only mutators of load state and are safe
/// under arbitrary concurrent callers. Load never exceeds capacity: the
/// increment is a CAS that refuses once the ceiling is reached.
pub struct ResourcePool {
	resources: Vec<Resource>,
}

impl ResourcePool {
	/// # Panics
	/// Panics when `specs` is empty; config validation rejects that first.
	#[must_use]
	pub fn new(specs: &[ResourceSpec]) -> Self {
		assert!(!specs.is_empty(), "resource pool requires at least one resource");
		let resources = specs
			.iter()
			.map(|spec| Resource {
				name: spec.name.clone(),
				capacity: spec.capacity,
				load: AtomicUsize::new(0),
				slot_freed: Notify::new(),
			})
			.collect();
		Self { resources }
	}

	pub fn ids(&self) -> impl Iterator<Item = ResourceId> + '_ {
		(0..self.resources.len()).map(ResourceId)
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.resources.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.resources.is_empty()
	}

	#[must_use]
	pub fn name(&self, id: ResourceId) -> &str {
		&self.resources[id.0].name
	}

	#[must_use]
	pub fn capacity(&self, id: ResourceId) -> usize {
		self.resources[id.0].capacity
	}

	#[must_use]
	pub fn current_load(&self, id: ResourceId) -> usize {
		self.resources[id.0].load.load(Ordering::Acquire)
	}

	/// Atomically takes one slot if the resource is below capacity.
	/// Never blocks.
	pub fn try_acquire(&self, id: ResourceId) -> bool {
		let resource = &self.resources[id.0];
		resource
			.load
			.fetch_update(Ordering::AcqRel, Ordering::Acquire, |load| (load < resource.capacity).then_some(load + 1))
			.is_ok()
	}

	/// Returns one slot. Must be paired with a successful `try_acquire`;
	/// [`SlotGuard`] does the pairing on every exit path.
	pub fn release(&self, id: ResourceId) {
		let resource = &self.resources[id.0];
		let previous = resource.load.fetch_sub(1, Ordering::AcqRel);
		debug_assert!(previous > 0, "release without matching acquire");
		resource.slot_freed.notify_one();
	}

	/// Suspends until a slot on `id` is taken, then hands back a guard that
	/// releases it on drop.
	pub async fn acquire(&self, id: ResourceId) -> SlotGuard<'_> {
		let resource = &self.resources[id.0];
		loop {
			if self.try_acquire(id) {
				return SlotGuard { pool: self, id };
			}
			// notify_one stores a permit when nobody waits yet, so a release
			// between the failed try_acquire and this await is not lost
			resource.slot_freed.notified().await;
		}
	}

	/// Advisory routing pick: the resource with the strictly smallest load,
	/// first-declared wins ties. Never blocks, never fails - a fully loaded
	/// pool still yields its least-loaded member.
	#[must_use]
	pub fn least_loaded(&self) -> ResourceId {
		let mut best = ResourceId(0);
		let mut best_load = self.current_load(best);
		for id in self.ids().skip(1) {
			let load = self.current_load(id);
			if load < best_load {
				best = id;
				best_load = load;
			}
		}
		best
	}
}

/// Scoped slot occupancy. Dropping the guard releases the slot, including
/// on error and timeout paths.
pub struct SlotGuard<'a> {
	pool: &'a ResourcePool,
	id: ResourceId,
}

impl SlotGuard<'_> {
	#[must_use]
	pub fn id(&self) -> ResourceId {
		self.id
	}
}

impl Drop for SlotGuard<'_> {
	fn drop(&mut self) {
		self.pool.release(self.id);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::sync::Arc;

	fn two_gpus() -> ResourcePool {
		ResourcePool::new(&[
			ResourceSpec {
				name: "cuda:0".into(),
				capacity: 2,
			},
			ResourceSpec {
				name: "cuda:1".into(),
				capacity: 2,
			},
		])
	}

	#[test]
	fn test_try_acquire_stops_at_capacity() {
		let pool = two_gpus();
		let r0 = pool.ids().next().unwrap();

		assert!(pool.try_acquire(r0));
		assert!(pool.try_acquire(r0));
		assert!(!pool.try_acquire(r0));
		assert_eq!(pool.current_load(r0), 2);

		pool.release(r0);
		assert_eq!(pool.current_load(r0), 1);
		assert!(pool.try_acquire(r0));
	}

	#[tokio::test]
	async fn test_slot_guard_releases_on_drop() {
		let pool = two_gpus();
		let r0 = pool.ids().next().unwrap();

		{
			let guard = pool.acquire(r0).await;
			assert_eq!(guard.id(), r0);
			assert_eq!(pool.current_load(r0), 1);
		}
		assert_eq!(pool.current_load(r0), 0);
	}

	#[tokio::test]
	async fn test_acquire_suspends_until_release() {
		let pool = Arc::new(ResourcePool::new(&[ResourceSpec { name: "cuda:0".into(), capacity: 1 }]));
		let r0 = pool.ids().next().unwrap();

		let held = pool.acquire(r0).await;

		let waiter = {
			let pool = Arc::clone(&pool);
			tokio::spawn(async move {
				let _guard = pool.acquire(r0).await;
			})
		};

		// Waiter cannot get the slot while we hold it
		tokio::time::sleep(std::time::Duration::from_millis(20)).await;
		assert!(!waiter.is_finished());

		drop(held);
		waiter.await.unwrap();
		assert_eq!(pool.current_load(r0), 0);
	}

	#[tokio::test]
	async fn test_load_never_exceeds_capacity_under_contention() {
		let pool = Arc::new(two_gpus());
		let mut handles = Vec::new();

		for i in 0..64 {
			let pool = Arc::clone(&pool);
			handles.push(tokio::spawn(async move {
				let id = pool.ids().nth(i % 2).unwrap();
				let _guard = pool.acquire(id).await;
				for probe in pool.ids() {
					assert!(pool.current_load(probe) <= pool.capacity(probe));
				}
				tokio::task::yield_now().await;
			}));
		}

		for handle in handles {
			handle.await.unwrap();
		}
		for id in pool.ids() {
			assert_eq!(pool.current_load(id), 0);
		}
	}

	#[test]
	fn test_least_loaded_prefers_declaration_order_on_tie() {
		let pool = two_gpus();
		let r0 = pool.ids().next().unwrap();

		assert_eq!(pool.least_loaded(), r0);
	}

	#[test]
	fn test_least_loaded_skips_saturated_resource() {
		let pool = two_gpus();
		let mut ids = pool.ids();
		let r0 = ids.next().unwrap();
		let r1 = ids.next().unwrap();

		assert!(pool.try_acquire(r0));
		assert!(pool.try_acquire(r0));
		assert_eq!(pool.least_loaded(), r1);
	}
}
