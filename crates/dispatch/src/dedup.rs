use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

/// Tracks item ids already admitted so webhook retries cannot enqueue the
/// same work twice.
///
/// The set grows for the process lifetime; there is no eviction. Membership
/// test and insert happen under one lock, so of two concurrent admissions
/// for the same id exactly one wins.
#[derive(Default)]
pub struct Deduplicator {
	seen: Mutex<HashSet<String>>,
}

impl Deduplicator {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns true when this call inserted the id, i.e. the id was never
	/// seen before. False means a duplicate.
	pub fn admit(&self, item_id: &str) -> bool {
		let mut seen = self.seen.lock().unwrap_or_else(PoisonError::into_inner);
		seen.insert(item_id.to_owned())
	}

	/// Number of ids remembered. Observability only.
	#[must_use]
	pub fn len(&self) -> usize {
		self.seen.lock().unwrap_or_else(PoisonError::into_inner).len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}
