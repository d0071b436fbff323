//! Durable in-process dispatch: a FIFO work queue feeding a fixed pool of
//! per-resource worker slots, with load-aware routing and idempotent
//! admission.
//!
//! The flow is: inbound item -> [`Deduplicator`] -> [`Dispatcher`] picks the
//! least-loaded resource -> [`WorkQueue`] -> a [`worker::WorkerPool`] worker
//! bound to a resource dequeues, takes a capacity slot, runs the external
//! collaborators and releases the slot.
//!
//! Everything that talks to the outside world sits behind the three traits
//! in [`collaborators`]; the dispatch machinery itself owns no I/O.

pub mod collaborators;
pub mod config;
pub mod dedup;
pub mod dispatcher;
pub mod error;
pub mod pool;
pub mod queue;
pub mod worker;

pub use collaborators::{MediaFetcher, Notifier, Transcriber};
pub use config::Config;
pub use dedup::Deduplicator;
pub use dispatcher::{Admission, Dispatcher};
pub use error::{DeliveryError, DispatchError, MediaError, ProcessingError, TaskFailure};
pub use pool::{ResourceId, ResourcePool, ResourceSpec, SlotGuard};
pub use queue::{Task, WorkQueue};
pub use worker::{TaskOutcome, TaskStatus, WorkerPool};
