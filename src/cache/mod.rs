//! The override resolution engine.
//!
//! This module:
//! - Stores override records keyed by lowercased pattern name, at most one
//!   record per distinct name (last write wins)
//! - Resolves concrete runtime identities against stored patterns under a
//!   shared read lock
//! - Batches mutations between `begin_update`/`end_update` so a composed
//!   load fires a single change notification
//! - Dispatches change notifications strictly after the write lock is
//!   released, so subscribers may re-enter the cache
//! - Supports one-way disposal that races safely with live readers/writers
//!
//! Record content is completely separate from the subscriber registry; the
//! registry is never touched while the record lock is held.

mod global;
mod override_cache;
mod subscribers;
pub use global::*;
pub use override_cache::*;
pub use subscribers::SubscriptionId;
