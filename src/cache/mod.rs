//! Client-side resource cache.
//!
//! This module knows nothing about the backend. It provides:
//! - [`CacheEntry`] and its reducer (fetching / stale / data / error)
//! - [`StalenessPolicy`] deciding when an access must refetch
//! - [`KeyedStore`] for resources parameterized by a composite key
//! - [`EntityStore`] for entity lists that are also mutated

mod entities;
mod entry;
mod policy;
mod store;
mod traits;

pub use entities::{EntityStore, ModifyEvent, ModifyState};
pub use entry::{CacheEntry, CacheEvent};
pub use policy::{default_ttl, should_fetch, StalenessPolicy, TTL_MILLIS};
pub use store::KeyedStore;
pub use traits::{Clock, ManualClock, SystemClock};
