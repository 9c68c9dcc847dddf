// Cache module for in-memory response caching.
// Holds fetched profiles and follow lists so they can be served while offline.

pub mod clock;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use store::{CacheEntry, DEFAULT_ENTRY_LIFETIME, ExpiringCache};
