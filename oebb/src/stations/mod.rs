//! Station name resolution.
//!
//! Users type free-text names; the provider's station search returns ranked
//! candidates and the first one is taken. Results can be memoised with
//! [`CachedStationLookup`].

mod cache;
mod lookup;

pub use cache::{CachedStationLookup, StationCacheConfig};
pub use lookup::{LookupError, StationLookup, resolve_station};
