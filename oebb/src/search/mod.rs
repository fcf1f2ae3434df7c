//! Connection search.
//!
//! This module implements pagination over the timetable endpoint: it keeps
//! requesting capped pages, drops connections it has already seen, and
//! slides a departure-time cursor forward until the requested number of
//! connections has been collected.

mod config;
mod paginator;


pub use config::SearchConfig;
pub use paginator::{PageOutcome, PageSource, Paginator, SearchError, SearchState};
