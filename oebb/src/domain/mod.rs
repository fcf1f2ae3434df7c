//! Domain types for the ÖBB client.
//!
//! This module contains validated value types shared by the HTTP client,
//! the paginator and the terminal output. Raw API payloads are converted
//! into these types in `crate::oebb`, so timestamps here are always parsed.

mod connection;
mod credentials;
mod page;
mod station;
mod time;

pub use connection::{Category, ConnectionRecord, Section, Stop};
pub use credentials::CredentialBundle;
pub use page::{MAX_PAGE_SIZE, PageRequest};
pub use station::StationRef;
pub use time::{ApiTime, TimeError};
