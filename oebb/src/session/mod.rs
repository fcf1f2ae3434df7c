//! Session management.
//!
//! The ticket API hands out anonymous, short-lived sessions. A [`Session`]
//! owns the current [`CredentialBundle`](crate::domain::CredentialBundle),
//! persists it through a [`CredentialCache`] so later runs can skip the
//! authentication round trip, and re-authenticates once when a call reports
//! that the session has expired.

mod cache;
mod provider;

pub use cache::{CacheError, CredentialCache};
pub use provider::{Session, SessionExpiry, SessionProvider};
