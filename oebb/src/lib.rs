//! Client for the ÖBB ticket shop's connection search.
//!
//! The crate talks to the undocumented JSON API behind `tickets.oebb.at`:
//! it obtains an anonymous session, resolves station names and pages
//! through the timetable endpoint until the requested number of distinct
//! connections has been collected.

pub mod display;
pub mod domain;
pub mod oebb;
pub mod search;
pub mod session;
pub mod stations;
