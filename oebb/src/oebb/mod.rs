//! ÖBB ticket shop API client.
//!
//! This module provides an HTTP client for the undocumented JSON API behind
//! `tickets.oebb.at`.
//!
//! Key characteristics of the API:
//! - Sessions are anonymous and short-lived; an expired session is signalled
//!   with the non-standard HTTP status **440**
//! - The timetable endpoint returns at most 6 connections per request
//! - Times are local wall-clock timestamps without a zone suffix

mod client;
mod convert;
mod error;
mod types;

pub use client::{OebbClient, OebbConfig};
pub use convert::{ConversionError, convert_connection, convert_station};
pub use error::ApiError;
pub use types::{
    AuthResponse, ConnectionDto, ConnectionsRequest, ConnectionsResponse, SectionDto, StationDto,
};
