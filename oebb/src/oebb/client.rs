//! ÖBB ticket API HTTP client.
//!
//! Provides async methods for the three endpoints the CLI needs:
//! anonymous session initialisation, station lookup and the timetable.
//! Every authenticated call maps the provider's 440 status to
//! [`ApiError::SessionExpired`].

use chrono::Utc;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::domain::{ConnectionRecord, CredentialBundle, PageRequest, StationRef};

use super::convert::{convert_connections, convert_station};
use super::error::{ApiError, SESSION_EXPIRED_STATUS};
use super::types::{AuthResponse, ConnectionsRequest, ConnectionsResponse, StationDto};

/// Default base URL for the ticket shop API.
const DEFAULT_BASE_URL: &str = "https://tickets.oebb.at";

const AUTH_PATH: &str = "/api/domain/v3/init";
const STATIONS_PATH: &str = "/api/hafas/v1/stations";
const TIMETABLE_PATH: &str = "/api/hafas/v4/timetable";

/// Default per-request deadline.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// How much of an undecodable body to keep for error messages.
const BODY_SNIPPET_LEN: usize = 500;

/// Configuration for the ÖBB client.
#[derive(Debug, Clone)]
pub struct OebbConfig {
    /// Base URL for the API (defaults to production)
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl OebbConfig {
    /// Create a config pointing at the production API.
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl Default for OebbConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// ÖBB ticket API client.
///
/// Holds no session state: credentials are passed to every call, so one
/// client can be reused across credential refreshes.
#[derive(Debug, Clone)]
pub struct OebbClient {
    http: reqwest::Client,
    base_url: String,
}

impl OebbClient {
    /// Create a new client with the given configuration.
    pub fn new(config: OebbConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Start an anonymous session.
    ///
    /// No account is needed; the provider issues a token set for any caller.
    pub async fn authenticate(&self) -> Result<CredentialBundle, ApiError> {
        let request = self
            .http
            .get(format!("{}{AUTH_PATH}", self.base_url))
            .build()?;

        let auth: AuthResponse = self.execute(request).await?;

        // The token is sent twice; the nested copy is the canonical one.
        let access_token = if auth.token.access_token.is_empty() {
            auth.access_token
        } else {
            auth.token.access_token
        };

        debug!(
            session_id = %auth.session_id,
            expires_in_secs = auth.session_timeout,
            "authenticated"
        );

        Ok(CredentialBundle {
            access_token,
            channel: auth.channel,
            session_id: auth.session_id,
            support_id: auth.support_id,
            expires_in_secs: auth.session_timeout,
            issued_at: Utc::now(),
        })
    }

    /// Look up stations matching a free-text query, best match first.
    pub async fn get_stations(
        &self,
        query: &str,
        creds: &CredentialBundle,
    ) -> Result<Vec<StationRef>, ApiError> {
        let request = self.stations_request(query, creds)?;
        let stations: Vec<StationDto> = self.execute(request).await?;

        debug!(query, candidates = stations.len(), "station lookup");

        Ok(stations.iter().map(convert_station).collect())
    }

    /// Fetch one page of connections.
    ///
    /// Returns at most `page.count` connections departing at or after
    /// `page.cursor`, ordered by departure.
    pub async fn get_connections(
        &self,
        from: &StationRef,
        to: &StationRef,
        creds: &CredentialBundle,
        page: &PageRequest,
    ) -> Result<Vec<ConnectionRecord>, ApiError> {
        let request = self.connections_request(from, to, creds, page)?;
        let response: ConnectionsResponse = self.execute(request).await?;

        debug!(
            cursor = %page.cursor,
            count = page.count,
            received = response.connections.len(),
            "timetable page"
        );

        Ok(convert_connections(&response.connections)?)
    }

    fn stations_request(
        &self,
        query: &str,
        creds: &CredentialBundle,
    ) -> Result<reqwest::Request, ApiError> {
        Ok(self
            .http
            .get(format!("{}{STATIONS_PATH}", self.base_url))
            .query(&[("name", query)])
            .headers(session_headers(creds)?)
            .build()?)
    }

    fn connections_request(
        &self,
        from: &StationRef,
        to: &StationRef,
        creds: &CredentialBundle,
        page: &PageRequest,
    ) -> Result<reqwest::Request, ApiError> {
        let mut headers = session_headers(creds)?;
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            HeaderName::from_static("x-ts-supportid"),
            header_value("SupportId", &format!("WEB_{}", creds.support_id))?,
        );

        Ok(self
            .http
            .post(format!("{}{TIMETABLE_PATH}", self.base_url))
            .headers(headers)
            .json(&ConnectionsRequest::new(from, to, page))
            .build()?)
    }

    /// Send a request and decode a JSON response.
    async fn execute<T: DeserializeOwned>(&self, request: reqwest::Request) -> Result<T, ApiError> {
        let response = self.http.execute(request).await?;
        let status = response.status();

        if status.as_u16() == SESSION_EXPIRED_STATUS {
            return Err(ApiError::SessionExpired);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;

        serde_json::from_str(&body).map_err(|e| ApiError::Json {
            message: e.to_string(),
            body: Some(body.chars().take(BODY_SNIPPET_LEN).collect()),
        })
    }
}

/// Headers identifying the session on every authenticated call.
fn session_headers(creds: &CredentialBundle) -> Result<HeaderMap, ApiError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        HeaderName::from_static("channel"),
        header_value("Channel", &creds.channel)?,
    );
    headers.insert(
        HeaderName::from_static("accesstoken"),
        header_value("AccessToken", &creds.access_token)?,
    );
    headers.insert(
        HeaderName::from_static("sessionid"),
        header_value("SessionId", &creds.session_id)?,
    );
    Ok(headers)
}

fn header_value(field: &'static str, value: &str) -> Result<HeaderValue, ApiError> {
    HeaderValue::from_str(value).map_err(|_| ApiError::InvalidHeader(field))
}
