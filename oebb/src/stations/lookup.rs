//! Station lookup by free-text name.

use std::future::Future;

use tracing::debug;

use crate::domain::{CredentialBundle, StationRef};
use crate::oebb::{ApiError, OebbClient};
use crate::session::SessionExpiry;

/// Errors resolving a station name.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    /// The provider returned no candidates
    #[error("no station found for {query:?}")]
    NotFound { query: String },

    /// The lookup request failed
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl SessionExpiry for LookupError {
    fn is_session_expired(&self) -> bool {
        matches!(self, LookupError::Api(e) if e.is_session_expired())
    }
}

/// Source of station candidates for a query.
pub trait StationLookup {
    /// Candidates matching `query`, best match first.
    fn lookup(
        &self,
        query: &str,
        creds: &CredentialBundle,
    ) -> impl Future<Output = Result<Vec<StationRef>, ApiError>> + Send;
}

impl StationLookup for OebbClient {
    fn lookup(
        &self,
        query: &str,
        creds: &CredentialBundle,
    ) -> impl Future<Output = Result<Vec<StationRef>, ApiError>> + Send {
        self.get_stations(query, creds)
    }
}

/// Resolve `query` to its best-matching station.
pub async fn resolve_station<L: StationLookup>(
    lookup: &L,
    query: &str,
    creds: &CredentialBundle,
) -> Result<StationRef, LookupError> {
    let station = lookup
        .lookup(query, creds)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| LookupError::NotFound {
            query: query.to_string(),
        })?;

    debug!(query, station = %station, aggregate = station.is_aggregate(), "resolved station");
    Ok(station)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    struct FixedLookup(Result<Vec<StationRef>, u16>);

    impl StationLookup for FixedLookup {
        async fn lookup(
            &self,
            _query: &str,
            _creds: &CredentialBundle,
        ) -> Result<Vec<StationRef>, ApiError> {
            match &self.0 {
                Ok(stations) => Ok(stations.clone()),
                Err(440) => Err(ApiError::SessionExpired),
                Err(status) => Err(ApiError::Api {
                    status: *status,
                    message: String::new(),
                }),
            }
        }
    }

    fn creds() -> CredentialBundle {
        CredentialBundle {
            access_token: "token".into(),
            channel: "inet".into(),
            session_id: "session".into(),
            support_id: "support".into(),
            expires_in_secs: 1800,
            issued_at: Utc::now(),
        }
    }

    fn station(name: &str, number: i64) -> StationRef {
        StationRef::from_names(48_185_000, 16_376_000, Some(name), None, number)
    }

    #[tokio::test]
    async fn picks_first_candidate() {
        let lookup = FixedLookup(Ok(vec![
            station("Wien Hbf", 1290401),
            station("Wien Meidling", 1191201),
        ]));

        let resolved = resolve_station(&lookup, "wien", &creds()).await.unwrap();
        assert_eq!(resolved.display_name(), "Wien Hbf");
        assert_eq!(resolved.number(), 1290401);
    }

    #[tokio::test]
    async fn no_candidates_is_not_found() {
        let lookup = FixedLookup(Ok(vec![]));

        let err = resolve_station(&lookup, "Atlantis", &creds())
            .await
            .unwrap_err();
        assert!(matches!(&err, LookupError::NotFound { query } if query == "Atlantis"));
        assert_eq!(err.to_string(), "no station found for \"Atlantis\"");
        assert!(!err.is_session_expired());
    }

    #[tokio::test]
    async fn expired_session_is_recognised() {
        let lookup = FixedLookup(Err(440));

        let err = resolve_station(&lookup, "Graz", &creds()).await.unwrap_err();
        assert!(err.is_session_expired());
    }

    #[tokio::test]
    async fn api_errors_pass_through() {
        let lookup = FixedLookup(Err(502));

        let err = resolve_station(&lookup, "Graz", &creds()).await.unwrap_err();
        assert!(matches!(err, LookupError::Api(ApiError::Api { status: 502, .. })));
        assert!(!err.is_session_expired());
    }
}
