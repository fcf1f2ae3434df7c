//! Credential lifecycle: reuse, refresh on expiry, persist.

use std::future::Future;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::domain::CredentialBundle;
use crate::oebb::{ApiError, OebbClient};
use crate::search::SearchError;

use super::cache::CredentialCache;

/// Something that can obtain a fresh credential bundle.
pub trait SessionProvider {
    fn authenticate(&self) -> impl Future<Output = Result<CredentialBundle, ApiError>> + Send;
}

impl SessionProvider for OebbClient {
    fn authenticate(&self) -> impl Future<Output = Result<CredentialBundle, ApiError>> + Send {
        OebbClient::authenticate(self)
    }
}

/// Errors that can carry the provider's session-expired signal.
pub trait SessionExpiry {
    fn is_session_expired(&self) -> bool;
}

impl SessionExpiry for ApiError {
    fn is_session_expired(&self) -> bool {
        ApiError::is_session_expired(self)
    }
}

impl SessionExpiry for SearchError {
    fn is_session_expired(&self) -> bool {
        matches!(self, SearchError::SessionExpired)
    }
}

/// Current credentials plus the means to replace them.
///
/// Concurrent operations share one bundle. When several of them hit an
/// expired session at once, only the first re-authenticates; the others
/// pick up the bundle it obtained.
pub struct Session<P> {
    provider: P,
    cache: Option<CredentialCache>,
    current: Mutex<CredentialBundle>,
}

impl<P: SessionProvider> Session<P> {
    /// Start a session, reusing cached credentials when they are still valid.
    pub async fn open(provider: P, cache: Option<CredentialCache>) -> Result<Self, ApiError> {
        let cached = cache.as_ref().and_then(CredentialCache::load);

        let bundle = match cached {
            Some(bundle) => {
                debug!(session_id = %bundle.session_id, "using cached credentials");
                bundle
            }
            None => {
                let bundle = provider.authenticate().await?;
                store(cache.as_ref(), &bundle);
                bundle
            }
        };

        Ok(Self {
            provider,
            cache,
            current: Mutex::new(bundle),
        })
    }

    /// A copy of the current credentials.
    pub async fn credentials(&self) -> CredentialBundle {
        self.current.lock().await.clone()
    }

    /// Unconditionally re-authenticate and persist the new bundle.
    pub async fn refresh(&self) -> Result<CredentialBundle, ApiError> {
        let mut current = self.current.lock().await;
        let bundle = self.provider.authenticate().await?;
        info!(session_id = %bundle.session_id, "session refreshed");
        store(self.cache.as_ref(), &bundle);
        *current = bundle.clone();
        Ok(bundle)
    }

    /// Replace `stale` unless another caller already has.
    async fn refresh_stale(&self, stale: &CredentialBundle) -> Result<CredentialBundle, ApiError> {
        let mut current = self.current.lock().await;
        if current.session_id != stale.session_id {
            return Ok(current.clone());
        }

        let bundle = self.provider.authenticate().await?;
        info!(session_id = %bundle.session_id, "session refreshed after expiry");
        store(self.cache.as_ref(), &bundle);
        *current = bundle.clone();
        Ok(bundle)
    }

    /// Run `op` with the current credentials, retrying once with fresh
    /// credentials if it reports an expired session.
    ///
    /// A second expiry, or any other error, is returned as is.
    pub async fn with_refresh<T, E, F, Fut>(&self, op: F) -> Result<T, E>
    where
        F: Fn(CredentialBundle) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: From<ApiError> + SessionExpiry,
    {
        let creds = self.credentials().await;

        match op(creds.clone()).await {
            Err(e) if e.is_session_expired() => {
                warn!(session_id = %creds.session_id, "session expired, re-authenticating");
                let fresh = self.refresh_stale(&creds).await?;
                op(fresh).await
            }
            other => other,
        }
    }
}

fn store(cache: Option<&CredentialCache>, bundle: &CredentialBundle) {
    if let Some(cache) = cache
        && let Err(e) = cache.store(bundle)
    {
        warn!(error = %e, "failed to cache credentials");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tempfile::tempdir;

    /// Issues sessions "s1", "s2", ... and counts authentications.
    #[derive(Default)]
    struct CountingProvider {
        calls: AtomicU32,
    }

    impl CountingProvider {
        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl SessionProvider for &CountingProvider {
        async fn authenticate(&self) -> Result<CredentialBundle, ApiError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(bundle(&format!("s{n}"), 1800))
        }
    }

    struct FailingProvider;

    impl SessionProvider for FailingProvider {
        async fn authenticate(&self) -> Result<CredentialBundle, ApiError> {
            Err(ApiError::Api {
                status: 503,
                message: "Service Unavailable".into(),
            })
        }
    }

    fn bundle(session_id: &str, expires_in_secs: u64) -> CredentialBundle {
        CredentialBundle {
            access_token: format!("token-{session_id}"),
            channel: "inet".into(),
            session_id: session_id.into(),
            support_id: "support".into(),
            expires_in_secs,
            issued_at: Utc::now(),
        }
    }

    /// Fails with an expired session whenever it is handed session "s1".
    async fn expires_on_s1(creds: CredentialBundle) -> Result<String, ApiError> {
        if creds.session_id == "s1" {
            Err(ApiError::SessionExpired)
        } else {
            Ok(creds.session_id)
        }
    }

    #[tokio::test]
    async fn open_authenticates_without_cache() {
        let provider = CountingProvider::default();
        let session = Session::open(&provider, None).await.unwrap();

        assert_eq!(session.credentials().await.session_id, "s1");
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn open_reuses_valid_cache() {
        let dir = tempdir().unwrap();
        let cache = CredentialCache::new(dir.path().join("auth.json"));
        cache.store(&bundle("cached", 1800)).unwrap();

        let provider = CountingProvider::default();
        let session = Session::open(&provider, Some(cache)).await.unwrap();

        assert_eq!(session.credentials().await.session_id, "cached");
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn open_replaces_expired_cache() {
        let dir = tempdir().unwrap();
        let cache = CredentialCache::new(dir.path().join("auth.json"));
        cache.store(&bundle("old", 0)).unwrap();

        let provider = CountingProvider::default();
        let session = Session::open(&provider, Some(cache.clone())).await.unwrap();

        assert_eq!(session.credentials().await.session_id, "s1");
        assert_eq!(provider.calls(), 1);
        assert_eq!(cache.load().unwrap().session_id, "s1");
    }

    #[tokio::test]
    async fn open_tolerates_unwritable_cache() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "").unwrap();
        let cache = CredentialCache::new(blocker.join("auth.json"));

        let provider = CountingProvider::default();
        let session = Session::open(&provider, Some(cache)).await.unwrap();

        assert_eq!(session.credentials().await.session_id, "s1");
    }

    #[tokio::test]
    async fn open_propagates_auth_failure() {
        let err = Session::open(FailingProvider, None).await.err().unwrap();
        assert!(matches!(err, ApiError::Api { status: 503, .. }));
    }

    #[tokio::test]
    async fn refresh_replaces_credentials() {
        let dir = tempdir().unwrap();
        let cache = CredentialCache::new(dir.path().join("auth.json"));
        let provider = CountingProvider::default();
        let session = Session::open(&provider, Some(cache.clone())).await.unwrap();

        let fresh = session.refresh().await.unwrap();

        assert_eq!(fresh.session_id, "s2");
        assert_eq!(session.credentials().await.session_id, "s2");
        assert_eq!(cache.load().unwrap().session_id, "s2");
    }

    #[tokio::test]
    async fn with_refresh_retries_once_on_expiry() {
        let provider = CountingProvider::default();
        let session = Session::open(&provider, None).await.unwrap();

        let result = session.with_refresh(expires_on_s1).await.unwrap();

        assert_eq!(result, "s2");
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn with_refresh_propagates_second_expiry() {
        let provider = CountingProvider::default();
        let session = Session::open(&provider, None).await.unwrap();
        let attempts = AtomicU32::new(0);

        let err = session
            .with_refresh(|_| {
                attempts.fetch_add(1, Ordering::SeqCst);
                async { Err::<(), _>(ApiError::SessionExpired) }
            })
            .await
            .unwrap_err();

        assert!(err.is_session_expired());
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn with_refresh_does_not_retry_other_errors() {
        let provider = CountingProvider::default();
        let session = Session::open(&provider, None).await.unwrap();
        let attempts = AtomicU32::new(0);

        let err = session
            .with_refresh(|_| {
                attempts.fetch_add(1, Ordering::SeqCst);
                async {
                    Err::<(), _>(ApiError::Api {
                        status: 500,
                        message: "boom".into(),
                    })
                }
            })
            .await
            .unwrap_err();

        assert!(!err.is_session_expired());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn with_refresh_classifies_search_errors() {
        let provider = CountingProvider::default();
        let session = Session::open(&provider, None).await.unwrap();

        let result: Result<String, SearchError> = session
            .with_refresh(|creds| async move {
                expires_on_s1(creds).await.map_err(SearchError::from)
            })
            .await;

        assert_eq!(result.unwrap(), "s2");
    }

    #[tokio::test]
    async fn concurrent_expiries_refresh_once() {
        let provider = CountingProvider::default();
        let session = Session::open(&provider, None).await.unwrap();

        let (a, b) = futures::future::try_join(
            session.with_refresh(expires_on_s1),
            session.with_refresh(expires_on_s1),
        )
        .await
        .unwrap();

        assert_eq!((a.as_str(), b.as_str()), ("s2", "s2"));
        assert_eq!(provider.calls(), 2);
    }
}
