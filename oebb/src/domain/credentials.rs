//! Session credentials issued by the authentication endpoint.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Opaque token set authorizing API calls.
///
/// No user account is involved: the provider hands out anonymous sessions
/// with a finite lifetime. `issued_at` is not persisted; the credential
/// cache derives it from the cache file's modification time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialBundle {
    pub access_token: String,
    pub channel: String,
    pub session_id: String,
    pub support_id: String,
    /// Session lifetime in seconds.
    pub expires_in_secs: u64,
    #[serde(skip, default = "Utc::now")]
    pub issued_at: DateTime<Utc>,
}

impl CredentialBundle {
    /// The instant after which the provider will reject this session.
    pub fn expires_at(&self) -> DateTime<Utc> {
        let secs = i64::try_from(self.expires_in_secs).unwrap_or(i64::MAX);
        Duration::try_seconds(secs)
            .and_then(|lifetime| self.issued_at.checked_add_signed(lifetime))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Whether the bundle is expired at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at() <= now
    }

    /// Whether the bundle is expired according to the local clock.
    ///
    /// The provider may still reject a bundle that looks valid here; callers
    /// must handle the remote session-expired signal regardless.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn bundle(expires_in_secs: u64) -> CredentialBundle {
        CredentialBundle {
            access_token: "token".into(),
            channel: "inet".into(),
            session_id: "session".into(),
            support_id: "support".into(),
            expires_in_secs,
            issued_at: Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn expiry_boundary_is_inclusive() {
        let b = bundle(60);
        let issued = b.issued_at;

        assert!(!b.is_expired_at(issued + Duration::seconds(59)));
        assert!(b.is_expired_at(issued + Duration::seconds(60)));
        assert!(b.is_expired_at(issued + Duration::seconds(61)));
    }

    #[test]
    fn zero_lifetime_is_immediately_expired() {
        let b = bundle(0);
        assert!(b.is_expired_at(b.issued_at));
    }

    #[test]
    fn huge_lifetime_does_not_overflow() {
        let b = bundle(u64::MAX);
        assert!(!b.is_expired_at(b.issued_at + Duration::days(365 * 100)));
    }

    #[test]
    fn issued_at_is_not_serialized() {
        let json = serde_json::to_string(&bundle(30)).unwrap();
        assert!(json.contains("\"access_token\":\"token\""));
        assert!(!json.contains("issued_at"));

        let back: CredentialBundle = serde_json::from_str(&json).unwrap();
        assert_eq!(back.session_id, "session");
        assert_eq!(back.expires_in_secs, 30);
    }
}
