use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use conduct_core::{Email, UserId};

use crate::Role;

/// Credential claims model (transport-agnostic).
///
/// This is the full payload a signed credential carries. Deserialization is
/// the schema check: a payload missing any field, or with a mis-typed one
/// (e.g. an unknown `role`), never becomes a `CredentialClaims`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialClaims {
    /// Subject / account identifier.
    pub sub: UserId,

    /// Account email, handed to downstream handlers.
    pub email: Email,

    /// Role granted to the subject.
    pub role: Role,

    /// Issued-at timestamp (unix seconds on the wire).
    #[serde(rename = "iat", with = "chrono::serde::ts_seconds")]
    pub issued_at: DateTime<Utc>,

    /// Expiration timestamp (unix seconds on the wire).
    #[serde(rename = "exp", with = "chrono::serde::ts_seconds")]
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid token time window (expires_at <= issued_at)")]
    InvalidTimeWindow,
}

/// Deterministically validate credential time claims against `now`.
///
/// Note: this validates the *claims* only. Signature verification happens in
/// [`crate::jwt`].
pub fn validate_claims(claims: &CredentialClaims, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
    if claims.expires_at <= claims.issued_at {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now < claims.issued_at {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.expires_at {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn claims(issued_at: DateTime<Utc>, ttl: Duration) -> CredentialClaims {
        CredentialClaims {
            sub: UserId::new(),
            email: Email::parse("student@school.edu").unwrap(),
            role: Role::Student,
            issued_at,
            expires_at: issued_at + ttl,
        }
    }

    #[test]
    fn window_boundaries() {
        let t0 = Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap();
        let c = claims(t0, Duration::hours(1));

        assert_eq!(validate_claims(&c, t0), Ok(()));
        assert_eq!(validate_claims(&c, t0 + Duration::minutes(59)), Ok(()));
        assert_eq!(
            validate_claims(&c, t0 + Duration::hours(1)),
            Err(TokenValidationError::Expired)
        );
        assert_eq!(
            validate_claims(&c, t0 - Duration::seconds(1)),
            Err(TokenValidationError::NotYetValid)
        );
    }

    #[test]
    fn empty_window_is_rejected() {
        let t0 = Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap();
        let c = claims(t0, Duration::zero());
        assert_eq!(validate_claims(&c, t0), Err(TokenValidationError::InvalidTimeWindow));
    }

    #[test]
    fn timestamps_serialize_as_unix_seconds() {
        let t0 = Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap();
        let c = claims(t0, Duration::hours(1));
        let json = serde_json::to_value(&c).unwrap();

        assert_eq!(json["iat"], t0.timestamp());
        assert_eq!(json["exp"], t0.timestamp() + 3600);
        assert_eq!(json["role"], "STUDENT");
    }
}
