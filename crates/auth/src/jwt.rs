//! HS256 credential signing and verification.
//!
//! The verifier checks the signature and the claim schema, then applies the
//! time checks from [`validate_claims`] against a caller-supplied clock so a
//! decision is a pure function of `(token, now)`.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use thiserror::Error;

use conduct_core::{Email, UserId};

use crate::claims::{CredentialClaims, TokenValidationError, validate_claims};
use crate::Role;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CredentialError {
    /// Not a well-formed token, or its payload does not match the claim schema.
    #[error("credential is malformed: {0}")]
    Malformed(String),

    /// Signed with another key or algorithm.
    #[error("credential signature is invalid")]
    BadSignature,

    #[error(transparent)]
    Time(#[from] TokenValidationError),
}

impl CredentialError {
    pub fn is_expired(&self) -> bool {
        matches!(self, CredentialError::Time(TokenValidationError::Expired))
    }
}

#[derive(Debug, Error)]
pub enum IssueError {
    #[error("failed to sign credential: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}

/// Verifies a signed credential string.
pub trait CredentialVerifier: Send + Sync {
    fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<CredentialClaims, CredentialError>;
}

/// A freshly minted credential and the claims it carries.
#[derive(Debug, Clone)]
pub struct IssuedCredential {
    pub token: String,
    pub claims: CredentialClaims,
}

/// Mints signed credentials at sign-in.
pub trait CredentialIssuer: Send + Sync {
    fn issue(
        &self,
        sub: UserId,
        email: Email,
        role: Role,
        now: DateTime<Utc>,
    ) -> Result<IssuedCredential, IssueError>;

    /// Lifetime of issued credentials.
    fn ttl(&self) -> Duration;
}

/// HS256 verifier backed by a shared secret.
pub struct Hs256JwtValidator {
    key: DecodingKey,
    validation: Validation,
}

impl Hs256JwtValidator {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked by `validate_claims` with the injected clock; the
        // serde schema already requires every claim.
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        Self {
            key: DecodingKey::from_secret(secret),
            validation,
        }
    }
}

impl CredentialVerifier for Hs256JwtValidator {
    fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<CredentialClaims, CredentialError> {
        let data = decode::<CredentialClaims>(token, &self.key, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => CredentialError::BadSignature,
                ErrorKind::Json(inner) => CredentialError::Malformed(format!("claims: {inner}")),
                _ => CredentialError::Malformed(e.to_string()),
            }
        })?;

        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}

impl core::fmt::Debug for Hs256JwtValidator {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Hs256JwtValidator").finish_non_exhaustive()
    }
}

/// HS256 issuer backed by a shared secret.
pub struct Hs256JwtIssuer {
    key: EncodingKey,
    ttl: Duration,
}

impl Hs256JwtIssuer {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            key: EncodingKey::from_secret(secret),
            ttl,
        }
    }
}

impl CredentialIssuer for Hs256JwtIssuer {
    fn issue(
        &self,
        sub: UserId,
        email: Email,
        role: Role,
        now: DateTime<Utc>,
    ) -> Result<IssuedCredential, IssueError> {
        let claims = CredentialClaims {
            sub,
            email,
            role,
            issued_at: now,
            expires_at: now + self.ttl,
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.key)?;
        Ok(IssuedCredential { token, claims })
    }

    fn ttl(&self) -> Duration {
        self.ttl
    }
}

impl core::fmt::Debug for Hs256JwtIssuer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Hs256JwtIssuer")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
