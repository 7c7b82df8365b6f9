//! Authorization gate: the per-request allow/redirect decision.
//!
//! - No IO
//! - No shared mutable state
//! - Every denial collapses to the same redirect; the reason only reaches logs

use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::classify::{Requirement, RouteClass, RouteTable};
use crate::claims::CredentialClaims;
use crate::jwt::{CredentialError, CredentialVerifier};
use crate::Role;

/// Where every denied request is sent.
pub const SIGNIN_PATH: &str = "/user/signin";

/// Outcome of a gate check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Proceed. Carries the verified claims on protected routes; `None` on
    /// public routes, where the credential is never inspected.
    Allow(Option<CredentialClaims>),
    RedirectTo(String),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow(_))
    }
}

/// Why a request was denied (operator-facing only).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Denial {
    #[error("no credential on a protected route")]
    MissingCredential,

    #[error("credential rejected: {0}")]
    InvalidSignature(CredentialError),

    #[error("credential has expired")]
    ExpiredCredential,

    #[error("role {actual} does not satisfy {required}")]
    RoleMismatch { required: Requirement, actual: Role },
}

impl From<CredentialError> for Denial {
    fn from(err: CredentialError) -> Self {
        if err.is_expired() {
            Denial::ExpiredCredential
        } else {
            Denial::InvalidSignature(err)
        }
    }
}

/// The gate: route table plus credential verifier, both fixed at startup.
#[derive(Clone)]
pub struct Gate {
    routes: Arc<RouteTable>,
    verifier: Arc<dyn CredentialVerifier>,
}

impl Gate {
    pub fn new(routes: Arc<RouteTable>, verifier: Arc<dyn CredentialVerifier>) -> Self {
        Self { routes, verifier }
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Check a request, keeping the denial reason.
    pub fn authorize(
        &self,
        path: &str,
        credential: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Option<CredentialClaims>, Denial> {
        let requirement = match self.routes.classify(path) {
            RouteClass::Public => return Ok(None),
            RouteClass::Protected(requirement) => requirement,
        };

        let token = credential.ok_or(Denial::MissingCredential)?;
        let claims = self.verifier.verify(token, now)?;

        if !requirement.admits(claims.role) {
            return Err(Denial::RoleMismatch {
                required: requirement,
                actual: claims.role,
            });
        }

        Ok(Some(claims))
    }

    /// Decide a request. Denials are logged and turned into the sign-in redirect.
    pub fn decide(&self, path: &str, credential: Option<&str>, now: DateTime<Utc>) -> Decision {
        match self.authorize(path, credential, now) {
            Ok(claims) => Decision::Allow(claims),
            Err(Denial::MissingCredential) => {
                tracing::debug!(path, "no credential; redirecting to sign-in");
                Decision::RedirectTo(SIGNIN_PATH.to_string())
            }
            Err(denial) => {
                tracing::warn!(path, reason = %denial, "request denied");
                Decision::RedirectTo(SIGNIN_PATH.to_string())
            }
        }
    }
}

impl core::fmt::Debug for Gate {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Gate").field("routes", &self.routes).finish_non_exhaustive()
    }
}
