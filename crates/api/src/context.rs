use conduct_auth::{CredentialClaims, Role};
use conduct_core::{Email, UserId};

/// Principal context for a request (verified identity + role).
///
/// Inserted by the gate middleware on protected routes only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    principal_id: UserId,
    email: Email,
    role: Role,
}

impl PrincipalContext {
    pub fn new(principal_id: UserId, email: Email, role: Role) -> Self {
        Self {
            principal_id,
            email,
            role,
        }
    }

    pub fn principal_id(&self) -> UserId {
        self.principal_id
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn role(&self) -> Role {
        self.role
    }
}

impl From<CredentialClaims> for PrincipalContext {
    fn from(claims: CredentialClaims) -> Self {
        Self::new(claims.sub, claims.email, claims.role)
    }
}
