//! `conduct-auth`: credentials, route classification, and the request gate.
//!
//! This crate is intentionally decoupled from HTTP and storage: the gate
//! consumes a path, an optional credential string and a clock reading, and
//! returns a decision.

pub mod account;
pub mod claims;
pub mod classify;
pub mod gate;
pub mod jwt;
pub mod password;
pub mod roles;

pub use account::{Account, AccountDirectory, AccountError, InMemoryAccountDirectory};
pub use claims::{CredentialClaims, TokenValidationError, validate_claims};
pub use classify::{PathPattern, Requirement, RouteClass, RouteRule, RouteTable, RouteTableError};
pub use gate::{Decision, Denial, Gate, SIGNIN_PATH};
pub use jwt::{
    CredentialError, CredentialIssuer, CredentialVerifier, Hs256JwtIssuer, Hs256JwtValidator, IssueError,
    IssuedCredential,
};
pub use roles::{Role, UnknownRole};
