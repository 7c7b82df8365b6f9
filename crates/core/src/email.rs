//! Normalized email address.

use serde::{Deserialize, Serialize};

use crate::{DomainError, DomainResult, ValueObject};

/// Email address, trimmed and lower-cased.
///
/// Emails identify accounts at sign-in and double as the student's QR
/// payload, so two spellings differing only in case are the same address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    pub fn parse(raw: &str) -> DomainResult<Self> {
        let normalized = raw.trim().to_lowercase();

        let Some((local, domain)) = normalized.split_once('@') else {
            return Err(DomainError::validation("email must contain '@'"));
        };
        if local.is_empty() || domain.is_empty() || domain.contains('@') {
            return Err(DomainError::validation(format!("invalid email: {raw}")));
        }
        if normalized.chars().any(char::is_whitespace) {
            return Err(DomainError::validation("email must not contain whitespace"));
        }

        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ValueObject for Email {}

impl core::fmt::Display for Email {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Email {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}
