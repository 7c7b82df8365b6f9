use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Role claim carried in every credential.
///
/// The wire form is the upper-case name (`"ADMIN"`, `"STUDENT"`); any other
/// string fails deserialization, which the verifier reports as an invalid
/// credential.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    Student,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown role '{0}'")]
pub struct UnknownRole(pub String);

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Student => "STUDENT",
        }
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADMIN" => Ok(Role::Admin),
            "STUDENT" => Ok(Role::Student),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
