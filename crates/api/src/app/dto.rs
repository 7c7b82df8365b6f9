use serde::Deserialize;
use serde_json::{Value, json};

use conduct_auth::{Account, Role};
use conduct_complaints::Complaint;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct SigninRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub password: String,
    /// `STUDENT` unless stated.
    #[serde(default = "default_role")]
    pub role: Role,
}

fn default_role() -> Role {
    Role::Student
}

#[derive(Debug, Deserialize)]
pub struct CreateComplaintRequest {
    #[serde(default, alias = "studentId")]
    pub student_id: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub photo: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StudentsQuery {
    /// Case-insensitive substring of the student email.
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LookupQuery {
    /// Scanned QR payload (the student's email).
    pub payload: String,
}

// -------------------------
// Response mapping
// -------------------------

pub fn account_to_json(account: &Account) -> Value {
    json!({
        "id": account.id.to_string(),
        "email": account.email,
        "name": account.name,
        "role": account.role,
    })
}

/// Student account with its complaints (newest first).
pub fn student_to_json(account: &Account, complaints: &[Complaint]) -> Value {
    let mut value = account_to_json(account);
    value["complaints"] = json!(complaints);
    value
}
