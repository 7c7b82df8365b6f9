use std::sync::Arc;

use axum::{
    extract::{Extension, rejection::JsonRejection},
    http::header,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde_json::json;

use conduct_core::Email;

use crate::app::dto;
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

pub async fn signin_page() -> impl IntoResponse {
    Json(json!({
        "message": "Sign in required",
        "method": "POST",
        "fields": ["email", "password"],
    }))
}

/// Verify the password and hand back the credential as the `token` cookie.
pub async fn signin(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::SigninRequest>, JsonRejection>,
) -> Result<axum::response::Response, ApiError> {
    let Json(body) = body?;
    if body.email.trim().is_empty() || body.password.is_empty() {
        return Err(ApiError::BadRequest("Email and Password are required".to_string()));
    }

    let account = Email::parse(&body.email)
        .ok()
        .and_then(|email| services.accounts.find_by_email(&email))
        .filter(|account| account.verify_password(&body.password));
    let Some(account) = account else {
        tracing::info!(email = %body.email.trim(), "sign-in rejected");
        return Err(ApiError::InvalidCredentials);
    };

    let issued = services
        .issuer
        .issue(account.id, account.email.clone(), account.role, Utc::now())
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    let cookie = services
        .cookies
        .session(&issued.token)
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    tracing::info!(user_id = %account.id, role = %account.role, "signed in");
    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(json!({ "message": "Login Successful", "role": account.role })),
    )
        .into_response())
}

/// Drop the client's credential. The token itself stays valid until expiry.
pub async fn signout(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> impl IntoResponse {
    tracing::info!(user_id = %principal.principal_id(), "signed out");
    (
        [(header::SET_COOKIE, services.cookies.cleared())],
        Json(json!({ "message": "Signed out" })),
    )
}
