use std::sync::Arc;

use axum::{
    extract::Extension,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::json;

use crate::app::dto;
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/me", get(me))
        .route("/qr", get(qr))
}

/// The signed-in student's record and the complaints filed against them.
pub async fn me(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> Result<axum::response::Response, ApiError> {
    let account = services
        .accounts
        .get(&principal.principal_id())
        .ok_or(ApiError::NotFound("Student not found"))?;
    let complaints = services.complaints.for_student(&account.id);

    Ok(Json(dto::student_to_json(&account, &complaints)).into_response())
}

/// QR payload identifying the student to a scanning admin.
pub async fn qr(Extension(principal): Extension<PrincipalContext>) -> impl IntoResponse {
    Json(json!({ "payload": principal.email() }))
}
