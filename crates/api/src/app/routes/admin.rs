use std::sync::Arc;

use axum::{
    extract::{
        Extension, Query,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde_json::json;

use conduct_auth::{Account, Role};
use conduct_complaints::{Complaint, NewComplaint, summarize};
use conduct_core::{Email, UserId};

use crate::app::dto;
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/students", get(list_students).post(create_account))
        .route("/students/lookup", get(lookup_student))
        .route("/complaints", post(create_complaint))
        .route("/stats", get(stats))
}

/// Students whose email contains the `email` filter, with their complaints.
pub async fn list_students(
    Extension(services): Extension<Arc<AppServices>>,
    query: Result<Query<dto::StudentsQuery>, QueryRejection>,
) -> Result<axum::response::Response, ApiError> {
    let Query(query) = query?;
    let filter = query.email.unwrap_or_default().trim().to_lowercase();

    let items = services
        .accounts
        .list_by_role(Role::Student)
        .into_iter()
        .filter(|s| s.email.as_str().contains(filter.as_str()))
        .map(|s| {
            let complaints = services.complaints.for_student(&s.id);
            dto::student_to_json(&s, &complaints)
        })
        .collect::<Vec<_>>();

    Ok(Json(json!({ "items": items })).into_response())
}

/// Resolve a scanned QR payload to a student.
pub async fn lookup_student(
    Extension(services): Extension<Arc<AppServices>>,
    query: Result<Query<dto::LookupQuery>, QueryRejection>,
) -> Result<axum::response::Response, ApiError> {
    let Query(query) = query?;
    let student = Email::parse(&query.payload)
        .ok()
        .and_then(|email| services.accounts.find_by_email(&email))
        .filter(|account| account.role == Role::Student)
        .ok_or(ApiError::NotFound("No student found for scanned QR"))?;

    let complaints = services.complaints.for_student(&student.id);
    Ok(Json(dto::student_to_json(&student, &complaints)).into_response())
}

/// Register an account; students unless the body asks for `ADMIN`.
pub async fn create_account(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    body: Result<Json<dto::CreateAccountRequest>, JsonRejection>,
) -> Result<axum::response::Response, ApiError> {
    let Json(body) = body?;
    let email = Email::parse(&body.email)?;
    let account = Account::register(email, &body.name, body.role, &body.password).map_err(|e| {
        ApiError::BadRequest(e.to_string())
    })?;
    let json = dto::account_to_json(&account);
    let (email, role) = (account.email.clone(), account.role);
    services.accounts.insert(account)?;

    tracing::info!(created_by = %principal.principal_id(), %email, %role, "account registered");
    Ok((StatusCode::CREATED, Json(json)).into_response())
}

pub async fn create_complaint(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    body: Result<Json<dto::CreateComplaintRequest>, JsonRejection>,
) -> Result<axum::response::Response, ApiError> {
    let Json(body) = body?;
    let (Some(student_id), Some(reason)) = (non_blank(body.student_id), non_blank(body.reason)) else {
        return Err(ApiError::BadRequest("studentId and reason are required".to_string()));
    };

    let student_id: UserId = student_id.parse()?;
    services
        .accounts
        .get(&student_id)
        .filter(|account| account.role == Role::Student)
        .ok_or(ApiError::NotFound("Student not found"))?;

    let complaint = Complaint::file(
        NewComplaint {
            student_id,
            reason,
            details: body.details,
            photo: body.photo,
        },
        Utc::now(),
    )?;
    services.complaints.insert(complaint.clone())?;

    tracing::info!(
        complaint_id = %complaint.id,
        student_id = %student_id,
        filed_by = %principal.principal_id(),
        "complaint filed"
    );
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Complaint created successfully", "complaint": complaint })),
    )
        .into_response())
}

pub async fn stats(Extension(services): Extension<Arc<AppServices>>) -> impl IntoResponse {
    Json(summarize(&services.complaints.all()))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
