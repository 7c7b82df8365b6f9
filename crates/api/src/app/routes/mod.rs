use axum::{
    routing::{get, post},
    Router,
};

pub mod admin;
pub mod session;
pub mod student;
pub mod system;

/// Router for every endpoint. Access control is the gate's job, keyed on
/// the path prefixes used here.
pub fn router() -> Router {
    Router::new()
        .route("/public/health", get(system::health))
        .route("/user/signin", get(session::signin_page).post(session::signin))
        .route("/users/signout", post(session::signout))
        .route("/users/me", get(system::whoami))
        .nest("/student", student::router())
        .nest("/admin", admin::router())
}
