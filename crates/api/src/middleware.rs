use axum::{
    extract::State,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;

use conduct_auth::{Decision, Gate};

use crate::context::PrincipalContext;
use crate::cookie::{TOKEN_COOKIE, cookie_value};

#[derive(Clone)]
pub struct GateState {
    pub gate: Gate,
}

/// Run the authorization gate in front of every route.
///
/// Allowed requests on protected routes get a [`PrincipalContext`]
/// extension; denied requests never reach a handler.
pub async fn gate_middleware(
    State(state): State<GateState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let decision = state.gate.decide(
        req.uri().path(),
        cookie_value(req.headers(), TOKEN_COOKIE),
        Utc::now(),
    );

    match decision {
        Decision::Allow(Some(claims)) => {
            req.extensions_mut().insert(PrincipalContext::from(claims));
            next.run(req).await
        }
        Decision::Allow(None) => next.run(req).await,
        Decision::RedirectTo(target) => Redirect::temporary(&target).into_response(),
    }
}
