//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: stores, credential issuer and cookie settings
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request/response DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use anyhow::Context;
use axum::{Extension, Router};

use conduct_auth::{Gate, Hs256JwtValidator, RouteTable};

use crate::config::AppConfig;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
///
/// The gate wraps every route and the fallback, so unknown paths are
/// subject to the fail-closed default as well.
pub fn build_app(config: &AppConfig) -> anyhow::Result<Router> {
    let route_table = RouteTable::standard().context("route table is ambiguous")?;
    let verifier = Hs256JwtValidator::new(config.jwt_secret.as_bytes());
    let gate_state = middleware::GateState {
        gate: Gate::new(Arc::new(route_table), Arc::new(verifier)),
    };

    let services = Arc::new(services::build_services(config).context("failed to build services")?);

    Ok(routes::router()
        .fallback(routes::system::not_found)
        .layer(Extension(services))
        .layer(axum::middleware::from_fn_with_state(
            gate_state,
            middleware::gate_middleware,
        )))
}
