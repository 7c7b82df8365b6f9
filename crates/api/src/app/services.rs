use std::sync::Arc;

use conduct_auth::{
    Account, AccountDirectory, AccountError, CredentialIssuer, Hs256JwtIssuer, InMemoryAccountDirectory, Role,
};
use conduct_complaints::{ComplaintStore, InMemoryComplaintStore};

use crate::config::AppConfig;
use crate::cookie::SessionCookies;

/// Everything handlers need, shared behind an `Arc`.
pub struct AppServices {
    pub accounts: Arc<dyn AccountDirectory>,
    pub complaints: Arc<dyn ComplaintStore>,
    pub issuer: Arc<dyn CredentialIssuer>,
    pub cookies: SessionCookies,
}

/// In-memory services, seeded with the configured admin (if any).
pub fn build_services(config: &AppConfig) -> Result<AppServices, AccountError> {
    let accounts = InMemoryAccountDirectory::new();

    if let Some(seed) = &config.seed_admin {
        let admin = Account::register(seed.email.clone(), &seed.name, Role::Admin, &seed.password)?;
        tracing::info!(email = %admin.email, "seeded admin account");
        accounts.insert(admin)?;
    } else {
        tracing::warn!("no SEED_ADMIN_EMAIL configured; nobody can sign in until an account exists");
    }

    Ok(AppServices {
        accounts: Arc::new(accounts),
        complaints: Arc::new(InMemoryComplaintStore::new()),
        issuer: Arc::new(Hs256JwtIssuer::new(config.jwt_secret.as_bytes(), config.token_ttl)),
        cookies: SessionCookies::new(config.secure_cookies(), config.token_ttl),
    })
}
