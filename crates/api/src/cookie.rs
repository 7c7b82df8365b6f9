//! The `token` cookie: the credential carrier between browser and gate.

use axum::http::{HeaderMap, HeaderValue, header};
use chrono::Duration;

/// Cookie name the gate reads the credential from.
pub const TOKEN_COOKIE: &str = "token";

/// Look up a cookie value across all `Cookie` headers.
///
/// An empty value counts as absent.
pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim().trim_matches('"'))
        .filter(|value| !value.is_empty())
}

/// Attributes of the session cookie, fixed at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionCookies {
    secure: bool,
    max_age: Duration,
}

impl SessionCookies {
    pub fn new(secure: bool, max_age: Duration) -> Self {
        Self { secure, max_age }
    }

    /// `Set-Cookie` value carrying a freshly issued credential.
    pub fn session(&self, token: &str) -> Result<HeaderValue, header::InvalidHeaderValue> {
        HeaderValue::from_str(&self.render(token, self.max_age.num_seconds()))
    }

    /// `Set-Cookie` value that makes the browser drop the credential.
    pub fn cleared(&self) -> HeaderValue {
        // Built only from fixed ASCII, so it is always a valid header value.
        HeaderValue::from_str(&self.render("", 0)).unwrap_or_else(|_| HeaderValue::from_static("token=; Max-Age=0; Path=/"))
    }

    fn render(&self, value: &str, max_age: i64) -> String {
        let mut cookie = format!("{TOKEN_COOKIE}={value}; HttpOnly; SameSite=Lax; Path=/; Max-Age={max_age}");
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }
}
