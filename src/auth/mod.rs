//! Token-based authentication gate.
//!
//! A token is accepted from the `Authorization: Bearer` header or the
//! `token` cookie; the header wins when both are present.

mod password;
mod token;

pub use password::*;
pub use token::*;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::errors::AppError;
use crate::AppState;

/// Name of the cookie carrying the session token.
pub const TOKEN_COOKIE: &str = "token";

/// Middleware guarding mutating routes.
///
/// On success the verified [`Claims`] are inserted into the request
/// extensions; on any failure the wrapped handler never runs.
pub async fn require_admin(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let claims = match extract_token(request.headers()) {
        Some(token) => state.tokens.verify(&token),
        None => Err(AppError::unauthorized()),
    };

    match claims {
        Ok(claims) => {
            tracing::debug!(admin = %claims.username, "Authenticated request");
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(err) => err.into_response(),
    }
}

/// Pull the raw token from the request headers.
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|s| !s.is_empty());

    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == TOKEN_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

/// `Set-Cookie` value storing a session token.
pub fn session_cookie(token: &str, max_age_seconds: i64, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
        TOKEN_COOKIE, token, max_age_seconds
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value clearing the session token.
pub fn clear_session_cookie(secure: bool) -> String {
    session_cookie("", 0, secure)
}
