//! Auth API endpoints: register, login, verify, logout.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderMap},
    response::{AppendHeaders, IntoResponse, Response},
    Extension, Json,
};

use super::{json_body, ApiResponse, ApiResult};
use crate::auth::{
    clear_session_cookie, extract_token, hash_password_task, session_cookie, verify_password_task,
    Claims,
};
use crate::errors::AppError;
use crate::models::{Admin, AdminProfile, AuthSession, LoginRequest, Record, RegisterRequest};
use crate::AppState;

const INVALID_CREDENTIALS: &str = "Invalid username or password";

/// POST /api/auth/register - Create an admin account.
///
/// Open while no admin exists so the first account can be bootstrapped;
/// afterwards only an authenticated admin may add accounts. Only the
/// bootstrap path signs the caller in.
#[tracing::instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let caller = extract_token(&headers).and_then(|token| state.tokens.verify(&token).ok());
    if caller.is_none() && state.repo.count::<Admin>().await? > 0 {
        return Err(AppError::unauthorized());
    }

    let request = json_body(payload)?;
    request.validate()?;

    let admin = Admin {
        username: request.username.trim().to_string(),
        email: request.email.trim().to_lowercase(),
        password_hash: hash_password_task(request.password).await?,
    };

    let Some(claims) = caller else {
        return bootstrap(&state, admin).await;
    };

    let record = state.repo.create(admin).await?;
    tracing::info!(
        admin = %record.fields.username,
        by = %claims.username,
        "Admin registered another admin"
    );

    Ok(ApiResponse::created(AdminProfile::from(record)).into_response())
}

/// Create the first admin and start its session.
async fn bootstrap(state: &AppState, admin: Admin) -> Result<Response, AppError> {
    // A concurrent anonymous request may have claimed the bootstrap first
    let record = state
        .repo
        .create_if_empty(admin)
        .await?
        .ok_or_else(AppError::unauthorized)?;
    tracing::info!(admin = %record.fields.username, "Bootstrapped first admin");

    let session = start_session(state, record)?;
    let cookie = session_cookie(
        &session.token,
        state.tokens.ttl_seconds(),
        state.config.cookie_secure,
    );
    Ok((
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        ApiResponse::created(session),
    )
        .into_response())
}

/// POST /api/auth/login - Exchange credentials for a token.
#[tracing::instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let request = json_body(payload)?;
    let identifier = request.username.trim();

    let mut found = state.repo.find_by::<Admin>("username", identifier).await?;
    if found.is_none() && identifier.contains('@') {
        found = state
            .repo
            .find_by::<Admin>("email", &identifier.to_lowercase())
            .await?;
    }

    let verified = match &found {
        Some(record) => {
            verify_password_task(request.password, record.fields.password_hash.clone()).await?
        }
        None => false,
    };

    let record = match found {
        Some(record) if verified => record,
        _ => {
            tracing::warn!("Failed login attempt");
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }
    };
    tracing::info!(admin = %record.fields.username, "Admin logged in");

    let session = start_session(&state, record)?;
    let cookie = session_cookie(
        &session.token,
        state.tokens.ttl_seconds(),
        state.config.cookie_secure,
    );
    Ok((
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        ApiResponse::ok(session),
    ))
}

/// GET /api/auth/verify - Return the profile behind a valid token.
pub async fn verify(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<AdminProfile> {
    // The account may have been deleted after the token was issued
    let record = state
        .repo
        .get::<Admin>(&claims.sub)
        .await?
        .ok_or_else(AppError::unauthorized)?;

    Ok(ApiResponse::ok(AdminProfile::from(record)))
}

/// POST /api/auth/logout - Clear the session cookie.
pub async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    (
        AppendHeaders([(
            header::SET_COOKIE,
            clear_session_cookie(state.config.cookie_secure),
        )]),
        ApiResponse::message("Logged out"),
    )
}

fn start_session(state: &AppState, record: Record<Admin>) -> Result<AuthSession, AppError> {
    let token = state.tokens.issue(&record.id, &record.fields.username)?;
    Ok(AuthSession {
        token,
        admin: AdminProfile::from(record),
    })
}
