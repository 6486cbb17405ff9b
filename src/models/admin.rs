//! Admin account model and auth request/response bodies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{require, require_email, Entity, Record};
use crate::errors::AppError;

/// Shortest password accepted at registration.
pub const MIN_PASSWORD_LEN: usize = 8;

/// A stored admin account. Never serialized into a response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Admin {
    pub username: String,
    pub email: String,
    /// Argon2id PHC string
    pub password_hash: String,
}

impl Entity for Admin {
    const COLLECTION: &'static str = "admins";
    const LABEL: &'static str = "Admin";
    const UNIQUE: &'static [&'static str] = &["username", "email"];

    fn validate(&self) -> Result<(), AppError> {
        require("username", &self.username)?;
        require_email("email", &self.email)?;
        require("passwordHash", &self.password_hash)
    }
}

/// Public view of an admin account.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminProfile {
    pub id: String,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<Record<Admin>> for AdminProfile {
    fn from(record: Record<Admin>) -> Self {
        Self {
            id: record.id,
            username: record.fields.username,
            email: record.fields.email,
            created_at: record.created_at,
        }
    }
}

/// Request body for `POST /api/auth/register`.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        require("username", &self.username)?;
        require_email("email", &self.email)?;
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AppError::Validation(format!(
                "password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }
        Ok(())
    }
}

/// Request body for `POST /api/auth/login`. `username` may also be the email.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Response body for a successful login or registration.
#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    pub token: String,
    pub admin: AdminProfile,
}
