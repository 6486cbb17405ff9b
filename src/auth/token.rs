//! Signed session tokens (JWT, HS256).

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Identity carried by a token and attached to authenticated requests.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Admin record id
    pub sub: String,
    pub username: String,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and verifies tokens with a shared secret.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl: Duration::hours(ttl_hours),
        }
    }

    /// Token lifetime in seconds, for cookie `Max-Age`.
    pub fn ttl_seconds(&self) -> i64 {
        self.ttl.num_seconds()
    }

    /// Issue a token for an admin.
    pub fn issue(&self, admin_id: &str, username: &str) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = Claims {
            sub: admin_id.to_string(),
            username: username.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        self.sign(&claims)
    }

    fn sign(&self, claims: &Claims) -> Result<String, AppError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))
    }

    /// Verify signature and expiry. Every failure is the same `Unauthorized`.
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!("Rejected token: {}", e);
                AppError::unauthorized()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_then_verify() {
        let tokens = TokenService::new("test-secret", 1);
        let token = tokens.issue("admin-1", "admin").unwrap();

        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.sub, "admin-1");
        assert_eq!(claims.username, "admin");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_expired_token_rejected() {
        let tokens = TokenService::new("test-secret", 1);
        let now = Utc::now().timestamp();
        let expired = tokens
            .sign(&Claims {
                sub: "admin-1".to_string(),
                username: "admin".to_string(),
                iat: now - 7200,
                exp: now - 3600,
            })
            .unwrap();

        assert!(matches!(
            tokens.verify(&expired),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_foreign_secret_rejected() {
        let ours = TokenService::new("test-secret", 1);
        let theirs = TokenService::new("other-secret", 1);
        let token = theirs.issue("admin-1", "admin").unwrap();

        assert!(ours.verify(&token).is_err());
    }

    #[test]
    fn test_tampered_token_rejected() {
        let tokens = TokenService::new("test-secret", 1);
        let token = tokens.issue("admin-1", "admin").unwrap();

        let mut parts: Vec<&str> = token.split('.').collect();
        let forged_payload = {
            let other = TokenService::new("test-secret", 1000)
                .issue("admin-2", "mallory")
                .unwrap();
            other.split('.').nth(1).unwrap().to_string()
        };
        parts[1] = &forged_payload;
        let tampered = parts.join(".");

        assert!(tokens.verify(&tampered).is_err());
        assert!(tokens.verify("not-a-token").is_err());
        assert!(tokens.verify("").is_err());
    }
}
