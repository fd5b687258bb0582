use std::sync::Arc;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use verzoeken_core::users::{AuthContext, Role};

use crate::error::ApiError;
use crate::main_lib::AppState;

const TOKEN_TTL_SECS: i64 = 8 * 60 * 60;
const RESET_TOKEN_TTL_SECS: i64 = 10 * 60;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

/// Carried in a password-reset link. The new hash travels inside the token so
/// no reset state needs to be stored server-side.
#[derive(Debug, Serialize, Deserialize)]
pub struct ResetClaims {
    pub sub: String,
    pub pwd: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

pub struct AuthManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl AuthManager {
    pub fn new(jwt_secret: &str) -> Self {
        AuthManager {
            encoding_key: EncodingKey::from_secret(jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(jwt_secret.as_bytes()),
        }
    }

    pub fn hash_password(&self, plain: &str) -> Result<String, ApiError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(plain.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| ApiError::Internal(format!("Failed to hash password: {}", e)))
    }

    pub fn verify_password(&self, hash: &str, plain: &str) -> bool {
        PasswordHash::new(hash)
            .map(|parsed| {
                Argon2::default()
                    .verify_password(plain.as_bytes(), &parsed)
                    .is_ok()
            })
            .unwrap_or(false)
    }

    pub fn issue_token(&self, user_id: &str, role: Role) -> Result<TokenResponse, ApiError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user_id.to_string(),
            role,
            iat: now,
            exp: now + TOKEN_TTL_SECS,
        };
        let access_token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| ApiError::Internal(format!("Failed to sign token: {}", e)))?;
        Ok(TokenResponse {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: TOKEN_TTL_SECS,
        })
    }

    pub fn decode_token(&self, token: &str) -> Result<Claims, ApiError> {
        decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|_| ApiError::Unauthorized("Invalid or expired token".to_string()))
    }

    pub fn issue_reset_token(
        &self,
        user_id: &str,
        new_password_hash: &str,
    ) -> Result<String, ApiError> {
        let now = Utc::now().timestamp();
        let claims = ResetClaims {
            sub: user_id.to_string(),
            pwd: new_password_hash.to_string(),
            iat: now,
            exp: now + RESET_TOKEN_TTL_SECS,
        };
        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| ApiError::Internal(format!("Failed to sign reset token: {}", e)))
    }

    pub fn decode_reset_token(&self, token: &str) -> Result<ResetClaims, ApiError> {
        decode::<ResetClaims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|_| ApiError::Unauthorized("Invalid or expired reset link".to_string()))
    }
}

/// Requires a valid bearer token and stores the caller identity as a request
/// extension for the handlers.
pub async fn require_jwt(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| ApiError::Unauthorized("Missing bearer token".to_string()))?;

    let claims = state.auth.decode_token(token)?;
    request.extensions_mut().insert(AuthContext {
        user_id: claims.sub,
        role: claims.role,
    });
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_round_trip() {
        let auth = AuthManager::new("test-secret");
        let hash = auth.hash_password("hunter2").unwrap();
        assert!(auth.verify_password(&hash, "hunter2"));
        assert!(!auth.verify_password(&hash, "hunter3"));
        assert!(!auth.verify_password("not-a-hash", "hunter2"));
    }

    #[test]
    fn token_round_trip() {
        let auth = AuthManager::new("test-secret");
        let token = auth.issue_token("user-1", Role::FinancialWorker).unwrap();
        assert_eq!(token.token_type, "Bearer");
        let claims = auth.decode_token(&token.access_token).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.role, Role::FinancialWorker);
    }

    #[test]
    fn tokens_from_another_secret_are_rejected() {
        let auth = AuthManager::new("test-secret");
        let other = AuthManager::new("other-secret");
        let token = other.issue_token("user-1", Role::Administrator).unwrap();
        assert!(auth.decode_token(&token.access_token).is_err());
    }

    #[test]
    fn reset_token_carries_the_new_hash() {
        let auth = AuthManager::new("test-secret");
        let token = auth.issue_reset_token("user-1", "argon2-hash").unwrap();
        let claims = auth.decode_reset_token(&token).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.pwd, "argon2-hash");
    }
}
