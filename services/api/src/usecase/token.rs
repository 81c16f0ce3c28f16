//! Session tokens: stateless HS256 access/refresh pair.
//!
//! Neither token has a server-side record — identity + signing key + clock is
//! the whole state. The refresh flow swaps a live refresh token for a new
//! access token.

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

use crate::domain::types::{ACCESS_TOKEN_TTL_SECS, REFRESH_TOKEN_TTL_SECS, User};
use crate::error::ApiError;

/// JWT claims for both access and refresh tokens.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub exp: u64,
}

pub fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before UNIX epoch")
        .as_secs()
}

fn issue(user: &User, secret: &str, ttl_secs: u64) -> Result<String, ApiError> {
    let claims = SessionClaims {
        sub: user.id.to_string(),
        exp: now_secs() + ttl_secs,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| ApiError::Internal(e.into()))
}

pub fn issue_access_token(user: &User, secret: &str) -> Result<String, ApiError> {
    issue(user, secret, ACCESS_TOKEN_TTL_SECS)
}

pub fn issue_refresh_token(user: &User, secret: &str) -> Result<String, ApiError> {
    issue(user, secret, REFRESH_TOKEN_TTL_SECS)
}

/// Validate a session token (signature + expiry) and return its claims.
fn validate_session_token(token: &str, secret: &str) -> Option<SessionClaims> {
    let mut validation = Validation::new(jsonwebtoken::Algorithm::HS256);
    validation.validate_exp = true;
    validation.required_spec_claims.clear();
    validation.set_required_spec_claims(&["exp", "sub"]);

    decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .ok()
    .map(|data| data.claims)
}

/// Validate a bearer access token, returning the authenticated user id.
pub fn validate_access_token(token: &str, secret: &str) -> Result<Uuid, ApiError> {
    let claims = validate_session_token(token, secret).ok_or(ApiError::Unauthenticated)?;
    claims
        .sub
        .parse::<Uuid>()
        .map_err(|_| ApiError::Unauthenticated)
}

// ── RefreshToken ─────────────────────────────────────────────────────────────

use crate::domain::repository::UserRepository;

#[derive(Debug)]
pub struct RefreshTokenOutput {
    pub access_token: String,
}

pub struct RefreshTokenUseCase<U: UserRepository> {
    pub users: U,
    pub jwt_secret: String,
}

impl<U: UserRepository> RefreshTokenUseCase<U> {
    pub async fn execute(&self, refresh_token: &str) -> Result<RefreshTokenOutput, ApiError> {
        let claims = validate_session_token(refresh_token, &self.jwt_secret)
            .ok_or(ApiError::InvalidRefreshToken)?;

        let user_id = claims
            .sub
            .parse::<Uuid>()
            .map_err(|_| ApiError::InvalidRefreshToken)?;

        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(ApiError::InvalidRefreshToken)?;

        let access_token = issue_access_token(&user, &self.jwt_secret)?;
        Ok(RefreshTokenOutput { access_token })
    }
}
