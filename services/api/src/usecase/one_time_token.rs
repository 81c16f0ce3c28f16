//! One-time tokens: single-use, 60-second credentials binding a user to an app.
//!
//! Issuance supersedes any outstanding token for the same (user, app) pair;
//! validation consumes the backing row, so a given token string can succeed at
//! most once. Any authenticated user may mint a token for any existing app —
//! the token proves the requester's identity to the app, it grants nothing on
//! the app's own resources.

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::RngExt;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::repository::{AppRepository, OneTimeTokenRepository, UserRepository};
use crate::domain::types::{JTI_LEN, ONE_TIME_TOKEN_TTL_SECS, OneTimeToken};
use crate::error::ApiError;
use crate::usecase::token::now_secs;

/// Claims of the signed one-time token. `jti` is the store's primary key and
/// the only link between the token string and the outstanding row.
#[derive(Debug, Serialize, Deserialize)]
pub struct OneTimeTokenClaims {
    pub jti: String,
    pub user_id: Uuid,
    pub app_id: Uuid,
    pub iat: u64,
    pub exp: u64,
}

/// Charset for generating random jtis (URL-safe base64 alphabet).
const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

fn generate_jti() -> String {
    let mut rng = rand::rng();
    (0..JTI_LEN)
        .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
        .collect()
}

fn decode_one_time_token(token: &str, secret: &str) -> Result<OneTimeTokenClaims, ApiError> {
    let mut validation = Validation::new(jsonwebtoken::Algorithm::HS256);
    validation.validate_exp = true;
    // No leeway: the token lives 60 seconds, and the crate's default 60-second
    // leeway would let an expired signature pass the whole window over again.
    validation.leeway = 0;
    validation.required_spec_claims.clear();
    validation.set_required_spec_claims(&["exp", "jti"]);

    decode::<OneTimeTokenClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => ApiError::TokenExpired,
        _ => ApiError::InvalidToken,
    })
}

// ── Issue ────────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct IssueOneTimeTokenOutput {
    pub token: String,
    pub expires_in: i64,
}

pub struct IssueOneTimeTokenUseCase<A, T>
where
    A: AppRepository,
    T: OneTimeTokenRepository,
{
    pub apps: A,
    pub tokens: T,
    pub jwt_secret: String,
}

impl<A, T> IssueOneTimeTokenUseCase<A, T>
where
    A: AppRepository,
    T: OneTimeTokenRepository,
{
    pub async fn execute(
        &self,
        user_id: Uuid,
        app_id: Uuid,
    ) -> Result<IssueOneTimeTokenOutput, ApiError> {
        let app = self
            .apps
            .find_by_id(app_id)
            .await?
            .ok_or(ApiError::AppNotFound)?;

        let jti = generate_jti();
        let now = Utc::now();
        let expires_at = now + Duration::seconds(ONE_TIME_TOKEN_TTL_SECS);

        // Replace-at-most-one: the repository deletes any outstanding row for
        // this (user, app) pair and inserts the new one atomically.
        self.tokens
            .replace(&OneTimeToken {
                jti: jti.clone(),
                user_id,
                app_id: app.id,
                expires_at,
            })
            .await?;

        let claims = OneTimeTokenClaims {
            jti,
            user_id,
            app_id: app.id,
            iat: now_secs(),
            exp: expires_at.timestamp() as u64,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| ApiError::Internal(e.into()))?;

        Ok(IssueOneTimeTokenOutput {
            token,
            expires_in: ONE_TIME_TOKEN_TTL_SECS,
        })
    }
}

// ── Validate ─────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct ValidateOneTimeTokenOutput {
    pub user_id: Uuid,
    pub username: String,
    pub app_id: Uuid,
}

pub struct ValidateOneTimeTokenUseCase<U, T>
where
    U: UserRepository,
    T: OneTimeTokenRepository,
{
    pub users: U,
    pub tokens: T,
    pub jwt_secret: String,
}

impl<U, T> ValidateOneTimeTokenUseCase<U, T>
where
    U: UserRepository,
    T: OneTimeTokenRepository,
{
    pub async fn execute(&self, token: &str) -> Result<ValidateOneTimeTokenOutput, ApiError> {
        if token.is_empty() {
            return Err(ApiError::MissingToken);
        }

        let claims = decode_one_time_token(token, &self.jwt_secret)?;

        // Consume-on-read: the row is gone after this, whatever the outcome.
        // An absent row means the token was already used, superseded by a
        // later issuance, or never existed — one answer for all three.
        let record = self
            .tokens
            .take(&claims.jti)
            .await?
            .ok_or(ApiError::TokenAlreadyUsed)?;

        // Row-level expiry recheck, independent of the signature's exp claim.
        // The take above already reaped the row.
        if record.is_expired() {
            return Err(ApiError::TokenExpired);
        }

        let user = self
            .users
            .find_by_id(record.user_id)
            .await?
            .ok_or(ApiError::TokenAlreadyUsed)?;

        Ok(ValidateOneTimeTokenOutput {
            user_id: record.user_id,
            username: user.username,
            app_id: record.app_id,
        })
    }
}
