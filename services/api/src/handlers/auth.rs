use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};

use crate::domain::types::User;
use crate::error::ApiError;
use crate::state::AppState;
use crate::usecase::auth::{LoginInput, LoginUseCase, RegisterInput, RegisterUseCase, SessionTokens};
use crate::usecase::token::RefreshTokenUseCase;

#[derive(Serialize)]
pub struct UserResponse {
    pub user_id: uuid::Uuid,
    pub email: String,
    pub username: String,
    #[serde(serialize_with = "nexin_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "nexin_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "nexin_core::serde::to_rfc3339_ms_opt")]
    pub last_login_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            user_id: user.id,
            email: user.email,
            username: user.username,
            created_at: user.created_at,
            updated_at: user.updated_at,
            last_login_at: user.last_login_at,
        }
    }
}

#[derive(Serialize)]
pub struct TokenPairResponse {
    pub access: String,
    pub refresh: String,
}

impl From<SessionTokens> for TokenPairResponse {
    fn from(tokens: SessionTokens) -> Self {
        Self {
            access: tokens.access,
            refresh: tokens.refresh,
        }
    }
}

#[derive(Serialize)]
pub struct SessionResponse {
    pub user: UserResponse,
    pub tokens: TokenPairResponse,
}

// ── POST /api/v1/auth/register ───────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
}

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let usecase = RegisterUseCase {
        users: state.user_repo(),
        jwt_secret: state.jwt_secret.clone(),
    };
    let out = usecase
        .execute(RegisterInput {
            email: body.email,
            username: body.username,
            password: body.password,
        })
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(SessionResponse {
            user: out.user.into(),
            tokens: out.tokens.into(),
        }),
    ))
}

// ── POST /api/v1/auth/login ──────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct LoginRequest {
    /// Username or email.
    pub username: String,
    pub password: String,
}

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    let usecase = LoginUseCase {
        users: state.user_repo(),
        jwt_secret: state.jwt_secret.clone(),
    };
    let out = usecase
        .execute(LoginInput {
            username: body.username,
            password: body.password,
        })
        .await?;
    Ok(Json(SessionResponse {
        user: out.user.into(),
        tokens: out.tokens.into(),
    }))
}

// ── POST /api/v1/auth/token/refresh ──────────────────────────────────────────

#[derive(Deserialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

#[derive(Serialize)]
pub struct RefreshResponse {
    pub access: String,
}

pub async fn refresh_token(
    State(state): State<AppState>,
    Json(body): Json<RefreshRequest>,
) -> Result<Json<RefreshResponse>, ApiError> {
    let usecase = RefreshTokenUseCase {
        users: state.user_repo(),
        jwt_secret: state.jwt_secret.clone(),
    };
    let out = usecase.execute(&body.refresh).await?;
    Ok(Json(RefreshResponse {
        access: out.access_token,
    }))
}
