use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use crate::handlers::extract::Identity;
use crate::state::AppState;
use crate::usecase::one_time_token::{IssueOneTimeTokenUseCase, ValidateOneTimeTokenUseCase};

// ── POST /api/v1/apps/{app_id}/one-time-token ────────────────────────────────

#[derive(Serialize)]
pub struct IssueResponse {
    pub token: String,
    pub expires_in: i64,
}

pub async fn issue_one_time_token(
    identity: Identity,
    State(state): State<AppState>,
    Path(app_id): Path<Uuid>,
) -> Result<Json<IssueResponse>, ApiError> {
    let usecase = IssueOneTimeTokenUseCase {
        apps: state.app_repo(),
        tokens: state.one_time_token_repo(),
        jwt_secret: state.jwt_secret.clone(),
    };
    let out = usecase.execute(identity.user_id, app_id).await?;
    Ok(Json(IssueResponse {
        token: out.token,
        expires_in: out.expires_in,
    }))
}

// ── POST /api/v1/one-time-token/validate ─────────────────────────────────────
//
// Deliberately unauthenticated: the token itself is the credential.

#[derive(Deserialize, Default)]
pub struct ValidateRequest {
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Serialize)]
pub struct ValidateResponse {
    pub user_id: Uuid,
    pub username: String,
    pub app_id: Uuid,
}

pub async fn validate_one_time_token(
    State(state): State<AppState>,
    body: Option<Json<ValidateRequest>>,
) -> Result<Json<ValidateResponse>, ApiError> {
    let token = body
        .and_then(|Json(body)| body.token)
        .ok_or(ApiError::MissingToken)?;

    let usecase = ValidateOneTimeTokenUseCase {
        users: state.user_repo(),
        tokens: state.one_time_token_repo(),
        jwt_secret: state.jwt_secret.clone(),
    };
    let out = usecase.execute(&token).await?;
    Ok(Json(ValidateResponse {
        user_id: out.user_id,
        username: out.username,
        app_id: out.app_id,
    }))
}
