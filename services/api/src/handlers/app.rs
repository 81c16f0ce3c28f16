use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::repository::UserRepository as _;
use crate::domain::types::App;
use crate::error::ApiError;
use crate::handlers::extract::Identity;
use crate::state::AppState;
use crate::usecase::app::{
    CreateAppInput, CreateAppUseCase, DeleteAppUseCase, GetAppUseCase, ListAppsUseCase,
    RegenerateAppSecretUseCase, UpdateAppInput, UpdateAppUseCase,
};

#[derive(Serialize)]
pub struct AppResponse {
    pub app_id: Uuid,
    pub name: String,
    pub description: String,
    #[serde(serialize_with = "nexin_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "nexin_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
    pub created_by_id: Uuid,
    pub created_by_username: String,
    /// Plaintext secret, present only in the create response.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_secret: Option<String>,
}

impl AppResponse {
    fn new(app: App, created_by_username: String) -> Self {
        Self {
            app_id: app.id,
            name: app.name,
            description: app.description,
            created_at: app.created_at,
            updated_at: app.updated_at,
            created_by_id: app.created_by,
            created_by_username,
            app_secret: None,
        }
    }
}

// ── GET /api/v1/apps ─────────────────────────────────────────────────────────

pub async fn list_apps(
    _identity: Identity,
    State(state): State<AppState>,
) -> Result<Json<Vec<AppResponse>>, ApiError> {
    let usecase = ListAppsUseCase {
        apps: state.app_repo(),
    };
    let apps = usecase.execute().await?;
    Ok(Json(
        apps.into_iter()
            .map(|(app, username)| AppResponse::new(app, username))
            .collect(),
    ))
}

// ── POST /api/v1/apps ────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateAppRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

pub async fn create_app(
    identity: Identity,
    State(state): State<AppState>,
    Json(body): Json<CreateAppRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let usecase = CreateAppUseCase {
        apps: state.app_repo(),
    };
    let out = usecase
        .execute(
            identity.user_id,
            CreateAppInput {
                name: body.name,
                description: body.description,
            },
        )
        .await?;

    let user = state
        .user_repo()
        .find_by_id(identity.user_id)
        .await?
        .ok_or(ApiError::UserNotFound)?;

    let mut response = AppResponse::new(out.app, user.username);
    response.app_secret = Some(out.app_secret);
    Ok((StatusCode::CREATED, Json(response)))
}

// ── GET /api/v1/apps/{app_id} ────────────────────────────────────────────────

pub async fn get_app(
    _identity: Identity,
    State(state): State<AppState>,
    Path(app_id): Path<Uuid>,
) -> Result<Json<AppResponse>, ApiError> {
    let usecase = GetAppUseCase {
        apps: state.app_repo(),
    };
    let (app, username) = usecase.execute(app_id).await?;
    Ok(Json(AppResponse::new(app, username)))
}

// ── PATCH /api/v1/apps/{app_id} ──────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateAppRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

pub async fn update_app(
    identity: Identity,
    State(state): State<AppState>,
    Path(app_id): Path<Uuid>,
    Json(body): Json<UpdateAppRequest>,
) -> Result<Json<AppResponse>, ApiError> {
    let usecase = UpdateAppUseCase {
        apps: state.app_repo(),
    };
    let (app, username) = usecase
        .execute(
            identity.user_id,
            app_id,
            UpdateAppInput {
                name: body.name,
                description: body.description,
            },
        )
        .await?;
    Ok(Json(AppResponse::new(app, username)))
}

// ── DELETE /api/v1/apps/{app_id} ─────────────────────────────────────────────

pub async fn delete_app(
    identity: Identity,
    State(state): State<AppState>,
    Path(app_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let usecase = DeleteAppUseCase {
        apps: state.app_repo(),
    };
    usecase.execute(identity.user_id, app_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── POST /api/v1/apps/{app_id}/regenerate-secret ─────────────────────────────

#[derive(Serialize)]
pub struct RegenerateSecretResponse {
    pub app_secret: String,
}

pub async fn regenerate_app_secret(
    identity: Identity,
    State(state): State<AppState>,
    Path(app_id): Path<Uuid>,
) -> Result<Json<RegenerateSecretResponse>, ApiError> {
    let usecase = RegenerateAppSecretUseCase {
        apps: state.app_repo(),
    };
    let app_secret = usecase.execute(identity.user_id, app_id).await?;
    Ok(Json(RegenerateSecretResponse { app_secret }))
}
