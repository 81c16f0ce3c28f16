use std::net::SocketAddr;

use axum::{
    Json,
    extract::{ConnectInfo, Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::types::Server;
use crate::error::ApiError;
use crate::handlers::extract::Identity;
use crate::state::AppState;
use crate::usecase::server::{
    CreateServerInput, CreateServerUseCase, DeleteServerUseCase, GetServerUseCase,
    ListServersUseCase, UpdateServerInput, UpdateServerUseCase,
};

#[derive(Serialize)]
pub struct ServerResponse {
    pub server_id: Uuid,
    pub app_id: Uuid,
    pub server_name: String,
    pub server_description: String,
    pub game_modes: serde_json::Value,
    pub created_by_id: Uuid,
    pub created_by_username: String,
    pub ip_address: Option<String>,
    #[serde(serialize_with = "nexin_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl ServerResponse {
    fn new(server: Server, created_by_username: String) -> Self {
        Self {
            server_id: server.id,
            app_id: server.app_id,
            server_name: server.name,
            server_description: server.description,
            game_modes: server.game_modes,
            created_by_id: server.created_by,
            created_by_username,
            ip_address: server.ip_address,
            created_at: server.created_at,
        }
    }
}

/// Client IP: first `X-Forwarded-For` entry, falling back to the peer address.
fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
}

// ── GET /api/v1/apps/{app_id}/servers ────────────────────────────────────────

pub async fn list_servers(
    _identity: Identity,
    State(state): State<AppState>,
    Path(app_id): Path<Uuid>,
) -> Result<Json<Vec<ServerResponse>>, ApiError> {
    let usecase = ListServersUseCase {
        apps: state.app_repo(),
        servers: state.server_repo(),
    };
    let servers = usecase.execute(app_id).await?;
    Ok(Json(
        servers
            .into_iter()
            .map(|(server, username)| ServerResponse::new(server, username))
            .collect(),
    ))
}

// ── POST /api/v1/apps/{app_id}/servers ───────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateServerRequest {
    pub server_name: String,
    #[serde(default)]
    pub server_description: String,
    #[serde(default)]
    pub game_modes: Option<serde_json::Value>,
}

pub async fn create_server(
    identity: Identity,
    State(state): State<AppState>,
    Path(app_id): Path<Uuid>,
    headers: HeaderMap,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    Json(body): Json<CreateServerRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let ip_address = client_ip(&headers, Some(peer));
    let usecase = CreateServerUseCase {
        apps: state.app_repo(),
        servers: state.server_repo(),
    };
    let server = usecase
        .execute(
            identity.user_id,
            app_id,
            CreateServerInput {
                name: body.server_name,
                description: body.server_description,
                game_modes: body.game_modes.unwrap_or_else(|| serde_json::json!({})),
                ip_address,
            },
        )
        .await?;

    let usecase = GetServerUseCase {
        apps: state.app_repo(),
        servers: state.server_repo(),
    };
    let (server, username) = usecase.execute(app_id, server.id).await?;
    Ok((StatusCode::CREATED, Json(ServerResponse::new(server, username))))
}

// ── GET /api/v1/apps/{app_id}/servers/{server_id} ────────────────────────────

pub async fn get_server(
    _identity: Identity,
    State(state): State<AppState>,
    Path((app_id, server_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ServerResponse>, ApiError> {
    let usecase = GetServerUseCase {
        apps: state.app_repo(),
        servers: state.server_repo(),
    };
    let (server, username) = usecase.execute(app_id, server_id).await?;
    Ok(Json(ServerResponse::new(server, username)))
}

// ── PATCH /api/v1/apps/{app_id}/servers/{server_id} ──────────────────────────

#[derive(Deserialize)]
pub struct UpdateServerRequest {
    pub server_name: Option<String>,
    pub server_description: Option<String>,
    pub game_modes: Option<serde_json::Value>,
}

pub async fn update_server(
    identity: Identity,
    State(state): State<AppState>,
    Path((app_id, server_id)): Path<(Uuid, Uuid)>,
    Json(body): Json<UpdateServerRequest>,
) -> Result<Json<ServerResponse>, ApiError> {
    let usecase = UpdateServerUseCase {
        apps: state.app_repo(),
        servers: state.server_repo(),
    };
    let (server, username) = usecase
        .execute(
            identity.user_id,
            app_id,
            server_id,
            UpdateServerInput {
                name: body.server_name,
                description: body.server_description,
                game_modes: body.game_modes,
            },
        )
        .await?;
    Ok(Json(ServerResponse::new(server, username)))
}

// ── DELETE /api/v1/apps/{app_id}/servers/{server_id} ─────────────────────────

pub async fn delete_server(
    identity: Identity,
    State(state): State<AppState>,
    Path((app_id, server_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    let usecase = DeleteServerUseCase {
        apps: state.app_repo(),
        servers: state.server_repo(),
    };
    usecase.execute(identity.user_id, app_id, server_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
