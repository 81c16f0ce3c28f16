use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};

use crate::domain::types::Item;
use crate::error::ApiError;
use crate::handlers::extract::Identity;
use crate::state::AppState;
use crate::usecase::item::{
    CreateItemInput, CreateItemUseCase, DeleteItemUseCase, GetItemUseCase, ListItemsUseCase,
    UpdateItemInput, UpdateItemUseCase,
};

#[derive(Serialize)]
pub struct ItemResponse {
    pub item_id: i64,
    pub name: String,
    pub description: String,
    #[serde(serialize_with = "nexin_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "nexin_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Item> for ItemResponse {
    fn from(item: Item) -> Self {
        Self {
            item_id: item.id,
            name: item.name,
            description: item.description,
            created_at: item.created_at,
            updated_at: item.updated_at,
        }
    }
}

// ── GET /api/v1/items ────────────────────────────────────────────────────────

pub async fn list_items(
    _identity: Identity,
    State(state): State<AppState>,
) -> Result<Json<Vec<ItemResponse>>, ApiError> {
    let usecase = ListItemsUseCase {
        items: state.item_repo(),
    };
    let items = usecase.execute().await?;
    Ok(Json(items.into_iter().map(Into::into).collect()))
}

// ── POST /api/v1/items ───────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateItemRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

pub async fn create_item(
    _identity: Identity,
    State(state): State<AppState>,
    Json(body): Json<CreateItemRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let usecase = CreateItemUseCase {
        items: state.item_repo(),
    };
    let item = usecase
        .execute(CreateItemInput {
            name: body.name,
            description: body.description,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(ItemResponse::from(item))))
}

// ── GET /api/v1/items/{item_id} ──────────────────────────────────────────────

pub async fn get_item(
    _identity: Identity,
    State(state): State<AppState>,
    Path(item_id): Path<i64>,
) -> Result<Json<ItemResponse>, ApiError> {
    let usecase = GetItemUseCase {
        items: state.item_repo(),
    };
    let item = usecase.execute(item_id).await?;
    Ok(Json(item.into()))
}

// ── PATCH /api/v1/items/{item_id} ────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateItemRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

pub async fn update_item(
    _identity: Identity,
    State(state): State<AppState>,
    Path(item_id): Path<i64>,
    Json(body): Json<UpdateItemRequest>,
) -> Result<Json<ItemResponse>, ApiError> {
    let usecase = UpdateItemUseCase {
        items: state.item_repo(),
    };
    let item = usecase
        .execute(
            item_id,
            UpdateItemInput {
                name: body.name,
                description: body.description,
            },
        )
        .await?;
    Ok(Json(item.into()))
}

// ── DELETE /api/v1/items/{item_id} ───────────────────────────────────────────

pub async fn delete_item(
    _identity: Identity,
    State(state): State<AppState>,
    Path(item_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let usecase = DeleteItemUseCase {
        items: state.item_repo(),
    };
    usecase.execute(item_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
