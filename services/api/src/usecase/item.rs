use chrono::Utc;

use crate::domain::repository::ItemRepository;
use crate::domain::types::Item;
use crate::error::ApiError;

// ── ListItems ────────────────────────────────────────────────────────────────

pub struct ListItemsUseCase<I: ItemRepository> {
    pub items: I,
}

impl<I: ItemRepository> ListItemsUseCase<I> {
    pub async fn execute(&self) -> Result<Vec<Item>, ApiError> {
        self.items.list_all().await
    }
}

// ── CreateItem ───────────────────────────────────────────────────────────────

pub struct CreateItemInput {
    pub name: String,
    pub description: String,
}

pub struct CreateItemUseCase<I: ItemRepository> {
    pub items: I,
}

impl<I: ItemRepository> CreateItemUseCase<I> {
    pub async fn execute(&self, input: CreateItemInput) -> Result<Item, ApiError> {
        if input.name.is_empty() {
            return Err(ApiError::MissingData);
        }
        let now = Utc::now();
        self.items
            .create(&Item {
                id: 0, // assigned by the database
                name: input.name,
                description: input.description,
                created_at: now,
                updated_at: now,
            })
            .await
    }
}

// ── GetItem ──────────────────────────────────────────────────────────────────

pub struct GetItemUseCase<I: ItemRepository> {
    pub items: I,
}

impl<I: ItemRepository> GetItemUseCase<I> {
    pub async fn execute(&self, id: i64) -> Result<Item, ApiError> {
        self.items
            .find_by_id(id)
            .await?
            .ok_or(ApiError::ItemNotFound)
    }
}

// ── UpdateItem ───────────────────────────────────────────────────────────────

pub struct UpdateItemInput {
    pub name: Option<String>,
    pub description: Option<String>,
}

pub struct UpdateItemUseCase<I: ItemRepository> {
    pub items: I,
}

impl<I: ItemRepository> UpdateItemUseCase<I> {
    pub async fn execute(&self, id: i64, input: UpdateItemInput) -> Result<Item, ApiError> {
        if self.items.find_by_id(id).await?.is_none() {
            return Err(ApiError::ItemNotFound);
        }
        if input.name.is_none() && input.description.is_none() {
            return Err(ApiError::MissingData);
        }
        self.items
            .update_fields(id, input.name.as_deref(), input.description.as_deref())
            .await?;
        self.items
            .find_by_id(id)
            .await?
            .ok_or(ApiError::ItemNotFound)
    }
}

// ── DeleteItem ───────────────────────────────────────────────────────────────

pub struct DeleteItemUseCase<I: ItemRepository> {
    pub items: I,
}

impl<I: ItemRepository> DeleteItemUseCase<I> {
    pub async fn execute(&self, id: i64) -> Result<(), ApiError> {
        if !self.items.delete(id).await? {
            return Err(ApiError::ItemNotFound);
        }
        Ok(())
    }
}
