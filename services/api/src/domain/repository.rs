#![allow(async_fn_in_trait)]

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::types::{App, Item, OneTimeToken, Server, User};
use crate::error::ApiError;

/// Repository for user accounts.
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, ApiError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, ApiError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ApiError>;

    async fn create(&self, user: &User) -> Result<(), ApiError>;

    /// Set `last_login_at` and nothing else. `updated_at` must stay untouched —
    /// a login is not a profile mutation.
    async fn update_last_login(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), ApiError>;
}

/// Repository for apps. List/get variants return the creator's username
/// alongside the app for response rendering.
pub trait AppRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<App>, ApiError>;
    async fn find_with_creator(&self, id: Uuid) -> Result<Option<(App, String)>, ApiError>;
    async fn list_with_creator(&self) -> Result<Vec<(App, String)>, ApiError>;

    async fn create(&self, app: &App) -> Result<(), ApiError>;

    /// Partial update of name/description; bumps `updated_at`.
    async fn update_fields(
        &self,
        id: Uuid,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<(), ApiError>;

    /// Replace the stored secret hash; bumps `updated_at`.
    async fn update_secret(&self, id: Uuid, secret_hash: &str) -> Result<(), ApiError>;

    /// Delete an app. Returns `true` if deleted, `false` if not found.
    async fn delete(&self, id: Uuid) -> Result<bool, ApiError>;
}

/// Repository for game servers.
pub trait ServerRepository: Send + Sync {
    async fn find_in_app(
        &self,
        app_id: Uuid,
        server_id: Uuid,
    ) -> Result<Option<(Server, String)>, ApiError>;
    async fn list_by_app(&self, app_id: Uuid) -> Result<Vec<(Server, String)>, ApiError>;

    async fn create(&self, server: &Server) -> Result<(), ApiError>;

    /// Partial update of name/description/game_modes.
    async fn update_fields(
        &self,
        id: Uuid,
        name: Option<&str>,
        description: Option<&str>,
        game_modes: Option<&serde_json::Value>,
    ) -> Result<(), ApiError>;

    async fn delete(&self, id: Uuid) -> Result<bool, ApiError>;
}

/// Repository for items.
pub trait ItemRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Item>, ApiError>;
    async fn list_all(&self) -> Result<Vec<Item>, ApiError>;

    /// Insert an item, returning it with its database-assigned id.
    async fn create(&self, item: &Item) -> Result<Item, ApiError>;

    async fn update_fields(
        &self,
        id: i64,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<(), ApiError>;

    async fn delete(&self, id: i64) -> Result<bool, ApiError>;
}

/// Repository for outstanding one-time tokens. The sole shared mutable state
/// with cross-request invariants; both operations must be atomic under
/// concurrent callers.
pub trait OneTimeTokenRepository: Send + Sync {
    /// Supersession: delete any row for `(token.user_id, token.app_id)` and
    /// insert the new row, in one transaction. Two concurrent calls for the
    /// same pair leave exactly one row behind — never zero, never two.
    async fn replace(&self, token: &OneTimeToken) -> Result<(), ApiError>;

    /// Consume-on-read: atomically remove and return the row for `jti`.
    /// Of two concurrent calls with the same `jti`, exactly one gets the row;
    /// the other observes `None`.
    async fn take(&self, jti: &str) -> Result<Option<OneTimeToken>, ApiError>;
}
