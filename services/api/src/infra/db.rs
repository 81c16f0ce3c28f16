use anyhow::Context as _;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, TransactionTrait,
};
use uuid::Uuid;

use nexin_api_schema::{apps, items, one_time_tokens, servers, users};

use crate::domain::repository::{
    AppRepository, ItemRepository, OneTimeTokenRepository, ServerRepository, UserRepository,
};
use crate::domain::types::{App, Item, OneTimeToken, Server, User};
use crate::error::ApiError;

// ── User repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
}

impl UserRepository for DbUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, ApiError> {
        let model = users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find user by id")?;
        Ok(model.map(user_from_model))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, ApiError> {
        let model = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.db)
            .await
            .context("find user by username")?;
        Ok(model.map(user_from_model))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ApiError> {
        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await
            .context("find user by email")?;
        Ok(model.map(user_from_model))
    }

    async fn create(&self, user: &User) -> Result<(), ApiError> {
        users::ActiveModel {
            id: Set(user.id),
            email: Set(user.email.clone()),
            username: Set(user.username.clone()),
            password_hash: Set(user.password_hash.clone()),
            is_active: Set(user.is_active),
            created_at: Set(user.created_at),
            updated_at: Set(user.updated_at),
            last_login_at: Set(user.last_login_at),
        }
        .insert(&self.db)
        .await
        .context("create user")?;
        Ok(())
    }

    async fn update_last_login(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), ApiError> {
        // Deliberately leaves updated_at alone — a login is not a profile edit.
        users::ActiveModel {
            id: Set(id),
            last_login_at: Set(Some(at)),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("update last login")?;
        Ok(())
    }
}

fn user_from_model(model: users::Model) -> User {
    User {
        id: model.id,
        email: model.email,
        username: model.username,
        password_hash: model.password_hash,
        is_active: model.is_active,
        created_at: model.created_at,
        updated_at: model.updated_at,
        last_login_at: model.last_login_at,
    }
}

// ── App repository ───────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbAppRepository {
    pub db: DatabaseConnection,
}

impl AppRepository for DbAppRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<App>, ApiError> {
        let model = apps::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find app by id")?;
        Ok(model.map(app_from_model))
    }

    async fn find_with_creator(&self, id: Uuid) -> Result<Option<(App, String)>, ApiError> {
        let found = apps::Entity::find_by_id(id)
            .find_also_related(users::Entity)
            .one(&self.db)
            .await
            .context("find app with creator")?;
        Ok(found.map(app_with_creator))
    }

    async fn list_with_creator(&self) -> Result<Vec<(App, String)>, ApiError> {
        let found = apps::Entity::find()
            .find_also_related(users::Entity)
            .order_by_desc(apps::Column::CreatedAt)
            .all(&self.db)
            .await
            .context("list apps with creator")?;
        Ok(found.into_iter().map(app_with_creator).collect())
    }

    async fn create(&self, app: &App) -> Result<(), ApiError> {
        apps::ActiveModel {
            id: Set(app.id),
            name: Set(app.name.clone()),
            description: Set(app.description.clone()),
            secret_hash: Set(app.secret_hash.clone()),
            created_by: Set(app.created_by),
            created_at: Set(app.created_at),
            updated_at: Set(app.updated_at),
        }
        .insert(&self.db)
        .await
        .context("create app")?;
        Ok(())
    }

    async fn update_fields(
        &self,
        id: Uuid,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<(), ApiError> {
        let mut am = apps::ActiveModel {
            id: Set(id),
            ..Default::default()
        };
        if let Some(name) = name {
            am.name = Set(name.to_owned());
        }
        if let Some(description) = description {
            am.description = Set(description.to_owned());
        }
        am.updated_at = Set(Utc::now());
        am.update(&self.db).await.context("update app fields")?;
        Ok(())
    }

    async fn update_secret(&self, id: Uuid, secret_hash: &str) -> Result<(), ApiError> {
        apps::ActiveModel {
            id: Set(id),
            secret_hash: Set(secret_hash.to_owned()),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("update app secret")?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ApiError> {
        let result = apps::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete app")?;
        Ok(result.rows_affected > 0)
    }
}

fn app_from_model(model: apps::Model) -> App {
    App {
        id: model.id,
        name: model.name,
        description: model.description,
        secret_hash: model.secret_hash,
        created_by: model.created_by,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

fn app_with_creator((app, user): (apps::Model, Option<users::Model>)) -> (App, String) {
    let username = user.map(|u| u.username).unwrap_or_default();
    (app_from_model(app), username)
}

// ── Server repository ────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbServerRepository {
    pub db: DatabaseConnection,
}

impl ServerRepository for DbServerRepository {
    async fn find_in_app(
        &self,
        app_id: Uuid,
        server_id: Uuid,
    ) -> Result<Option<(Server, String)>, ApiError> {
        let found = servers::Entity::find_by_id(server_id)
            .filter(servers::Column::AppId.eq(app_id))
            .find_also_related(users::Entity)
            .one(&self.db)
            .await
            .context("find server in app")?;
        Ok(found.map(server_with_creator))
    }

    async fn list_by_app(&self, app_id: Uuid) -> Result<Vec<(Server, String)>, ApiError> {
        let found = servers::Entity::find()
            .filter(servers::Column::AppId.eq(app_id))
            .find_also_related(users::Entity)
            .order_by_desc(servers::Column::CreatedAt)
            .all(&self.db)
            .await
            .context("list servers by app")?;
        Ok(found.into_iter().map(server_with_creator).collect())
    }

    async fn create(&self, server: &Server) -> Result<(), ApiError> {
        servers::ActiveModel {
            id: Set(server.id),
            app_id: Set(server.app_id),
            name: Set(server.name.clone()),
            description: Set(server.description.clone()),
            game_modes: Set(server.game_modes.clone()),
            created_by: Set(server.created_by),
            ip_address: Set(server.ip_address.clone()),
            created_at: Set(server.created_at),
        }
        .insert(&self.db)
        .await
        .context("create server")?;
        Ok(())
    }

    async fn update_fields(
        &self,
        id: Uuid,
        name: Option<&str>,
        description: Option<&str>,
        game_modes: Option<&serde_json::Value>,
    ) -> Result<(), ApiError> {
        let mut am = servers::ActiveModel {
            id: Set(id),
            ..Default::default()
        };
        if let Some(name) = name {
            am.name = Set(name.to_owned());
        }
        if let Some(description) = description {
            am.description = Set(description.to_owned());
        }
        if let Some(game_modes) = game_modes {
            am.game_modes = Set(game_modes.clone());
        }
        am.update(&self.db).await.context("update server fields")?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ApiError> {
        let result = servers::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete server")?;
        Ok(result.rows_affected > 0)
    }
}

fn server_from_model(model: servers::Model) -> Server {
    Server {
        id: model.id,
        app_id: model.app_id,
        name: model.name,
        description: model.description,
        game_modes: model.game_modes,
        created_by: model.created_by,
        ip_address: model.ip_address,
        created_at: model.created_at,
    }
}

fn server_with_creator((server, user): (servers::Model, Option<users::Model>)) -> (Server, String) {
    let username = user.map(|u| u.username).unwrap_or_default();
    (server_from_model(server), username)
}

// ── Item repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbItemRepository {
    pub db: DatabaseConnection,
}

impl ItemRepository for DbItemRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Item>, ApiError> {
        let model = items::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find item by id")?;
        Ok(model.map(item_from_model))
    }

    async fn list_all(&self) -> Result<Vec<Item>, ApiError> {
        let models = items::Entity::find()
            .order_by_desc(items::Column::CreatedAt)
            .all(&self.db)
            .await
            .context("list items")?;
        Ok(models.into_iter().map(item_from_model).collect())
    }

    async fn create(&self, item: &Item) -> Result<Item, ApiError> {
        let model = items::ActiveModel {
            name: Set(item.name.clone()),
            description: Set(item.description.clone()),
            created_at: Set(item.created_at),
            updated_at: Set(item.updated_at),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .context("create item")?;
        Ok(item_from_model(model))
    }

    async fn update_fields(
        &self,
        id: i64,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<(), ApiError> {
        let mut am = items::ActiveModel {
            id: Set(id),
            ..Default::default()
        };
        if let Some(name) = name {
            am.name = Set(name.to_owned());
        }
        if let Some(description) = description {
            am.description = Set(description.to_owned());
        }
        am.updated_at = Set(Utc::now());
        am.update(&self.db).await.context("update item fields")?;
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<bool, ApiError> {
        let result = items::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete item")?;
        Ok(result.rows_affected > 0)
    }
}

fn item_from_model(model: items::Model) -> Item {
    Item {
        id: model.id,
        name: model.name,
        description: model.description,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

// ── One-time-token repository ────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbOneTimeTokenRepository {
    pub db: DatabaseConnection,
}

impl OneTimeTokenRepository for DbOneTimeTokenRepository {
    async fn replace(&self, token: &OneTimeToken) -> Result<(), ApiError> {
        // Supersession must be atomic: delete-old and insert-new land together
        // or not at all, so concurrent issuance for one (user, app) pair can
        // never leave zero or two rows behind.
        self.db
            .transaction::<_, (), sea_orm::DbErr>(|txn| {
                let token = token.clone();
                Box::pin(async move {
                    one_time_tokens::Entity::delete_many()
                        .filter(one_time_tokens::Column::UserId.eq(token.user_id))
                        .filter(one_time_tokens::Column::AppId.eq(token.app_id))
                        .exec(txn)
                        .await?;
                    one_time_tokens::ActiveModel {
                        jti: Set(token.jti),
                        user_id: Set(token.user_id),
                        app_id: Set(token.app_id),
                        expires_at: Set(token.expires_at),
                    }
                    .insert(txn)
                    .await?;
                    Ok(())
                })
            })
            .await
            .context("replace one-time token")?;
        Ok(())
    }

    async fn take(&self, jti: &str) -> Result<Option<OneTimeToken>, ApiError> {
        let model = one_time_tokens::Entity::find_by_id(jti)
            .one(&self.db)
            .await
            .context("find one-time token")?;
        let Some(model) = model else {
            return Ok(None);
        };
        // The delete is a single statement keyed by primary key: of two racing
        // consumers exactly one sees rows_affected == 1. The loser reports
        // absence, so no jti can ever be consumed twice.
        let result = one_time_tokens::Entity::delete_many()
            .filter(one_time_tokens::Column::Jti.eq(jti))
            .exec(&self.db)
            .await
            .context("consume one-time token")?;
        if result.rows_affected == 0 {
            return Ok(None);
        }
        Ok(Some(OneTimeToken {
            jti: model.jti,
            user_id: model.user_id,
            app_id: model.app_id,
            expires_at: model.expires_at,
        }))
    }
}
