use chrono::Utc;
use rand::RngExt;
use uuid::Uuid;

use crate::domain::repository::AppRepository;
use crate::domain::types::App;
use crate::error::ApiError;
use crate::usecase::password::hash_password;

/// Charset for generating plaintext app secrets (URL-safe base64 alphabet).
const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

/// App secret length in characters.
const APP_SECRET_LEN: usize = 43;

fn generate_app_secret() -> String {
    let mut rng = rand::rng();
    (0..APP_SECRET_LEN)
        .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
        .collect()
}

// ── ListApps ─────────────────────────────────────────────────────────────────

pub struct ListAppsUseCase<A: AppRepository> {
    pub apps: A,
}

impl<A: AppRepository> ListAppsUseCase<A> {
    pub async fn execute(&self) -> Result<Vec<(App, String)>, ApiError> {
        self.apps.list_with_creator().await
    }
}

// ── CreateApp ────────────────────────────────────────────────────────────────

pub struct CreateAppInput {
    pub name: String,
    pub description: String,
}

#[derive(Debug)]
pub struct CreateAppOutput {
    pub app: App,
    /// Plaintext secret, exposed exactly once. Only the hash is stored.
    pub app_secret: String,
}

pub struct CreateAppUseCase<A: AppRepository> {
    pub apps: A,
}

impl<A: AppRepository> CreateAppUseCase<A> {
    pub async fn execute(
        &self,
        user_id: Uuid,
        input: CreateAppInput,
    ) -> Result<CreateAppOutput, ApiError> {
        if input.name.is_empty() {
            return Err(ApiError::MissingData);
        }
        let app_secret = generate_app_secret();
        let now = Utc::now();
        let app = App {
            id: Uuid::new_v4(),
            name: input.name,
            description: input.description,
            secret_hash: hash_password(&app_secret)?,
            created_by: user_id,
            created_at: now,
            updated_at: now,
        };
        self.apps.create(&app).await?;
        Ok(CreateAppOutput { app, app_secret })
    }
}

// ── GetApp ───────────────────────────────────────────────────────────────────

pub struct GetAppUseCase<A: AppRepository> {
    pub apps: A,
}

impl<A: AppRepository> GetAppUseCase<A> {
    pub async fn execute(&self, app_id: Uuid) -> Result<(App, String), ApiError> {
        self.apps
            .find_with_creator(app_id)
            .await?
            .ok_or(ApiError::AppNotFound)
    }
}

// ── UpdateApp ────────────────────────────────────────────────────────────────

pub struct UpdateAppInput {
    pub name: Option<String>,
    pub description: Option<String>,
}

pub struct UpdateAppUseCase<A: AppRepository> {
    pub apps: A,
}

impl<A: AppRepository> UpdateAppUseCase<A> {
    pub async fn execute(
        &self,
        user_id: Uuid,
        app_id: Uuid,
        input: UpdateAppInput,
    ) -> Result<(App, String), ApiError> {
        let (app, _) = self
            .apps
            .find_with_creator(app_id)
            .await?
            .ok_or(ApiError::AppNotFound)?;
        if app.created_by != user_id {
            return Err(ApiError::Forbidden);
        }
        if input.name.is_none() && input.description.is_none() {
            return Err(ApiError::MissingData);
        }
        self.apps
            .update_fields(app_id, input.name.as_deref(), input.description.as_deref())
            .await?;
        self.apps
            .find_with_creator(app_id)
            .await?
            .ok_or(ApiError::AppNotFound)
    }
}

// ── DeleteApp ────────────────────────────────────────────────────────────────

pub struct DeleteAppUseCase<A: AppRepository> {
    pub apps: A,
}

impl<A: AppRepository> DeleteAppUseCase<A> {
    pub async fn execute(&self, user_id: Uuid, app_id: Uuid) -> Result<(), ApiError> {
        let app = self
            .apps
            .find_by_id(app_id)
            .await?
            .ok_or(ApiError::AppNotFound)?;
        if app.created_by != user_id {
            return Err(ApiError::Forbidden);
        }
        self.apps.delete(app_id).await?;
        Ok(())
    }
}

// ── RegenerateAppSecret ──────────────────────────────────────────────────────

pub struct RegenerateAppSecretUseCase<A: AppRepository> {
    pub apps: A,
}

impl<A: AppRepository> RegenerateAppSecretUseCase<A> {
    pub async fn execute(&self, user_id: Uuid, app_id: Uuid) -> Result<String, ApiError> {
        let app = self
            .apps
            .find_by_id(app_id)
            .await?
            .ok_or(ApiError::AppNotFound)?;
        if app.created_by != user_id {
            return Err(ApiError::Forbidden);
        }
        let app_secret = generate_app_secret();
        self.apps
            .update_secret(app_id, &hash_password(&app_secret)?)
            .await?;
        Ok(app_secret)
    }
}
