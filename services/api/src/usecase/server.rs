use chrono::Utc;
use uuid::Uuid;

use crate::domain::repository::{AppRepository, ServerRepository};
use crate::domain::types::Server;
use crate::error::ApiError;

// ── ListServers ──────────────────────────────────────────────────────────────

pub struct ListServersUseCase<A: AppRepository, S: ServerRepository> {
    pub apps: A,
    pub servers: S,
}

impl<A: AppRepository, S: ServerRepository> ListServersUseCase<A, S> {
    pub async fn execute(&self, app_id: Uuid) -> Result<Vec<(Server, String)>, ApiError> {
        if self.apps.find_by_id(app_id).await?.is_none() {
            return Err(ApiError::AppNotFound);
        }
        self.servers.list_by_app(app_id).await
    }
}

// ── CreateServer ─────────────────────────────────────────────────────────────

pub struct CreateServerInput {
    pub name: String,
    pub description: String,
    pub game_modes: serde_json::Value,
    /// Captured server-side from the request, never client-supplied.
    pub ip_address: Option<String>,
}

pub struct CreateServerUseCase<A: AppRepository, S: ServerRepository> {
    pub apps: A,
    pub servers: S,
}

impl<A: AppRepository, S: ServerRepository> CreateServerUseCase<A, S> {
    pub async fn execute(
        &self,
        user_id: Uuid,
        app_id: Uuid,
        input: CreateServerInput,
    ) -> Result<Server, ApiError> {
        let app = self
            .apps
            .find_by_id(app_id)
            .await?
            .ok_or(ApiError::AppNotFound)?;
        if input.name.is_empty() {
            return Err(ApiError::MissingData);
        }
        let server = Server {
            id: Uuid::new_v4(),
            app_id: app.id,
            name: input.name,
            description: input.description,
            game_modes: input.game_modes,
            created_by: user_id,
            ip_address: input.ip_address,
            created_at: Utc::now(),
        };
        self.servers.create(&server).await?;
        Ok(server)
    }
}

// ── GetServer ────────────────────────────────────────────────────────────────

pub struct GetServerUseCase<A: AppRepository, S: ServerRepository> {
    pub apps: A,
    pub servers: S,
}

impl<A: AppRepository, S: ServerRepository> GetServerUseCase<A, S> {
    pub async fn execute(
        &self,
        app_id: Uuid,
        server_id: Uuid,
    ) -> Result<(Server, String), ApiError> {
        if self.apps.find_by_id(app_id).await?.is_none() {
            return Err(ApiError::AppNotFound);
        }
        self.servers
            .find_in_app(app_id, server_id)
            .await?
            .ok_or(ApiError::ServerNotFound)
    }
}

// ── UpdateServer ─────────────────────────────────────────────────────────────

pub struct UpdateServerInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub game_modes: Option<serde_json::Value>,
}

pub struct UpdateServerUseCase<A: AppRepository, S: ServerRepository> {
    pub apps: A,
    pub servers: S,
}

impl<A: AppRepository, S: ServerRepository> UpdateServerUseCase<A, S> {
    pub async fn execute(
        &self,
        user_id: Uuid,
        app_id: Uuid,
        server_id: Uuid,
        input: UpdateServerInput,
    ) -> Result<(Server, String), ApiError> {
        if self.apps.find_by_id(app_id).await?.is_none() {
            return Err(ApiError::AppNotFound);
        }
        let (server, _) = self
            .servers
            .find_in_app(app_id, server_id)
            .await?
            .ok_or(ApiError::ServerNotFound)?;
        // Only the registering user may modify a server, unlike app reads
        // which are open to all authenticated users.
        if server.created_by != user_id {
            return Err(ApiError::Forbidden);
        }
        self.servers
            .update_fields(
                server_id,
                input.name.as_deref(),
                input.description.as_deref(),
                input.game_modes.as_ref(),
            )
            .await?;
        self.servers
            .find_in_app(app_id, server_id)
            .await?
            .ok_or(ApiError::ServerNotFound)
    }
}

// ── DeleteServer ─────────────────────────────────────────────────────────────

pub struct DeleteServerUseCase<A: AppRepository, S: ServerRepository> {
    pub apps: A,
    pub servers: S,
}

impl<A: AppRepository, S: ServerRepository> DeleteServerUseCase<A, S> {
    pub async fn execute(
        &self,
        user_id: Uuid,
        app_id: Uuid,
        server_id: Uuid,
    ) -> Result<(), ApiError> {
        if self.apps.find_by_id(app_id).await?.is_none() {
            return Err(ApiError::AppNotFound);
        }
        let (server, _) = self
            .servers
            .find_in_app(app_id, server_id)
            .await?
            .ok_or(ApiError::ServerNotFound)?;
        if server.created_by != user_id {
            return Err(ApiError::Forbidden);
        }
        self.servers.delete(server_id).await?;
        Ok(())
    }
}
