use sea_orm::DatabaseConnection;

use crate::infra::db::{
    DbAppRepository, DbItemRepository, DbOneTimeTokenRepository, DbServerRepository,
    DbUserRepository,
};

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub jwt_secret: String,
}

impl AppState {
    pub fn user_repo(&self) -> DbUserRepository {
        DbUserRepository {
            db: self.db.clone(),
        }
    }

    pub fn app_repo(&self) -> DbAppRepository {
        DbAppRepository {
            db: self.db.clone(),
        }
    }

    pub fn server_repo(&self) -> DbServerRepository {
        DbServerRepository {
            db: self.db.clone(),
        }
    }

    pub fn item_repo(&self) -> DbItemRepository {
        DbItemRepository {
            db: self.db.clone(),
        }
    }

    pub fn one_time_token_repo(&self) -> DbOneTimeTokenRepository {
        DbOneTimeTokenRepository {
            db: self.db.clone(),
        }
    }
}
