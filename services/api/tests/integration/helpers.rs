use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use nexin_api::domain::repository::{AppRepository, OneTimeTokenRepository, UserRepository};
use nexin_api::domain::types::{App, OneTimeToken, User};
use nexin_api::error::ApiError;
use nexin_api::usecase::password::hash_password;

pub const TEST_JWT_SECRET: &str = "test-jwt-secret-for-unit-tests-only";

// ── MockUserRepo ─────────────────────────────────────────────────────────────

pub struct MockUserRepo {
    pub users: Arc<Mutex<Vec<User>>>,
}

impl MockUserRepo {
    pub fn new(users: Vec<User>) -> Self {
        Self {
            users: Arc::new(Mutex::new(users)),
        }
    }

    pub fn empty() -> Self {
        Self::new(vec![])
    }

    /// Shared handle to the internal user list for post-execution inspection.
    pub fn users_handle(&self) -> Arc<Mutex<Vec<User>>> {
        Arc::clone(&self.users)
    }
}

impl UserRepository for MockUserRepo {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, ApiError> {
        Ok(self.users.lock().unwrap().iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, ApiError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ApiError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn create(&self, user: &User) -> Result<(), ApiError> {
        self.users.lock().unwrap().push(user.clone());
        Ok(())
    }

    async fn update_last_login(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), ApiError> {
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.iter_mut().find(|u| u.id == id) {
            // Mirrors the real repository: last_login_at only, updated_at untouched.
            user.last_login_at = Some(at);
        }
        Ok(())
    }
}

// ── MockAppRepo ──────────────────────────────────────────────────────────────

pub struct MockAppRepo {
    pub apps: Arc<Mutex<Vec<App>>>,
    /// (user id, username) pairs for creator-name lookups.
    pub creators: Vec<(Uuid, String)>,
}

impl MockAppRepo {
    pub fn new(apps: Vec<App>, creators: Vec<(Uuid, String)>) -> Self {
        Self {
            apps: Arc::new(Mutex::new(apps)),
            creators,
        }
    }

    pub fn empty() -> Self {
        Self::new(vec![], vec![])
    }

    pub fn apps_handle(&self) -> Arc<Mutex<Vec<App>>> {
        Arc::clone(&self.apps)
    }

    fn creator_name(&self, id: Uuid) -> String {
        self.creators
            .iter()
            .find(|(creator_id, _)| *creator_id == id)
            .map(|(_, name)| name.clone())
            .unwrap_or_else(|| "unknown".to_owned())
    }
}

impl AppRepository for MockAppRepo {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<App>, ApiError> {
        Ok(self.apps.lock().unwrap().iter().find(|a| a.id == id).cloned())
    }

    async fn find_with_creator(&self, id: Uuid) -> Result<Option<(App, String)>, ApiError> {
        Ok(self
            .apps
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .map(|a| {
                let name = self.creator_name(a.created_by);
                (a, name)
            }))
    }

    async fn list_with_creator(&self) -> Result<Vec<(App, String)>, ApiError> {
        Ok(self
            .apps
            .lock()
            .unwrap()
            .iter()
            .cloned()
            .map(|a| {
                let name = self.creator_name(a.created_by);
                (a, name)
            })
            .collect())
    }

    async fn create(&self, app: &App) -> Result<(), ApiError> {
        self.apps.lock().unwrap().push(app.clone());
        Ok(())
    }

    async fn update_fields(
        &self,
        id: Uuid,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<(), ApiError> {
        let mut apps = self.apps.lock().unwrap();
        if let Some(app) = apps.iter_mut().find(|a| a.id == id) {
            if let Some(name) = name {
                app.name = name.to_owned();
            }
            if let Some(description) = description {
                app.description = description.to_owned();
            }
            app.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn update_secret(&self, id: Uuid, secret_hash: &str) -> Result<(), ApiError> {
        let mut apps = self.apps.lock().unwrap();
        if let Some(app) = apps.iter_mut().find(|a| a.id == id) {
            app.secret_hash = secret_hash.to_owned();
            app.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ApiError> {
        let mut apps = self.apps.lock().unwrap();
        let before = apps.len();
        apps.retain(|a| a.id != id);
        Ok(apps.len() < before)
    }
}

// ── MockOneTimeTokenRepo ─────────────────────────────────────────────────────

pub struct MockOneTimeTokenRepo {
    pub rows: Arc<Mutex<Vec<OneTimeToken>>>,
}

impl MockOneTimeTokenRepo {
    pub fn new(rows: Vec<OneTimeToken>) -> Self {
        Self {
            rows: Arc::new(Mutex::new(rows)),
        }
    }

    pub fn empty() -> Self {
        Self::new(vec![])
    }

    pub fn rows_handle(&self) -> Arc<Mutex<Vec<OneTimeToken>>> {
        Arc::clone(&self.rows)
    }
}

impl OneTimeTokenRepository for MockOneTimeTokenRepo {
    async fn replace(&self, token: &OneTimeToken) -> Result<(), ApiError> {
        let mut rows = self.rows.lock().unwrap();
        rows.retain(|t| !(t.user_id == token.user_id && t.app_id == token.app_id));
        rows.push(token.clone());
        Ok(())
    }

    async fn take(&self, jti: &str) -> Result<Option<OneTimeToken>, ApiError> {
        let mut rows = self.rows.lock().unwrap();
        let pos = rows.iter().position(|t| t.jti == jti);
        Ok(pos.map(|i| rows.remove(i)))
    }
}

// ── Test fixture helpers ─────────────────────────────────────────────────────

pub fn test_user(username: &str, password: &str) -> User {
    let now = Utc::now();
    User {
        id: Uuid::new_v4(),
        email: format!("{username}@example.com"),
        username: username.to_owned(),
        password_hash: hash_password(password).unwrap(),
        is_active: true,
        created_at: now,
        updated_at: now,
        last_login_at: None,
    }
}

pub fn test_app(name: &str, created_by: Uuid) -> App {
    let now = Utc::now();
    App {
        id: Uuid::new_v4(),
        name: name.to_owned(),
        description: String::new(),
        secret_hash: hash_password("app-secret").unwrap(),
        created_by,
        created_at: now,
        updated_at: now,
    }
}
