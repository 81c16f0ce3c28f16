use chrono::{DateTime, Utc};
use uuid::Uuid;

/// User account. `password_hash` is an argon2 PHC string.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

/// User-created app, the binding target of one-time tokens.
#[derive(Debug, Clone)]
pub struct App {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub secret_hash: String,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Game server registered under an app.
#[derive(Debug, Clone)]
pub struct Server {
    pub id: Uuid,
    pub app_id: Uuid,
    pub name: String,
    pub description: String,
    pub game_modes: serde_json::Value,
    pub created_by: Uuid,
    pub ip_address: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Free-standing demo resource.
#[derive(Debug, Clone)]
pub struct Item {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Outstanding single-use token row. At most one per (user, app) pair;
/// immutable between insertion and deletion.
#[derive(Debug, Clone)]
pub struct OneTimeToken {
    pub jti: String,
    pub user_id: Uuid,
    pub app_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

impl OneTimeToken {
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

/// Access-token time-to-live in seconds.
pub const ACCESS_TOKEN_TTL_SECS: u64 = 3600;

/// Refresh-token time-to-live in seconds (7 days).
pub const REFRESH_TOKEN_TTL_SECS: u64 = 604_800;

/// One-time-token time-to-live in seconds. Fixed, not configurable per call.
pub const ONE_TIME_TOKEN_TTL_SECS: i64 = 60;

/// `jti` length in characters. 43 characters over a 64-symbol alphabet gives
/// 258 bits of randomness — guessing an outstanding jti is infeasible.
pub const JTI_LEN: usize = 43;
