use chrono::Utc;
use uuid::Uuid;

use crate::domain::repository::UserRepository;
use crate::domain::types::User;
use crate::error::ApiError;
use crate::usecase::password::{hash_password, verify_password};
use crate::usecase::token::{issue_access_token, issue_refresh_token};

#[derive(Debug)]
pub struct SessionTokens {
    pub access: String,
    pub refresh: String,
}

// ── Register ─────────────────────────────────────────────────────────────────

pub struct RegisterInput {
    pub email: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug)]
pub struct RegisterOutput {
    pub user: User,
    pub tokens: SessionTokens,
}

pub struct RegisterUseCase<U: UserRepository> {
    pub users: U,
    pub jwt_secret: String,
}

impl<U: UserRepository> RegisterUseCase<U> {
    pub async fn execute(&self, input: RegisterInput) -> Result<RegisterOutput, ApiError> {
        if input.username.is_empty() || input.password.is_empty() {
            return Err(ApiError::MissingData);
        }
        if !input.email.contains('@') {
            return Err(ApiError::InvalidEmail);
        }
        if self.users.find_by_email(&input.email).await?.is_some() {
            return Err(ApiError::EmailTaken);
        }
        if self.users.find_by_username(&input.username).await?.is_some() {
            return Err(ApiError::UsernameTaken);
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: input.email,
            username: input.username,
            password_hash: hash_password(&input.password)?,
            is_active: true,
            created_at: now,
            updated_at: now,
            last_login_at: None,
        };
        self.users.create(&user).await?;

        let tokens = SessionTokens {
            access: issue_access_token(&user, &self.jwt_secret)?,
            refresh: issue_refresh_token(&user, &self.jwt_secret)?,
        };
        Ok(RegisterOutput { user, tokens })
    }
}

// ── Login ────────────────────────────────────────────────────────────────────

pub struct LoginInput {
    /// Username or email — username match takes priority.
    pub username: String,
    pub password: String,
}

#[derive(Debug)]
pub struct LoginOutput {
    pub user: User,
    pub tokens: SessionTokens,
}

pub struct LoginUseCase<U: UserRepository> {
    pub users: U,
    pub jwt_secret: String,
}

impl<U: UserRepository> LoginUseCase<U> {
    pub async fn execute(&self, input: LoginInput) -> Result<LoginOutput, ApiError> {
        // Unknown identifier and wrong password are indistinguishable to the
        // caller; only a verified password may reveal the disabled state.
        let user = match self.users.find_by_username(&input.username).await? {
            Some(user) => Some(user),
            None => self.users.find_by_email(&input.username).await?,
        };
        let Some(mut user) = user else {
            return Err(ApiError::InvalidCredentials);
        };
        if !verify_password(&input.password, &user.password_hash) {
            return Err(ApiError::InvalidCredentials);
        }
        if !user.is_active {
            return Err(ApiError::AccountDisabled);
        }

        let now = Utc::now();
        self.users.update_last_login(user.id, now).await?;
        user.last_login_at = Some(now);

        let tokens = SessionTokens {
            access: issue_access_token(&user, &self.jwt_secret)?,
            refresh: issue_refresh_token(&user, &self.jwt_secret)?,
        };
        Ok(LoginOutput { user, tokens })
    }
}
