use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Backend domain error variants.
///
/// Login failures stay distinguishable (401 invalid credentials vs 403 disabled
/// account) while every one-time-token failure is collapsed into the 401 family
/// with only the `kind` string differing — the token path is deliberately
/// enumeration-resistant.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("user account is disabled")]
    AccountDisabled,
    #[error("authentication required")]
    Unauthenticated,
    #[error("invalid refresh token")]
    InvalidRefreshToken,
    #[error("invalid token")]
    InvalidToken,
    #[error("token has expired")]
    TokenExpired,
    #[error("token already used or invalid")]
    TokenAlreadyUsed,
    #[error("missing token")]
    MissingToken,
    #[error("invalid email address")]
    InvalidEmail,
    #[error("email already in use")]
    EmailTaken,
    #[error("username already in use")]
    UsernameTaken,
    #[error("missing data")]
    MissingData,
    #[error("forbidden")]
    Forbidden,
    #[error("user not found")]
    UserNotFound,
    #[error("app not found")]
    AppNotFound,
    #[error("server not found")]
    ServerNotFound,
    #[error("item not found")]
    ItemNotFound,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::AccountDisabled => "ACCOUNT_DISABLED",
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::InvalidRefreshToken => "INVALID_REFRESH_TOKEN",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::TokenAlreadyUsed => "TOKEN_ALREADY_USED",
            Self::MissingToken => "MISSING_TOKEN",
            Self::InvalidEmail => "INVALID_EMAIL",
            Self::EmailTaken => "EMAIL_TAKEN",
            Self::UsernameTaken => "USERNAME_TAKEN",
            Self::MissingData => "MISSING_DATA",
            Self::Forbidden => "FORBIDDEN",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::AppNotFound => "APP_NOT_FOUND",
            Self::ServerNotFound => "SERVER_NOT_FOUND",
            Self::ItemNotFound => "ITEM_NOT_FOUND",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::InvalidCredentials
            | Self::Unauthenticated
            | Self::InvalidRefreshToken
            | Self::InvalidToken
            | Self::TokenExpired
            | Self::TokenAlreadyUsed => StatusCode::UNAUTHORIZED,
            Self::AccountDisabled | Self::Forbidden => StatusCode::FORBIDDEN,
            Self::MissingToken
            | Self::InvalidEmail
            | Self::EmailTaken
            | Self::UsernameTaken
            | Self::MissingData => StatusCode::BAD_REQUEST,
            Self::UserNotFound | Self::AppNotFound | Self::ServerNotFound | Self::ItemNotFound => {
                StatusCode::NOT_FOUND
            }
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        // Log 500s only — tower-http TraceLayer already records method/uri/status for all
        // requests. 4xx are expected client errors; logging them here would be noise.
        // Internal errors need the anyhow chain logged so the root cause is traceable.
        if let Self::Internal(ref e) = self {
            tracing::error!(error = %e, kind = "INTERNAL", "internal error");
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}
