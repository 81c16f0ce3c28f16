//! Bearer access-token identity extractor.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;
use crate::usecase::token::validate_access_token;

/// Authenticated caller, extracted from the `Authorization: Bearer` header.
///
/// Rejects with 401 `UNAUTHENTICATED` if the header is absent, malformed, or
/// carries an invalid/expired access token.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: Uuid,
}

impl FromRequestParts<AppState> for Identity {
    type Rejection = ApiError;

    // axum-core 0.5 defines this as `fn -> impl Future + Send` (not `async fn`).
    // In Rust 1.82+ precise capturing, `async fn` captures lifetimes differently,
    // causing E0195. Fix: extract values synchronously, return a 'static async move block.
    fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let token = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.strip_prefix("Bearer "))
            .map(|s| s.to_owned());
        let secret = state.jwt_secret.clone();

        async move {
            let token = token.ok_or(ApiError::Unauthenticated)?;
            let user_id = validate_access_token(&token, &secret)?;
            Ok(Self { user_id })
        }
    }
}
