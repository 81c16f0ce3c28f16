use axum::{
    Router,
    routing::{delete, get, patch, post, put},
};
use tower_http::trace::TraceLayer;

use nexin_core::health::{healthz, readyz};
use nexin_core::middleware::request_id_layer;

use crate::handlers::{
    app::{create_app, delete_app, get_app, list_apps, regenerate_app_secret, update_app},
    auth::{login, refresh_token, register},
    health::health,
    item::{create_item, delete_item, get_item, list_items, update_item},
    one_time_token::{issue_one_time_token, validate_one_time_token},
    server::{create_server, delete_server, get_server, list_servers, update_server},
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        // Health
        .route("/health", get(health))
        // Auth
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/token/refresh", post(refresh_token))
        // One-time tokens
        .route("/apps/{app_id}/one-time-token", post(issue_one_time_token))
        .route("/one-time-token/validate", post(validate_one_time_token))
        // Apps
        .route("/apps", get(list_apps))
        .route("/apps", post(create_app))
        .route("/apps/{app_id}", get(get_app))
        .route("/apps/{app_id}", patch(update_app))
        .route("/apps/{app_id}", delete(delete_app))
        .route("/apps/{app_id}/regenerate-secret", post(regenerate_app_secret))
        // Servers
        .route("/apps/{app_id}/servers", get(list_servers))
        .route("/apps/{app_id}/servers", post(create_server))
        .route("/apps/{app_id}/servers/{server_id}", get(get_server))
        .route("/apps/{app_id}/servers/{server_id}", patch(update_server))
        .route("/apps/{app_id}/servers/{server_id}", delete(delete_server))
        // Items
        .route("/items", get(list_items))
        .route("/items", post(create_item))
        .route("/items/{item_id}", get(get_item))
        .route("/items/{item_id}", patch(update_item))
        .route("/items/{item_id}", put(update_item))
        .route("/items/{item_id}", delete(delete_item));

    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .layer(request_id_layer())
        .with_state(state)
}
