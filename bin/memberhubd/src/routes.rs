//! Route registration — pages, meta endpoints, and the profile API.

use std::sync::Arc;

use axum::extract::State;
use axum::middleware;
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use axum::Router;

use memberhub_attio::{AttioClient, FieldRegistry};

use crate::api;
use crate::config::ServerConfig;
use crate::session::{self, JwtState};

/// Application shared state. Every member is read-only after startup;
/// requests share nothing mutable.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<FieldRegistry>,
    pub attio: Arc<AttioClient>,
    pub jwt_state: Arc<JwtState>,
    pub config: Arc<ServerConfig>,
}

/// Build the complete router.
pub fn build_router(state: AppState) -> Router {
    let jwt_state = state.jwt_state.clone();

    let app: Router<()> = Router::new()
        .route("/", get(login_page))
        .route("/profile", get(profile_page))
        .route("/health", get(health))
        .route("/version", get(version))
        .route("/meta/fields", get(meta_fields))
        .route("/meta/env", get(meta_env))
        .route("/api/options/{slug}", get(api::options_by_slug))
        .route("/api/user", get(api::get_user).post(api::save_user))
        .with_state(state);

    app.layer(middleware::from_fn_with_state(
        jwt_state,
        session::session_middleware,
    ))
}

async fn login_page() -> impl IntoResponse {
    Html(include_str!("web/login.html"))
}

async fn profile_page() -> impl IntoResponse {
    Html(include_str!("web/profile.html"))
}

async fn health() -> impl IntoResponse {
    axum::Json(serde_json::json!({ "status": "ok" }))
}

async fn version() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "name": "memberhubd",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// The field schema, for the profile form.
async fn meta_fields(State(state): State<AppState>) -> impl IntoResponse {
    axum::Json(serde_json::json!({ "fields": state.registry.fields() }))
}

/// Public auth-provider settings, for the login page.
async fn meta_env(State(state): State<AppState>) -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "auth_url": state.config.auth.url,
        "auth_anon_key": state.config.auth.anon_key,
    }))
}
