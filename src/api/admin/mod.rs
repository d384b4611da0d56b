//! Admin API endpoints

pub mod settings;

use axum::{routing::get, Router};

use super::state::AppState;

/// Create admin API router
pub fn create_admin_router() -> Router<AppState> {
    Router::new().route(
        "/settings",
        get(settings::get_settings).put(settings::update_settings),
    )
}
