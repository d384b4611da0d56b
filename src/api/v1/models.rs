//! Models endpoint handler

use axum::extract::State;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::{ApiError, ApiModel, Json, ModelsResponse};

/// GET /v1/models
pub async fn list_models(State(state): State<AppState>) -> Result<Json<ModelsResponse>, ApiError> {
    let instance = state.instance().await;
    let dispatcher = instance.dispatcher();
    let owned_by = dispatcher.provider()?.provider_name();

    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();
    let models = dispatcher.list_models(&cancel).await?;

    debug!(provider = owned_by, count = models.len(), "Listing models");

    Ok(Json(ModelsResponse::new(
        models
            .into_iter()
            .map(|m| ApiModel::from_canonical(m, owned_by))
            .collect(),
    )))
}
