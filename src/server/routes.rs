use axum::{
    Json,
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    response::IntoResponse,
    http::StatusCode,
};
use tracing::{info, warn};

use crate::registry::{Model, ModelFilter, ModelUpdate, NewModel, RegistryError};
use super::server::AppState;
use super::types::{ApiResponse, DeleteResponse, ModelListResponse};

/// Returns a health check response
pub async fn health_check() -> &'static str {
    info!("Health check endpoint called");
    "modelmart is running!"
}

// Extractor rejections are reported as validation errors.
fn bad_json(rejection: JsonRejection) -> RegistryError {
    warn!("Rejected request body: {}", rejection.body_text());
    RegistryError::Validation(rejection.body_text())
}

fn bad_query(rejection: QueryRejection) -> RegistryError {
    warn!("Rejected query string: {}", rejection.body_text());
    RegistryError::Validation(rejection.body_text())
}

/// Lists models matching every filter given in the query string
/// (`q`, `category`, `developer`, `min_rating`, `tags`), ordered by
/// `ordering` and cut to `page`/`page_size` when asked.
pub async fn list_models(
    State(state): State<AppState>,
    filter: Result<Query<ModelFilter>, QueryRejection>,
) -> Result<impl IntoResponse, RegistryError> {
    let Query(filter) = filter.map_err(bad_query)?;
    info!("List models endpoint called. Filters: {:?}", filter);

    let listing = state.registry.list(&filter).inspect_err(|e| {
        warn!("Failed to list models: {}", e);
    })?;
    let models: Vec<Model> = listing
        .models
        .iter()
        .map(|model| state.present(model))
        .collect();

    let response = ModelListResponse {
        models,
        count: listing.count,
        filters: filter,
        page: listing.page,
    };
    Ok((StatusCode::OK, Json(ApiResponse::success(response))))
}

/// Creates a new listing
pub async fn create_model(
    State(state): State<AppState>,
    request: Result<Json<NewModel>, JsonRejection>,
) -> Result<impl IntoResponse, RegistryError> {
    let Json(request) = request.map_err(bad_json)?;
    info!("Create model endpoint called. Name: {:?}", request.name);

    let model = state.registry.create(request).inspect_err(|e| {
        warn!("Failed to create model: {}", e);
    })?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(
            state.present(&model),
            "Model uploaded successfully!",
        )),
    ))
}

/// Returns a single listing
pub async fn get_model(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, RegistryError> {
    info!("Get model endpoint called. Id: {}", id);

    let model = state
        .registry
        .find_by_id(&id)
        .ok_or(RegistryError::NotFound(id))?;
    Ok(Json(ApiResponse::success(state.present(&model))))
}

/// Applies a partial update to a listing
pub async fn update_model(
    State(state): State<AppState>,
    Path(id): Path<String>,
    request: Result<Json<ModelUpdate>, JsonRejection>,
) -> Result<impl IntoResponse, RegistryError> {
    let Json(request) = request.map_err(bad_json)?;
    info!("Update model endpoint called. Id: {}", id);

    let model = state.registry.update(&id, request).inspect_err(|e| {
        warn!("Failed to update model {}: {}", id, e);
    })?;

    Ok(Json(ApiResponse::success_with_message(
        state.present(&model),
        "Model updated successfully!",
    )))
}

/// Deletes a listing
pub async fn delete_model(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, RegistryError> {
    info!("Delete model endpoint called. Id: {}", id);

    if !state.registry.delete(&id) {
        return Err(RegistryError::NotFound(id));
    }

    Ok(Json(ApiResponse::success_with_message(
        DeleteResponse { id, deleted: true },
        "Model deleted successfully!",
    )))
}

/// Records one interaction with a listing
pub async fn record_interaction(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, RegistryError> {
    info!("Record interaction endpoint called. Id: {}", id);

    let model = state
        .registry
        .increment_interactions(&id)
        .ok_or(RegistryError::NotFound(id))?;
    Ok(Json(ApiResponse::success(state.present(&model))))
}

/// Returns aggregate statistics over all listings
pub async fn get_stats(State(state): State<AppState>) -> impl IntoResponse {
    info!("Stats endpoint called");

    let stats = state.registry.stats().map_models(|model| state.present(model));
    Json(ApiResponse::success(stats))
}

/// Returns the category catalogue plus any category in use
pub async fn list_categories(State(state): State<AppState>) -> impl IntoResponse {
    info!("Categories endpoint called");
    Json(ApiResponse::success(state.registry.categories()))
}
