use std::sync::Arc;
use std::error::Error;
use tokio::net::TcpListener;
use axum::{Router, routing::{get, post}};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::Settings;
use crate::registry::{Model, ModelRegistry};
use super::routes;

/// Shared state handed to every route
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ModelRegistry>,
    /// Return token keys unmasked
    pub expose_token_keys: bool,
}

impl AppState {
    pub fn new(registry: Arc<ModelRegistry>, expose_token_keys: bool) -> Self {
        Self { registry, expose_token_keys }
    }

    /// The representation of a model sent to clients.
    pub fn present(&self, model: &Model) -> Model {
        if self.expose_token_keys {
            model.clone()
        } else {
            model.redacted()
        }
    }
}

/// Builds the API router without binding it to a socket.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/health", get(routes::health_check))
        .route("/api/v1/models", get(routes::list_models).post(routes::create_model))
        .route("/api/v1/models/stats", get(routes::get_stats))
        .route(
            "/api/v1/models/{id}",
            get(routes::get_model)
                .put(routes::update_model)
                .patch(routes::update_model)
                .delete(routes::delete_model),
        )
        .route("/api/v1/models/{id}/interactions", post(routes::record_interaction))
        .route("/api/v1/categories", get(routes::list_categories))
        .with_state(state)
}

/// API Server exposing the model registry over HTTP
pub struct ApiServer {
    state: AppState,
    host: String,
    port: u16,
    enable_cors: bool,
}

impl ApiServer {
    pub fn new(registry: Arc<ModelRegistry>, settings: &Settings) -> Self {
        info!("Creating new API server on {}:{}", settings.server.host, settings.server.port);
        Self {
            state: AppState::new(registry, settings.registry.expose_token_keys),
            host: settings.server.host.clone(),
            port: settings.server.port,
            enable_cors: settings.server.enable_cors,
        }
    }

    pub async fn start(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut app = router(self.state.clone()).layer(TraceLayer::new_for_http());
        if self.enable_cors {
            app = app.layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            );
        }

        info!("Starting server on {}:{}", self.host, self.port);
        let listener = TcpListener::bind((self.host.as_str(), self.port)).await?;

        info!("Server started successfully");
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        info!("Server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
