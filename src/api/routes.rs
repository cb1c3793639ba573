//! Application state and router assembly.
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;

use crate::api::handlers;
use crate::comfyui::client::ComfyClient;
use crate::comfyui::poller::PollConfig;
use crate::mock::store::MockStore;
use crate::storage::ArtifactResolver;
use crate::Config;

pub struct AppState {
    pub comfy_client: ComfyClient,
    pub resolver: ArtifactResolver,
    pub poll_config: PollConfig,
    pub mock_enabled: bool,
    pub mock_store: RwLock<MockStore>,
}

impl AppState {
    pub fn from_config(config: &Config) -> Self {
        AppState {
            comfy_client: ComfyClient::new(config.comfyui_url.clone()),
            resolver: ArtifactResolver::new(&config.storage_base_url, &config.source_image_prefix),
            poll_config: PollConfig::new(config.poll_interval, config.poll_timeout),
            mock_enabled: config.mock_enabled,
            mock_store: RwLock::new(MockStore::default()),
        }
    }
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/generate", post(handlers::generate))
        .route("/history", post(handlers::history))
        .route("/generate_video", post(handlers::generate_video))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
