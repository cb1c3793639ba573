//! Axum request handlers for the HTTP API.
//!
//! Canonical response contract: a produced artifact is always reported as
//! `fileName`; a pending job is an empty object with status 200; failures are
//! `{"error", "details"}` via `AppError`.
use axum::extract::State;
use axum::Json;
use rand::Rng;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::api::routes::AppState;
use crate::comfyui::client::ComfyClient;
use crate::comfyui::outputs::{find_artifact, GenerationMode};
use crate::comfyui::poller::poll_until_complete;
use crate::error::{AppError, AppResult};
use crate::mock::store::MockStore;
use crate::workflow::template::WorkflowTemplate;

pub async fn root() -> &'static str {
    "ComfyUI Generation Gateway"
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub prompt: String,
    pub workflow: Value,
    pub mode: GenerationMode,
    /// Bare name of the uploaded source image (image-to-video only).
    pub file_name: Option<String>,
    pub server_url: Option<String>,
    #[serde(default)]
    pub hi_rez: bool,
}

/// Fill the workflow template and queue it; answers `{"prompt_id": ...}`.
pub async fn generate(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GenerateRequest>,
) -> AppResult<Json<Value>> {
    if state.mock_enabled {
        let prompt_id = MockStore::fake_prompt_id(req.mode, req.file_name.as_deref(), req.hi_rez);
        tracing::info!("Mock prompt_id generated: {}", prompt_id);
        return Ok(Json(json!({ "prompt_id": prompt_id })));
    }

    tracing::info!("Preparing {} generation (hiRez: {})", req.mode.as_str(), req.hi_rez);
    let workflow = fill_workflow(&state, &req.prompt, req.workflow, req.mode, req.file_name.as_deref())?;

    let client = client_for(&state, req.server_url.as_deref());
    let prompt_id = client.queue_prompt(workflow).await?;
    Ok(Json(json!({ "prompt_id": prompt_id })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRequest {
    #[serde(rename = "prompt_id")]
    pub prompt_id: String,
    pub mode: GenerationMode,
    pub server_url: Option<String>,
}

/// One history check: `{"fileName": ...}` when the artifact exists, `{}`
/// while the job is still pending.
pub async fn history(
    State(state): State<Arc<AppState>>,
    Json(req): Json<HistoryRequest>,
) -> AppResult<Json<Value>> {
    if state.mock_enabled {
        let entry = state.mock_store.write().await.history(&req.prompt_id, req.mode);
        let found = entry.as_ref().and_then(|e| find_artifact(e, req.mode));
        return Ok(Json(artifact_or_pending(found)));
    }

    let client = client_for(&state, req.server_url.as_deref());
    let found = match client.history(&req.prompt_id).await? {
        Some(entry) => find_artifact(&entry, req.mode),
        None => None,
    };
    Ok(Json(artifact_or_pending(found)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoRequest {
    pub source_file_name: String,
    pub prompt: String,
    pub workflow: Value,
    pub server_url: Option<String>,
    #[serde(default)]
    pub hi_rez: bool,
}

/// Submit an image-to-video workflow and block until the artifact is ready,
/// answering `{"fileName": <public URL>}`.
pub async fn generate_video(
    State(state): State<Arc<AppState>>,
    Json(req): Json<VideoRequest>,
) -> AppResult<Json<Value>> {
    if req.source_file_name.is_empty() || req.prompt.is_empty() || req.workflow.is_null() {
        return Err(AppError::Validation("Missing required parameters".to_string()));
    }

    let mode = GenerationMode::Image2Video;

    if state.mock_enabled {
        let prompt_id = MockStore::fake_prompt_id(mode, Some(&req.source_file_name), req.hi_rez);
        let path = poll_mock(&state, &prompt_id, mode).await?;
        return Ok(Json(json!({ "fileName": state.resolver.artifact_url(&path) })));
    }

    tracing::info!("Starting video generation (hiRez: {})", req.hi_rez);
    let workflow =
        fill_workflow(&state, &req.prompt, req.workflow, mode, Some(&req.source_file_name))?;

    let client = client_for(&state, req.server_url.as_deref());
    let prompt_id = client.queue_prompt(workflow).await?;
    tracing::info!("Generation started, prompt_id: {}", prompt_id);

    let path = poll_until_complete(&client, &prompt_id, mode, state.poll_config).await?;
    Ok(Json(json!({ "fileName": state.resolver.artifact_url(&path) })))
}

fn fill_workflow(
    state: &AppState,
    prompt: &str,
    workflow: Value,
    mode: GenerationMode,
    source_file: Option<&str>,
) -> AppResult<Value> {
    let image_url = match mode {
        GenerationMode::Image2Video => {
            let file = source_file.ok_or_else(|| {
                AppError::Validation("fileName is required for image2video".to_string())
            })?;
            Some(state.resolver.source_image_url(file))
        }
        GenerationMode::Text2Image => None,
    };
    let seed = rand::thread_rng().gen_range(0..1_000_000u32);
    WorkflowTemplate::new(workflow).fill(prompt, seed, image_url.as_deref())
}

fn client_for(state: &AppState, server_url: Option<&str>) -> ComfyClient {
    match server_url {
        Some(url) if !url.is_empty() => ComfyClient::new(url.to_string()),
        _ => state.comfy_client.clone(),
    }
}

fn artifact_or_pending(found: Option<String>) -> Value {
    match found {
        Some(name) => json!({ "fileName": name }),
        None => json!({}),
    }
}

/// Mock counterpart of the polling loop: same retry budget, fed from the
/// in-process store instead of the wire.
async fn poll_mock(state: &AppState, prompt_id: &str, mode: GenerationMode) -> AppResult<String> {
    let max_retries = state.poll_config.max_retries();
    for attempt in 1..=max_retries {
        tracing::info!("Mock polling attempt {}/{} for {}", attempt, max_retries, prompt_id);
        let entry = state.mock_store.write().await.history(prompt_id, mode);
        if let Some(found) = entry.as_ref().and_then(|e| find_artifact(e, mode)) {
            return Ok(found);
        }
        tokio::time::sleep(state.poll_config.interval).await;
    }
    Err(AppError::Timeout(state.poll_config.timeout))
}
