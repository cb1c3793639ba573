//! Thin HTTP client for ComfyUI endpoints.
//!
//! - `queue_prompt` posts a filled workflow to `/prompt` and returns the
//!   assigned prompt id.
//! - `history` fetches `/history/{prompt_id}` and returns the entry for that
//!   id, or `None` while the server has nothing for it yet.
use reqwest::Client;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct ComfyClient {
    client: Client,
    base_url: String,
}

impl ComfyClient {
    pub fn new(base_url: String) -> Self {
        let base = base_url.trim_end_matches('/').to_string();
        ComfyClient { client: Client::new(), base_url: base }
    }

    /// Queue a filled workflow with ComfyUI.
    ///
    /// Returns the `prompt_id` ComfyUI assigned to the job. A 2xx response
    /// without a `prompt_id` field is treated as an upstream failure.
    pub async fn queue_prompt(&self, workflow: Value) -> AppResult<String> {
        let url = format!("{}/prompt", self.base_url);
        tracing::info!("Sending prompt to ComfyUI at URL: {}", url);
        tracing::debug!("Workflow payload: {:?}", workflow);

        let body = json!({
            "prompt": workflow,
            "client_id": Uuid::new_v4().to_string(),
        });
        let response = self.client.post(&url).json(&body).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error body".to_string());
            tracing::error!("Failed to queue prompt. Status: {}, Body: {}", status, body);
            return Err(AppError::Upstream { status, body });
        }

        let result: Value = response.json().await?;
        match result.get("prompt_id").and_then(Value::as_str) {
            Some(id) => {
                tracing::info!("Queued prompt, prompt_id: {}", id);
                Ok(id.to_string())
            }
            None => Err(AppError::UpstreamShape(format!(
                "no prompt_id in queue response: {}",
                result
            ))),
        }
    }

    /// Fetch the history entry for a prompt id.
    ///
    /// An empty body, an unparseable body, or a body missing the prompt-id
    /// key all mean the job has not finished; those yield `Ok(None)` rather
    /// than an error so the poller can keep waiting.
    pub async fn history(&self, prompt_id: &str) -> AppResult<Option<Value>> {
        let url = format!("{}/history/{}", self.base_url, prompt_id);
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error body".to_string());
            return Err(AppError::Upstream { status, body });
        }

        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(None);
        }
        let data: Value = match serde_json::from_str(&text) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!("Unparseable history body for {}: {}", prompt_id, e);
                return Ok(None);
            }
        };
        Ok(data.get(prompt_id).cloned())
    }
}
