//! ComfyUI Generation Gateway library
//!
//! Modules:
//! - `api`: Axum HTTP handlers and router setup used by the binary.
//! - `comfyui`: Client, result poller, and output extractor for ComfyUI.
//! - `workflow`: Placeholder-based workflow templating.
//! - `mock`: Fabricated results for running without an inference server.
//! - `storage`: Public-URL resolution for the artifact bucket.
//! - `config`: Env-driven configuration loader.
//! - `error`: Common error type and alias.
//!
//! Re-exports are provided for common types: `Config`, `ComfyClient`,
//! `GenerationMode`, `PollConfig`, and `WorkflowTemplate`.
pub mod api;
pub mod comfyui;
pub mod config;
pub mod error;
pub mod mock;
pub mod storage;
pub mod workflow;

pub use comfyui::client::ComfyClient;
pub use comfyui::outputs::GenerationMode;
pub use comfyui::poller::PollConfig;
pub use config::Config;
pub use workflow::template::WorkflowTemplate;
