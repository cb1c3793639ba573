//! Env-driven configuration for the service and library.
//!
//! Values are read from the process environment; `dotenv` is loaded on demand
//! by the binary. Defaults are provided for convenience during development.
use std::env;
use std::time::Duration;

use dotenv;

pub struct Config {
    pub comfyui_url: String,
    pub api_host: String,
    pub api_port: String,
    /// Base URL of the object storage bucket holding inputs and outputs.
    pub storage_base_url: String,
    /// Key prefix under which uploaded source images live.
    pub source_image_prefix: String,
    pub poll_interval: Duration,
    pub poll_timeout: Duration,
    /// Serve fabricated results instead of talking to ComfyUI.
    pub mock_enabled: bool,
}

impl Config {
    pub fn dotenv_load() {
        dotenv::dotenv().ok();
    }

    pub fn new() -> Result<Self, env::VarError> {
        Ok(Config {
            comfyui_url: env::var("COMFYUI_URL")
                .unwrap_or_else(|_| "http://localhost:8188".to_string()),
            api_host: env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            api_port: env::var("API_PORT").unwrap_or_else(|_| "8189".to_string()),
            storage_base_url: env::var("STORAGE_BASE_URL").unwrap_or_else(|_| {
                "https://s3.ru1.storage.beget.cloud/88095fdffa8e-tidy-trish".to_string()
            }),
            source_image_prefix: env::var("SOURCE_IMAGE_PREFIX")
                .unwrap_or_else(|_| "gen/txt2img".to_string()),
            poll_interval: Duration::from_secs(parse_secs("POLL_INTERVAL_SECS", 3)),
            poll_timeout: Duration::from_secs(parse_secs("POLL_TIMEOUT_SECS", 15 * 60)),
            mock_enabled: env::var("MOCK_ENABLED")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        })
    }

    pub fn print_env_vars() {
        for key in [
            "COMFYUI_URL",
            "API_HOST",
            "API_PORT",
            "STORAGE_BASE_URL",
            "SOURCE_IMAGE_PREFIX",
            "POLL_INTERVAL_SECS",
            "POLL_TIMEOUT_SECS",
            "MOCK_ENABLED",
        ] {
            println!("{}: {}", key, env::var(key).unwrap_or_else(|_| "<unset>".to_string()));
        }
    }
}

fn parse_secs(key: &str, default: u64) -> u64 {
    match env::var(key) {
        Ok(v) => v.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid {} '{}', falling back to {}", key, v, default);
            default
        }),
        Err(_) => default,
    }
}
