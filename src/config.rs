use anyhow::Result;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Default endpoints of the extraction service.
pub const DEFAULT_ANALYZE_URL: &str = "http://127.0.0.1:8000/analyze-pdf";
pub const DEFAULT_REFINE_URL: &str = "http://127.0.0.1:8000/refine-variables";

#[derive(Debug, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub log_dir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub analyze_url: String,
    pub refine_url: String,
    /// Per-request timeout. LLM-backed analysis of a large PDF can take
    /// a while, so the default is generous.
    pub request_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            api: ApiConfig {
                analyze_url: env::var("DOCVARS_ANALYZE_URL")
                    .unwrap_or_else(|_| DEFAULT_ANALYZE_URL.to_string()),
                refine_url: env::var("DOCVARS_REFINE_URL")
                    .unwrap_or_else(|_| DEFAULT_REFINE_URL.to_string()),
                request_timeout: Duration::from_secs(
                    env::var("DOCVARS_REQUEST_TIMEOUT_SECS")
                        .unwrap_or_else(|_| "120".to_string())
                        .parse()?,
                ),
            },
            log_dir: env::var("DOCVARS_LOG_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".")),
        })
    }
}
