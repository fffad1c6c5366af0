use anyhow::{Context, Result};

/// Engine configuration loaded from environment variables.
/// Provider keys are required; everything else has a sensible default.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub openai_api_key: String,
    pub anthropic_api_key: String,
    /// Upper bound on provider calls in flight at once.
    pub max_concurrent_requests: usize,
    /// Per-request HTTP timeout for both adapters.
    pub request_timeout_secs: u64,
}

pub const DEFAULT_MAX_CONCURRENT_REQUESTS: usize = 3;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

impl EngineConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(EngineConfig {
            openai_api_key: require_env("OPENAI_API_KEY")?,
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            max_concurrent_requests: std::env::var("MAX_CONCURRENT_GENERATIONS")
                .unwrap_or_else(|_| DEFAULT_MAX_CONCURRENT_REQUESTS.to_string())
                .parse::<usize>()
                .context("MAX_CONCURRENT_GENERATIONS must be a positive integer")?,
            request_timeout_secs: std::env::var("GENERATION_TIMEOUT_SECS")
                .unwrap_or_else(|_| DEFAULT_REQUEST_TIMEOUT_SECS.to_string())
                .parse::<u64>()
                .context("GENERATION_TIMEOUT_SECS must be a positive integer")?,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
