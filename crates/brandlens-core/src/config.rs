use std::path::PathBuf;

use crate::app_config::AppConfig;
use crate::error::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the
/// process, without touching `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// The parsing/validation core is decoupled from the actual environment so
/// tests can drive it with a plain `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default =
        |var: &str, default: &str| -> String { lookup(var).unwrap_or_else(|_| default.to_string()) };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let search_api_key = require("BRANDLENS_SEARCH_API_KEY")?;
    let llm_api_key = require("BRANDLENS_LLM_API_KEY")?;
    let llm_model = or_default("BRANDLENS_LLM_MODEL", "gemini-2.5-pro");

    let discussion_client_id = lookup("BRANDLENS_DISCUSSION_CLIENT_ID").ok();
    let discussion_client_secret = lookup("BRANDLENS_DISCUSSION_CLIENT_SECRET").ok();
    if discussion_client_id.is_some() != discussion_client_secret.is_some() {
        return Err(ConfigError::Validation(
            "BRANDLENS_DISCUSSION_CLIENT_ID and BRANDLENS_DISCUSSION_CLIENT_SECRET must be set together"
                .to_string(),
        ));
    }

    let user_agent = or_default("BRANDLENS_USER_AGENT", "brandlens/0.1 (brand-analysis)");
    let discussion_user_agent = or_default("BRANDLENS_DISCUSSION_USER_AGENT", &user_agent);

    let microblog_accounts_path = lookup("BRANDLENS_MICROBLOG_ACCOUNTS_PATH")
        .ok()
        .map(PathBuf::from);
    let crawl_api_key = lookup("BRANDLENS_CRAWL_API_KEY").ok();

    let http_timeout_secs = parse_u64("BRANDLENS_HTTP_TIMEOUT_SECS", "30")?;
    let collector_timeout_secs = parse_u64("BRANDLENS_COLLECTOR_TIMEOUT_SECS", "90")?;
    let max_retries = parse_u32("BRANDLENS_MAX_RETRIES", "2")?;
    let retry_backoff_base_ms = parse_u64("BRANDLENS_RETRY_BACKOFF_BASE_MS", "1000")?;
    let out_dir = PathBuf::from(or_default("BRANDLENS_OUT_DIR", "."));

    Ok(AppConfig {
        search_api_key,
        llm_api_key,
        llm_model,
        discussion_client_id,
        discussion_client_secret,
        discussion_user_agent,
        microblog_accounts_path,
        crawl_api_key,
        http_timeout_secs,
        collector_timeout_secs,
        max_retries,
        retry_backoff_base_ms,
        user_agent,
        out_dir,
    })
}
