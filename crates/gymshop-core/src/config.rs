use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load storefront configuration from environment variables.
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

/// Load storefront configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can feed a plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

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

    let api_base_url = require("GYMSHOP_API_BASE_URL")?;
    if !api_base_url.starts_with("http://") && !api_base_url.starts_with("https://") {
        return Err(ConfigError::InvalidEnvVar {
            var: "GYMSHOP_API_BASE_URL".to_string(),
            reason: format!("expected an http(s) URL, got '{api_base_url}'"),
        });
    }

    let env = parse_environment(&or_default("GYMSHOP_ENV", "development"));
    let log_level = or_default("GYMSHOP_LOG_LEVEL", "info");

    let request_timeout_secs = parse_u64("GYMSHOP_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("GYMSHOP_USER_AGENT", "gymshop/0.1 (storefront)");
    let list_debounce_ms = parse_u64("GYMSHOP_LIST_DEBOUNCE_MS", "500")?;
    let default_page_limit = parse_u32("GYMSHOP_DEFAULT_PAGE_LIMIT", "10")?;
    if default_page_limit == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "GYMSHOP_DEFAULT_PAGE_LIMIT".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    let refresh_debounce_ms = parse_u64("GYMSHOP_REFRESH_DEBOUNCE_MS", "1000")?;
    let state_path = PathBuf::from(or_default("GYMSHOP_STATE_PATH", "./.gymshop/state.json"));
    let payment_return_url = or_default(
        "GYMSHOP_PAYMENT_RETURN_URL",
        "http://localhost:3000/payment/return",
    );

    Ok(AppConfig {
        api_base_url,
        env,
        log_level,
        request_timeout_secs,
        user_agent,
        list_debounce_ms,
        default_page_limit,
        refresh_debounce_ms,
        state_path,
        payment_return_url,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
