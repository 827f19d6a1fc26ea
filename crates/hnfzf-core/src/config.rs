use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

const DEFAULT_CORS_ORIGINS: &str =
    "http://localhost:8080,http://localhost:3000,http://localhost:5173,http://localhost:4173";
const DEFAULT_SEARCH_BASE_URL: &str = "https://harveynorman-au.resultspage.com";
const DEFAULT_IMAGE_CDN_HOSTS: &str = "cdn.,imgix.net,harveynorman.com.au";

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

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
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

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let database_url = require("DATABASE_URL")?;

    let env = parse_environment(&or_default("HNFZF_ENV", "development"))?;

    let bind_addr = parse("HNFZF_BIND_ADDR", "0.0.0.0:1337")?;
    let log_level = or_default("HNFZF_LOG_LEVEL", "info");
    let cors_origins = split_list(&or_default("HNFZF_CORS_ORIGINS", DEFAULT_CORS_ORIGINS));

    let db_max_connections = parse_u32("HNFZF_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("HNFZF_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("HNFZF_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let search_base_url = or_default("HNFZF_SEARCH_BASE_URL", DEFAULT_SEARCH_BASE_URL);
    if !(search_base_url.starts_with("http://") || search_base_url.starts_with("https://")) {
        return Err(ConfigError::InvalidEnvVar {
            var: "HNFZF_SEARCH_BASE_URL".to_string(),
            reason: format!("expected an http(s) URL, got \"{search_base_url}\""),
        });
    }

    let scraper_request_timeout_secs = parse_u64("HNFZF_SCRAPER_REQUEST_TIMEOUT_SECS", "30")?;
    let scraper_detail_timeout_secs = parse_u64("HNFZF_SCRAPER_DETAIL_TIMEOUT_SECS", "10")?;
    let scraper_user_agent = or_default("HNFZF_SCRAPER_USER_AGENT", "hnfzf/0.1 (product-search)");
    let scraper_max_concurrent_detail_fetches =
        parse_usize("HNFZF_SCRAPER_MAX_CONCURRENT_DETAIL_FETCHES", "4")?;
    if scraper_max_concurrent_detail_fetches == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "HNFZF_SCRAPER_MAX_CONCURRENT_DETAIL_FETCHES".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    let image_cdn_hosts = split_list(&or_default("HNFZF_IMAGE_CDN_HOSTS", DEFAULT_IMAGE_CDN_HOSTS));

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        cors_origins,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        search_base_url: search_base_url.trim_end_matches('/').to_string(),
        scraper_request_timeout_secs,
        scraper_detail_timeout_secs,
        scraper_user_agent,
        scraper_max_concurrent_detail_fetches,
        image_cdn_hosts,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "HNFZF_ENV".to_string(),
            reason: format!("expected development, test, or production, got \"{other}\""),
        }),
    }
}

/// Split a comma-separated env value, dropping blank entries.
fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
