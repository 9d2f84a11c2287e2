use crate::app_config::AppConfig;
use crate::ConfigError;

/// Default relay chain, matching the public pass-through proxies the page
/// fetcher historically worked against.
const DEFAULT_RELAY_URLS: &str =
    "https://api.allorigins.win/raw?url=,https://thingproxy.freeboard.io/fetch/";

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
/// This is the core parsing/validation logic, decoupled from the actual
/// environment so it can be tested with a pure `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
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

    let sheet_id = require("SOUNDSPIKE_SHEET_ID")?;

    let sheet_gid_daily_log = or_default("SOUNDSPIKE_SHEET_GID_DAILY_LOG", "0");
    let sheet_gid_overview = or_default("SOUNDSPIKE_SHEET_GID_OVERVIEW", "1122838640");
    let sheet_gid_ranking = or_default("SOUNDSPIKE_SHEET_GID_RANKING", "3");

    let log_level = or_default("SOUNDSPIKE_LOG_LEVEL", "info");
    let sounds_path = PathBuf::from(or_default("SOUNDSPIKE_SOUNDS_PATH", "./config/sounds.yaml"));
    let ledger_path = PathBuf::from(or_default(
        "SOUNDSPIKE_LEDGER_PATH",
        "./data/sound_history.json",
    ));

    let request_timeout_secs = parse_u64("SOUNDSPIKE_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("SOUNDSPIKE_USER_AGENT", "soundspike/0.1 (sound-activity)");

    let relay_urls: Vec<String> = or_default("SOUNDSPIKE_RELAY_URLS", DEFAULT_RELAY_URLS)
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect();
    if relay_urls.is_empty() {
        return Err(ConfigError::InvalidEnvVar {
            var: "SOUNDSPIKE_RELAY_URLS".to_string(),
            reason: "at least one relay base URL is required".to_string(),
        });
    }

    let max_concurrent_scrapes = parse_usize("SOUNDSPIKE_MAX_CONCURRENT_SCRAPES", "4")?;
    let refresh_interval_secs = parse_u64("SOUNDSPIKE_REFRESH_INTERVAL_SECS", "300")?;

    Ok(AppConfig {
        sheet_id,
        sheet_gid_daily_log,
        sheet_gid_overview,
        sheet_gid_ranking,
        log_level,
        sounds_path,
        ledger_path,
        request_timeout_secs,
        user_agent,
        relay_urls,
        max_concurrent_scrapes,
        refresh_interval_secs,
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
