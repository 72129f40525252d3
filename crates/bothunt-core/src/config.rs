use std::path::PathBuf;
use std::str::FromStr;

use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
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
/// Returns `ConfigError` if a value is present but invalid.
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
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_num = |var: &str, default: &str| -> Result<u64, ConfigError> {
        parse_var(var, &or_default(var, default))
    };
    let parse_small = |var: &str, default: &str| -> Result<u32, ConfigError> {
        parse_var(var, &or_default(var, default))
    };

    let env = parse_environment(&or_default("BOTHUNT_ENV", "development"))?;
    let log_level = or_default("BOTHUNT_LOG_LEVEL", "info");
    let twitter_bearer_token = lookup("TWITTER_BEARER_TOKEN")
        .ok()
        .filter(|t| !t.trim().is_empty());
    let twitter_base_url = or_default("BOTHUNT_TWITTER_BASE_URL", "https://api.twitter.com/1.1/");

    let request_timeout_secs = parse_num("BOTHUNT_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("BOTHUNT_USER_AGENT", "bothunt/0.1 (account-research)");
    let max_retries = parse_small("BOTHUNT_MAX_RETRIES", "3")?;
    let retry_backoff_base_secs = parse_num("BOTHUNT_RETRY_BACKOFF_BASE_SECS", "5")?;

    let timeline_page_size = parse_small("BOTHUNT_TIMELINE_PAGE_SIZE", "200")?;
    if timeline_page_size == 0 || timeline_page_size > 200 {
        return Err(ConfigError::InvalidEnvVar {
            var: "BOTHUNT_TIMELINE_PAGE_SIZE".to_string(),
            reason: format!("{timeline_page_size} is outside 1..=200"),
        });
    }

    let fill_max_rounds = parse_small("BOTHUNT_FILL_MAX_ROUNDS", "10")?;
    let fill_round_backoff_base_secs = parse_num("BOTHUNT_FILL_ROUND_BACKOFF_BASE_SECS", "30")?;
    let fill_max_account_failures = parse_small("BOTHUNT_FILL_MAX_ACCOUNT_FAILURES", "3")?.max(1);

    let dataset_path = PathBuf::from(or_default("BOTHUNT_DATASET_PATH", "./data/accounts.csv"));
    let training_data_path = PathBuf::from(or_default(
        "BOTHUNT_TRAINING_DATA_PATH",
        "./data/complete_data.csv",
    ));
    let features_dir = PathBuf::from(or_default("BOTHUNT_FEATURES_DIR", "./out/features"));

    Ok(AppConfig {
        env,
        log_level,
        twitter_bearer_token,
        twitter_base_url,
        request_timeout_secs,
        user_agent,
        max_retries,
        retry_backoff_base_secs,
        timeline_page_size,
        fill_max_rounds,
        fill_round_backoff_base_secs,
        fill_max_account_failures,
        dataset_path,
        training_data_path,
        features_dir,
    })
}

fn parse_var<T>(var: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>().map_err(|e| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason: e.to_string(),
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "BOTHUNT_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
