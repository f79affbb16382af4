use crate::app_config::{AppConfig, Environment, TextEncoding};
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
/// Decoupled from the real environment so tests can use a plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        or_default(var, default)
            .parse::<SocketAddr>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let env = parse_environment(&or_default("DEFIS_ENV", "development"))?;
    let bind_addr = parse_addr("DEFIS_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("DEFIS_LOG_LEVEL", "info");
    let sources_path = lookup("DEFIS_SOURCES_PATH")
        .ok()
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from);

    let fetch_timeout_secs = parse_u64("DEFIS_FETCH_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("DEFIS_USER_AGENT", "defis/0.1 (pharma-dashboard)");
    let fetch_max_retries = parse_u32("DEFIS_FETCH_MAX_RETRIES", "3")?;
    let fetch_retry_backoff_ms = parse_u64("DEFIS_FETCH_RETRY_BACKOFF_MS", "1000")?;
    let text_encodings = parse_encodings(&or_default(
        "DEFIS_TEXT_ENCODINGS",
        "utf-8,utf-8-sig,latin-1",
    ))?;
    let admin_token = lookup("DEFIS_ADMIN_TOKEN")
        .ok()
        .filter(|t| !t.trim().is_empty());

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        sources_path,
        fetch_timeout_secs,
        user_agent,
        fetch_max_retries,
        fetch_retry_backoff_ms,
        text_encodings,
        admin_token,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "DEFIS_ENV".to_string(),
            reason: format!("expected development, test or production; got '{other}'"),
        }),
    }
}

/// Parse a comma-separated encoding list, preserving order and dropping repeats.
fn parse_encodings(raw: &str) -> Result<Vec<TextEncoding>, ConfigError> {
    let mut encodings = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let encoding = part
            .parse::<TextEncoding>()
            .map_err(|reason| ConfigError::InvalidEnvVar {
                var: "DEFIS_TEXT_ENCODINGS".to_string(),
                reason,
            })?;
        if !encodings.contains(&encoding) {
            encodings.push(encoding);
        }
    }
    Ok(encodings)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
