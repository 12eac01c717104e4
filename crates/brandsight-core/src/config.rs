use crate::app_config::{AppConfig, Environment, StoreBackend};
use crate::ConfigError;

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

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
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

    let env = parse_environment(&or_default("BRANDSIGHT_ENV", "development"))?;
    let store_backend = parse_store_backend(&or_default("BRANDSIGHT_STORE", "postgres"))?;

    let database_url = lookup("DATABASE_URL").ok();
    if store_backend == StoreBackend::Postgres && database_url.is_none() {
        return Err(ConfigError::MissingEnvVar("DATABASE_URL".to_string()));
    }

    let bind_addr = or_default("BRANDSIGHT_BIND_ADDR", "0.0.0.0:5000")
        .parse::<SocketAddr>()
        .map_err(|e| invalid("BRANDSIGHT_BIND_ADDR", e.to_string()))?;
    let log_level = or_default("BRANDSIGHT_LOG_LEVEL", "info");

    let engine_url = or_default("BRANDSIGHT_ENGINE_URL", "http://localhost:5001");
    let engine_timeout_secs = parse_u64("BRANDSIGHT_ENGINE_TIMEOUT_SECS", "60")?;
    let review_source_url =
        or_default("BRANDSIGHT_REVIEW_SOURCE_URL", "http://localhost:5002");
    let review_source_timeout_secs = parse_u64("BRANDSIGHT_REVIEW_SOURCE_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("BRANDSIGHT_USER_AGENT", "brandsight/0.1 (review-analysis)");

    for (var, value) in [
        ("BRANDSIGHT_ENGINE_URL", &engine_url),
        ("BRANDSIGHT_REVIEW_SOURCE_URL", &review_source_url),
    ] {
        reqwest::Url::parse(value).map_err(|e| invalid(var, e.to_string()))?;
    }

    let analyze_quota_per_hour = parse_u32("BRANDSIGHT_ANALYZE_QUOTA_PER_HOUR", "60")?;
    if analyze_quota_per_hour == 0 {
        return Err(invalid(
            "BRANDSIGHT_ANALYZE_QUOTA_PER_HOUR",
            "must be at least 1".to_string(),
        ));
    }

    let db_max_connections = parse_u32("BRANDSIGHT_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("BRANDSIGHT_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("BRANDSIGHT_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    if db_min_connections > db_max_connections {
        return Err(invalid(
            "BRANDSIGHT_DB_MIN_CONNECTIONS",
            format!("{db_min_connections} exceeds max connections {db_max_connections}"),
        ));
    }

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        store_backend,
        engine_url,
        engine_timeout_secs,
        review_source_url,
        review_source_timeout_secs,
        user_agent,
        analyze_quota_per_hour,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "BRANDSIGHT_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

fn parse_store_backend(s: &str) -> Result<StoreBackend, ConfigError> {
    match s {
        "postgres" => Ok(StoreBackend::Postgres),
        "memory" => Ok(StoreBackend::Memory),
        other => Err(ConfigError::InvalidEnvVar {
            var: "BRANDSIGHT_STORE".to_string(),
            reason: format!("expected 'postgres' or 'memory', got '{other}'"),
        }),
    }
}
