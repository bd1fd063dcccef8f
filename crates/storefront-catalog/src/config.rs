use std::net::SocketAddr;
use std::path::PathBuf;

use crate::app_config::{AppConfig, ConfigError, Environment};

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
/// environment so it can be tested with a pure closure lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
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

    let env = match or_default("STOREFRONT_ENV", "development").as_str() {
        "development" => Environment::Development,
        "test" => Environment::Test,
        "production" => Environment::Production,
        other => {
            return Err(ConfigError::InvalidEnvVar {
                var: "STOREFRONT_ENV".to_string(),
                reason: format!("unknown environment: {other:?}"),
            })
        }
    };

    Ok(AppConfig {
        env,
        bind_addr: parse_addr("STOREFRONT_BIND_ADDR", "0.0.0.0:8080")?,
        log_level: or_default("STOREFRONT_LOG_LEVEL", "info"),
        catalog_path: PathBuf::from(require("STOREFRONT_CATALOG_PATH")?),
        profiles_path: lookup("STOREFRONT_PROFILES_PATH").ok().map(PathBuf::from),
        taxonomy_ttl_secs: parse_u64("STOREFRONT_TAXONOMY_TTL_SECS", "86400")?,
        rate_limit_max_requests: parse_usize("STOREFRONT_RATE_LIMIT_MAX", "120")?,
        rate_limit_window_secs: parse_u64("STOREFRONT_RATE_LIMIT_WINDOW_SECS", "60")?,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::env::VarError;

    use super::*;

    fn lookup_from<'a>(map: &'a HashMap<&'a str, &'a str>) -> impl Fn(&str) -> Result<String, VarError> + 'a {
        move |key| map.get(key).map(ToString::to_string).ok_or(VarError::NotPresent)
    }

    #[test]
    fn minimal_config_applies_defaults() {
        let vars = HashMap::from([("STOREFRONT_CATALOG_PATH", "data/catalog.json")]);
        let config = build_app_config(lookup_from(&vars)).expect("config");

        assert_eq!(config.env, Environment::Development);
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.taxonomy_ttl_secs, 86_400);
        assert!(config.profiles_path.is_none());
    }

    #[test]
    fn missing_catalog_path_is_an_error() {
        let vars = HashMap::new();
        let err = build_app_config(lookup_from(&vars)).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(var) if var == "STOREFRONT_CATALOG_PATH"));
    }

    #[test]
    fn invalid_bind_addr_is_an_error() {
        let vars = HashMap::from([
            ("STOREFRONT_CATALOG_PATH", "data/catalog.json"),
            ("STOREFRONT_BIND_ADDR", "not-an-addr"),
        ]);
        let err = build_app_config(lookup_from(&vars)).unwrap_err();
        assert!(
            matches!(err, ConfigError::InvalidEnvVar { var, .. } if var == "STOREFRONT_BIND_ADDR")
        );
    }

    #[test]
    fn unknown_environment_is_an_error() {
        let vars = HashMap::from([
            ("STOREFRONT_CATALOG_PATH", "data/catalog.json"),
            ("STOREFRONT_ENV", "staging"),
        ]);
        let err = build_app_config(lookup_from(&vars)).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar { var, .. } if var == "STOREFRONT_ENV"));
    }

    #[test]
    fn explicit_values_override_defaults() {
        let vars = HashMap::from([
            ("STOREFRONT_CATALOG_PATH", "seed.json"),
            ("STOREFRONT_ENV", "production"),
            ("STOREFRONT_BIND_ADDR", "127.0.0.1:9999"),
            ("STOREFRONT_PROFILES_PATH", "profiles.yaml"),
            ("STOREFRONT_TAXONOMY_TTL_SECS", "600"),
        ]);
        let config = build_app_config(lookup_from(&vars)).expect("config");
        assert_eq!(config.env, Environment::Production);
        assert_eq!(config.bind_addr.port(), 9999);
        assert_eq!(config.profiles_path.as_deref(), Some(std::path::Path::new("profiles.yaml")));
        assert_eq!(config.taxonomy_ttl_secs, 600);
    }
}
