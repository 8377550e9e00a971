use crate::app_config::{AppConfig, Environment};
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

    let parse_positive_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        let value = raw
            .parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })?;
        if value == 0 {
            return Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(value)
    };

    let catalog_path = PathBuf::from(require("CATFEED_CATALOG_PATH")?);

    let env = parse_environment(&or_default("CATFEED_ENV", "development"));
    let log_level = or_default("CATFEED_LOG_LEVEL", "info");
    let shops_path = PathBuf::from(or_default("CATFEED_SHOPS_PATH", "./config/shops.yaml"));

    let cache_ttl_secs = parse_u64("CATFEED_CACHE_TTL_SECS", "660")?;
    let default_page_size = parse_positive_usize("CATFEED_DEFAULT_PAGE_SIZE", "100")?;
    let max_page_size = parse_positive_usize("CATFEED_MAX_PAGE_SIZE", "500")?;
    let max_concurrent_pages = parse_positive_usize("CATFEED_MAX_CONCURRENT_PAGES", "4")?;

    if default_page_size > max_page_size {
        return Err(ConfigError::InvalidEnvVar {
            var: "CATFEED_DEFAULT_PAGE_SIZE".to_string(),
            reason: format!("{default_page_size} exceeds CATFEED_MAX_PAGE_SIZE ({max_page_size})"),
        });
    }

    Ok(AppConfig {
        env,
        log_level,
        shops_path,
        catalog_path,
        cache_ttl_secs,
        default_page_size,
        max_page_size,
        max_concurrent_pages,
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
mod tests {
    use std::collections::HashMap;
    use std::env::VarError;

    use super::*;

    fn lookup_from_map<'a>(
        map: &'a HashMap<&'a str, &'a str>,
    ) -> impl Fn(&str) -> Result<String, VarError> + 'a {
        move |key| {
            map.get(key)
                .map(|v| (*v).to_string())
                .ok_or(VarError::NotPresent)
        }
    }

    /// Returns a map with all required env vars populated.
    fn full_env<'a>() -> HashMap<&'a str, &'a str> {
        let mut m = HashMap::new();
        m.insert("CATFEED_CATALOG_PATH", "./config/catalog.json");
        m
    }

    #[test]
    fn parse_environment_known_values() {
        assert_eq!(parse_environment("production"), Environment::Production);
        assert_eq!(parse_environment("test"), Environment::Test);
        assert_eq!(parse_environment("development"), Environment::Development);
    }

    #[test]
    fn parse_environment_unknown_defaults_to_development() {
        assert_eq!(parse_environment("staging"), Environment::Development);
    }

    #[test]
    fn build_app_config_fails_without_catalog_path() {
        let map: HashMap<&str, &str> = HashMap::new();
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "CATFEED_CATALOG_PATH"),
            "expected MissingEnvVar(CATFEED_CATALOG_PATH), got: {result:?}"
        );
    }

    #[test]
    fn build_app_config_succeeds_with_defaults() {
        let map = full_env();
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.env, Environment::Development);
        assert_eq!(cfg.log_level, "info");
        assert_eq!(cfg.shops_path.to_str(), Some("./config/shops.yaml"));
        assert_eq!(cfg.cache_ttl_secs, 660);
        assert_eq!(cfg.default_page_size, 100);
        assert_eq!(cfg.max_page_size, 500);
        assert_eq!(cfg.max_concurrent_pages, 4);
    }

    #[test]
    fn cache_ttl_override() {
        let mut map = full_env();
        map.insert("CATFEED_CACHE_TTL_SECS", "60");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.cache_ttl_secs, 60);
    }

    #[test]
    fn cache_ttl_invalid() {
        let mut map = full_env();
        map.insert("CATFEED_CACHE_TTL_SECS", "eleven minutes");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "CATFEED_CACHE_TTL_SECS"),
            "expected InvalidEnvVar(CATFEED_CACHE_TTL_SECS), got: {result:?}"
        );
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let mut map = full_env();
        map.insert("CATFEED_DEFAULT_PAGE_SIZE", "0");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "CATFEED_DEFAULT_PAGE_SIZE"),
            "expected InvalidEnvVar(CATFEED_DEFAULT_PAGE_SIZE), got: {result:?}"
        );
    }

    #[test]
    fn default_page_size_above_max_is_rejected() {
        let mut map = full_env();
        map.insert("CATFEED_DEFAULT_PAGE_SIZE", "200");
        map.insert("CATFEED_MAX_PAGE_SIZE", "50");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref reason, .. }) if reason.contains("exceeds")),
            "expected InvalidEnvVar with 'exceeds', got: {result:?}"
        );
    }

    #[test]
    fn max_concurrent_pages_override() {
        let mut map = full_env();
        map.insert("CATFEED_MAX_CONCURRENT_PAGES", "8");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.max_concurrent_pages, 8);
    }
}
