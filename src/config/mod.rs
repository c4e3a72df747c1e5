//! Configuration module for the Foodgram backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Pre-shared key guarding the admin routes (admin routes are disabled without it)
    pub admin_psk: Option<String>,
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Emit logs as JSON lines instead of human-readable text
    pub log_json: bool,
    /// Default source file for the ingredient loader
    pub ingredients_path: PathBuf,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let admin_psk = env::var("FOODGRAM_ADMIN_PSK")
            .ok()
            .filter(|key| !key.trim().is_empty());

        let db_path = env::var("FOODGRAM_DB_PATH")
            .unwrap_or_else(|_| "./data/foodgram.sqlite".to_string())
            .into();

        let bind_addr = env::var("FOODGRAM_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
            .parse()
            .expect("Invalid FOODGRAM_BIND_ADDR format");

        let log_level = env::var("FOODGRAM_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let log_json = env::var("FOODGRAM_LOG_JSON")
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let ingredients_path = env::var("FOODGRAM_INGREDIENTS_PATH")
            .unwrap_or_else(|_| "./data/ingredients.csv".to_string())
            .into();

        Self {
            admin_psk,
            db_path,
            bind_addr,
            log_level,
            log_json,
            ingredients_path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VARS: [&str; 6] = [
        "FOODGRAM_ADMIN_PSK",
        "FOODGRAM_DB_PATH",
        "FOODGRAM_BIND_ADDR",
        "FOODGRAM_LOG_LEVEL",
        "FOODGRAM_LOG_JSON",
        "FOODGRAM_INGREDIENTS_PATH",
    ];

    // Both cases live in one test since they share process-wide env vars.
    #[test]
    fn test_config_from_env() {
        for var in VARS {
            env::remove_var(var);
        }

        let config = Config::from_env();

        assert!(config.admin_psk.is_none());
        assert_eq!(config.db_path, PathBuf::from("./data/foodgram.sqlite"));
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.log_level, "info");
        assert!(!config.log_json);
        assert_eq!(
            config.ingredients_path,
            PathBuf::from("./data/ingredients.csv")
        );

        env::set_var("FOODGRAM_ADMIN_PSK", "   ");
        env::set_var("FOODGRAM_LOG_JSON", "TRUE");
        env::set_var("FOODGRAM_BIND_ADDR", "0.0.0.0:9000");

        let config = Config::from_env();

        assert!(config.admin_psk.is_none());
        assert!(config.log_json);
        assert_eq!(config.bind_addr.to_string(), "0.0.0.0:9000");

        for var in VARS {
            env::remove_var(var);
        }
    }
}
