use std::env;

use tracing::{info, warn};

const DEFAULT_SECRET_KEY: &str = "dev-secret-key-change-me";

/// Configuration de l'application, lue depuis l'environnement (.env supporté)
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub secret_key: String,
    pub db_path: String,
    pub admin_username: String,
    pub admin_password: String,
    pub course_csv_path: Option<String>,
    pub host: String,
    pub port: u16,
    pub cookie_secure: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Construit la config à partir d'une fonction de lookup (testable sans toucher à l'env)
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let secret_key = value("APPSECRETKEY").unwrap_or_else(|| {
            warn!("APPSECRETKEY not set, using default (INSECURE)");
            DEFAULT_SECRET_KEY.to_string()
        });

        let port = match value("APP_PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|e| format!("Invalid APP_PORT '{}': {}", raw, e))?,
            None => 8080,
        };

        let cookie_secure = value("SESSION_COOKIE_SECURE")
            .map(|v| matches!(v.trim(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let config = Self {
            secret_key,
            db_path: value("COURSEDBPATH").unwrap_or_else(|| "courses.db".to_string()),
            admin_username: value("APPADMINUSERNAME").unwrap_or_else(|| "admin".to_string()),
            admin_password: value("APPADMINPASSWORD").unwrap_or_else(|| "admin123".to_string()),
            course_csv_path: value("COURSECSVPATH"),
            host: value("APP_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port,
            cookie_secure,
        };

        info!(db_path = %config.db_path, host = %config.host, port = config.port, "configuration loaded");
        Ok(config)
    }
}
