/*
 * Responsibility
 * - 環境変数や設定の読み込み (DATABASE_URL, pool サイズ, timeout など)
 * - 設定値のバリデーション (不足なら起動失敗)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        Self::parse(&std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()))
    }

    fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub database_url: String,
    pub app_env: AppEnv,
    pub db_max_connections: u32,
    pub request_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port: u16 = match std::env::var("PORT") {
            Ok(s) => s.parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            Err(_) => 3000,
        };

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let database_url =
            std::env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;

        let app_env = AppEnv::from_env();

        let db_max_connections = match std::env::var("DB_MAX_CONNECTIONS") {
            Ok(s) => s
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or(ConfigError::Invalid("DB_MAX_CONNECTIONS"))?,
            Err(_) => 10,
        };

        let request_timeout_seconds = match std::env::var("REQUEST_TIMEOUT_SECONDS") {
            Ok(s) => s
                .parse::<u64>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or(ConfigError::Invalid("REQUEST_TIMEOUT_SECONDS"))?,
            Err(_) => 30,
        };

        Ok(Self {
            addr,
            database_url,
            app_env,
            db_max_connections,
            request_timeout: Duration::from_secs(request_timeout_seconds),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_env_parsing() {
        assert_eq!(AppEnv::parse("PROD"), AppEnv::Production);
        assert_eq!(AppEnv::parse("production"), AppEnv::Production);
        assert_eq!(AppEnv::parse("staging"), AppEnv::Development);
    }

    #[test]
    fn config_error_display() {
        assert_eq!(
            ConfigError::Missing("DATABASE_URL").to_string(),
            "missing configuration: DATABASE_URL"
        );
    }
}
