use serde::{Deserialize, Serialize};
use std::env;

use crate::error::{AppError, AppResult};

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_max_connections() -> u32 {
    DEFAULT_MAX_CONNECTIONS
}

impl Config {
    /// 读取配置：优先 CONFIG_PATH（默认 config.toml），文件不存在时完全依赖环境变量；
    /// 环境变量始终覆盖文件中的值。
    pub fn from_toml() -> AppResult<Self> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        let file = match std::fs::read_to_string(&config_path) {
            Ok(s) => Some(s),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                return Err(AppError::ConfigError(format!(
                    "Failed to read config file {config_path}: {e}"
                )));
            }
        };

        Self::load(file.as_deref(), |name| env::var(name).ok())
    }

    /// `lookup` 用于读取环境变量，测试中可替换
    pub fn load(file: Option<&str>, lookup: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        let mut config = match file {
            Some(config_str) => toml::from_str::<Config>(config_str)
                .map_err(|e| AppError::ConfigError(format!("Failed to parse config file: {e}")))?,
            None => {
                // 无配置文件时 DATABASE_URL 必须提供
                let url = lookup("DATABASE_URL").ok_or_else(|| {
                    AppError::ConfigError(
                        "DATABASE_URL is not set and no config file was found".to_string(),
                    )
                })?;
                Config {
                    server: ServerConfig::default(),
                    database: DatabaseConfig {
                        url,
                        max_connections: DEFAULT_MAX_CONNECTIONS,
                    },
                }
            }
        };

        if let Some(v) = lookup("SERVER_HOST") {
            config.server.host = v;
        }
        // PORT 是常见的平台约定，SERVER_PORT 优先
        if let Some(p) = lookup("SERVER_PORT")
            .or_else(|| lookup("PORT"))
            .and_then(|v| v.parse().ok())
        {
            config.server.port = p;
        }
        if let Some(v) = lookup("DATABASE_URL") {
            config.database.url = v;
        }
        if let Some(mc) = lookup("DB_MAX_CONNECTIONS").and_then(|v| v.parse().ok()) {
            config.database.max_connections = mc;
        }

        if config.database.url.trim().is_empty() {
            return Err(AppError::ConfigError("database.url must not be empty".into()));
        }

        Ok(config)
    }
}
