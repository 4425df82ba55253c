//! 配置基础设施

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// 指定配置文件路径的环境变量
pub const CONFIG_PATH_ENV: &str = "APP_CONFIG";

/// 服务配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP 服务配置
    pub server: ServerConfig,
    /// 数据库配置
    pub database: DatabaseConfig,
    /// 日志配置
    pub logging: LoggingConfig,
}

/// HTTP 服务配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// 绑定地址
    pub bind_address: String,
    /// HTTP 服务端口
    pub port: u16,
    /// 请求超时时间（秒）
    pub request_timeout_seconds: u64,
}

/// 存储后端
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Mysql,
    Memory,
}

/// 数据库配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub backend: StorageBackend,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    /// 数据库名称
    pub name: String,
    /// 连接池上限
    pub max_connections: u32,
    pub min_connections: u32,
    /// 获取连接的超时时间（秒）
    pub acquire_timeout_seconds: u64,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 日志级别 (trace, debug, info, warn, error)
    pub level: String,
    /// 日志目录
    pub log_dir: String,
    /// 日志文件名前缀
    pub file_prefix: String,
    /// 是否写入按日期分割的日志文件
    pub file_output: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 5000,
            request_timeout_seconds: 30,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Mysql,
            host: "compose-mysql-server-container".to_string(),
            port: 3306,
            user: "admin".to_string(),
            password: "admin123".to_string(),
            name: "user_data".to_string(),
            max_connections: 10,
            min_connections: 0,
            acquire_timeout_seconds: 8,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_dir: "logs".to_string(),
            file_prefix: "user-data-api".to_string(),
            file_output: false,
        }
    }
}

impl ServerConfig {
    /// 监听地址，形如 `0.0.0.0:5000`
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

impl Config {
    /// 从配置文件加载配置
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::FileRead(e.to_string()))?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// 用环境变量覆盖配置项
    ///
    /// `lookup` 通常是 `|key| std::env::var(key).ok()`，测试中可以传入固定的映射。
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("SERVER_BIND_ADDRESS") {
            self.server.bind_address = v;
        }
        if let Some(v) = lookup("SERVER_PORT") {
            self.server.port = parse_env("SERVER_PORT", &v)?;
        }
        if let Some(v) = lookup("DB_BACKEND") {
            self.database.backend = match v.to_ascii_lowercase().as_str() {
                "mysql" => StorageBackend::Mysql,
                "memory" => StorageBackend::Memory,
                _ => {
                    return Err(ConfigError::Env {
                        key: "DB_BACKEND".to_string(),
                        value: v,
                    })
                }
            };
        }
        if let Some(v) = lookup("DB_HOST") {
            self.database.host = v;
        }
        if let Some(v) = lookup("DB_PORT") {
            self.database.port = parse_env("DB_PORT", &v)?;
        }
        if let Some(v) = lookup("DB_USER") {
            self.database.user = v;
        }
        if let Some(v) = lookup("DB_PASSWORD") {
            self.database.password = v;
        }
        if let Some(v) = lookup("DB_NAME") {
            self.database.name = v;
        }
        if let Some(v) = lookup("DB_MAX_CONNECTIONS") {
            self.database.max_connections = parse_env("DB_MAX_CONNECTIONS", &v)?;
        }
        if let Some(v) = lookup("LOG_LEVEL") {
            self.logging.level = v.to_ascii_lowercase();
        }
        Ok(())
    }

    /// 验证配置的有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("HTTP端口必须大于0".to_string()));
        }
        if self.server.bind_address.is_empty() {
            return Err(ConfigError::Validation("绑定地址不能为空".to_string()));
        }
        if self.server.request_timeout_seconds == 0 {
            return Err(ConfigError::Validation("请求超时时间必须大于0".to_string()));
        }

        // 内存后端不需要连接参数
        if self.database.backend == StorageBackend::Mysql {
            let db = &self.database;
            if db.host.is_empty() {
                return Err(ConfigError::Validation("数据库主机不能为空".to_string()));
            }
            if db.user.is_empty() {
                return Err(ConfigError::Validation("数据库用户不能为空".to_string()));
            }
            if db.name.is_empty() {
                return Err(ConfigError::Validation("数据库名称不能为空".to_string()));
            }
            if db.port == 0 {
                return Err(ConfigError::Validation("数据库端口必须大于0".to_string()));
            }
            if db.max_connections == 0 {
                return Err(ConfigError::Validation("连接池上限必须大于0".to_string()));
            }
            if db.min_connections > db.max_connections {
                return Err(ConfigError::Validation(format!(
                    "min_connections ({}) 不能大于 max_connections ({})",
                    db.min_connections, db.max_connections
                )));
            }
            // 获取连接的超时必须短于请求超时
            if db.acquire_timeout_seconds == 0 {
                return Err(ConfigError::Validation("获取连接超时时间必须大于0".to_string()));
            }
            if db.acquire_timeout_seconds >= self.server.request_timeout_seconds {
                return Err(ConfigError::Validation(format!(
                    "acquire_timeout_seconds ({}) 必须小于 request_timeout_seconds ({})",
                    db.acquire_timeout_seconds, self.server.request_timeout_seconds
                )));
            }
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::Validation(format!(
                "无效的日志级别: {}，有效值: {:?}",
                self.logging.level, valid_levels
            )));
        }

        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Env {
        key: key.to_string(),
        value: value.to_string(),
    })
}

/// 配置错误类型
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("文件读取错误: {0}")]
    FileRead(String),
    #[error("配置解析错误: {0}")]
    Parse(String),
    #[error("配置验证错误: {0}")]
    Validation(String),
    #[error("环境变量 {key} 的值无效: {value}")]
    Env { key: String, value: String },
}

/// 加载配置：配置文件（或默认值），再叠加环境变量，最后校验
pub fn load_config() -> Result<Config, ConfigError> {
    let mut config = match std::env::var(CONFIG_PATH_ENV) {
        Ok(path) => Config::load_from_file(path)?,
        Err(_) => {
            let config_paths = ["config.toml", "./config/config.toml"];
            match config_paths.iter().find(|p| Path::new(p).exists()) {
                Some(path) => Config::load_from_file(path)?,
                None => Config::default(),
            }
        }
    };

    config.apply_overrides(|key| std::env::var(key).ok())?;
    config.validate()?;
    Ok(config)
}
