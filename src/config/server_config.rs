// ==========================================
// 工厂管理系统 - 服务启动配置
// ==========================================
// 来源: 环境变量（全部可选，带默认值）
// - FACTORY_DB_PATH       数据库文件路径
// - FACTORY_BIND_ADDR     监听地址
// - FACTORY_CORS_ORIGINS  允许的跨域来源（逗号分隔，"*" 表示任意）
// - FACTORY_LOG_FORMAT    text | json
// - FACTORY_LOCALE        en | zh-CN
// ==========================================

use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;

use crate::logging::LogFormat;

pub const ENV_DB_PATH: &str = "FACTORY_DB_PATH";
pub const ENV_BIND_ADDR: &str = "FACTORY_BIND_ADDR";
pub const ENV_CORS_ORIGINS: &str = "FACTORY_CORS_ORIGINS";
pub const ENV_LOG_FORMAT: &str = "FACTORY_LOG_FORMAT";
pub const ENV_LOCALE: &str = "FACTORY_LOCALE";

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5092";
pub const DEFAULT_CORS_ORIGINS: &str = "https://localhost:7065,http://localhost:5092";
pub const DEFAULT_LOCALE: &str = "en";

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置项 {key} 无效: {message}")]
    InvalidValue { key: String, message: String },
}

/// 服务启动配置
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub db_path: String,
    pub bind_addr: SocketAddr,
    pub cors_origins: Vec<String>,
    pub log_format: LogFormat,
    pub locale: String,
}

impl ServerConfig {
    /// 从进程环境变量加载
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 从任意键值来源加载（便于测试）
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let db_path = get(ENV_DB_PATH).unwrap_or_else(get_default_db_path);

        let bind_raw = get(ENV_BIND_ADDR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue {
                key: ENV_BIND_ADDR.to_string(),
                message: format!("{} ({})", bind_raw, e),
            })?;

        let cors_origins = get(ENV_CORS_ORIGINS)
            .unwrap_or_else(|| DEFAULT_CORS_ORIGINS.to_string())
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        let log_format = match get(ENV_LOG_FORMAT) {
            Some(raw) => raw.parse::<LogFormat>().map_err(|message| ConfigError::InvalidValue {
                key: ENV_LOG_FORMAT.to_string(),
                message,
            })?,
            None => LogFormat::default(),
        };

        let locale = get(ENV_LOCALE).unwrap_or_else(|| DEFAULT_LOCALE.to_string());

        Ok(Self {
            db_path,
            bind_addr,
            cors_origins,
            log_format,
            locale,
        })
    }
}

/// 默认数据库路径
///
/// 优先使用用户数据目录；拿不到时回退到当前目录
pub fn get_default_db_path() -> String {
    let mut path = PathBuf::from("./factory.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("factory-mgmt");
        match std::fs::create_dir_all(&dir) {
            Ok(()) => path = dir.join("factory.db"),
            Err(e) => tracing::warn!(dir = %dir.display(), error = %e, "无法创建数据目录，使用当前目录"),
        }
    }

    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_from_lookup_默认值() {
        let config = ServerConfig::from_lookup(lookup(&[(ENV_DB_PATH, "/tmp/f.db")])).unwrap();
        assert_eq!(config.db_path, "/tmp/f.db");
        assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR.parse().unwrap());
        assert_eq!(config.cors_origins.len(), 2);
        assert_eq!(config.log_format, LogFormat::Text);
        assert_eq!(config.locale, "en");
    }

    #[test]
    fn test_from_lookup_覆写() {
        let config = ServerConfig::from_lookup(lookup(&[
            (ENV_DB_PATH, "/tmp/f.db"),
            (ENV_BIND_ADDR, "0.0.0.0:8080"),
            (ENV_CORS_ORIGINS, " http://a.test , ,http://b.test"),
            (ENV_LOG_FORMAT, "json"),
            (ENV_LOCALE, "zh-CN"),
        ]))
        .unwrap();
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.cors_origins, vec!["http://a.test", "http://b.test"]);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.locale, "zh-CN");
    }

    #[test]
    fn test_from_lookup_无效地址() {
        let err = ServerConfig::from_lookup(lookup(&[
            (ENV_DB_PATH, "/tmp/f.db"),
            (ENV_BIND_ADDR, "not-an-addr"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains(ENV_BIND_ADDR));
    }
}
