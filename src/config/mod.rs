//! 应用配置
//!
//! 所有配置项从环境变量读取（`.env` 文件通过 dotenvy 加载），
//! 启动时初始化一次，之后通过 `get_config()` 全局访问。

use std::env;
use std::sync::OnceLock;

/// 短码默认长度
pub const DEFAULT_SHORT_CODE_LENGTH: usize = 5;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub shortener: ShortenerConfig,
    pub web_risk: WebRiskConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct ShortenerConfig {
    /// 短链接域名，例如 `qrsu.io`
    pub short_domain: String,
    pub code_length: usize,
}

#[derive(Debug, Clone)]
pub struct WebRiskConfig {
    /// 为空时安全检查直接判定为不安全（fail closed）
    pub api_key: String,
    pub endpoint: String,
    pub threat_types: Vec<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub backend: String,
    pub links_file: String,
    pub redis_url: String,
    pub redis_key_prefix: String,
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    /// 为空输出到控制台
    pub file: Option<String>,
}

impl AppConfig {
    fn from_env() -> Self {
        let threat_types = env::var("WEB_RISK_THREAT_TYPES")
            .unwrap_or_else(|_| "MALWARE,SOCIAL_ENGINEERING,UNWANTED_SOFTWARE".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        AppConfig {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
                port: env::var("SERVER_PORT")
                    .unwrap_or_else(|_| "8080".to_string())
                    .parse()
                    .unwrap_or(8080),
            },
            shortener: ShortenerConfig {
                short_domain: env::var("SHORT_URL_DOMAIN").unwrap_or_else(|_| "qrsu.io".to_string()),
                code_length: env::var("SHORT_CODE_LENGTH")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_SHORT_CODE_LENGTH),
            },
            web_risk: WebRiskConfig {
                api_key: env::var("WEB_RISK_API_KEY").unwrap_or_default(),
                endpoint: env::var("WEB_RISK_ENDPOINT")
                    .unwrap_or_else(|_| "https://webrisk.googleapis.com/v1/uris:search".to_string()),
                threat_types,
                timeout_secs: env::var("WEB_RISK_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(5),
            },
            storage: StorageConfig {
                backend: env::var("STORAGE_BACKEND").unwrap_or_else(|_| "file".to_string()),
                links_file: env::var("LINKS_FILE").unwrap_or_else(|_| "links.json".to_string()),
                redis_url: env::var("REDIS_URL")
                    .unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string()),
                redis_key_prefix: env::var("REDIS_KEY_PREFIX").unwrap_or_else(|_| "urls:".to_string()),
            },
            logging: LoggingConfig {
                level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
                file: env::var("LOG_FILE").ok().filter(|f| !f.is_empty()),
            },
        }
    }
}

static CONFIG: OnceLock<AppConfig> = OnceLock::new();

/// 启动时调用，读取环境变量并初始化全局配置
pub fn init_config() -> &'static AppConfig {
    CONFIG.get_or_init(AppConfig::from_env)
}

/// 获取全局配置，未初始化时退化为从环境变量读取
pub fn get_config() -> &'static AppConfig {
    CONFIG.get_or_init(AppConfig::from_env)
}
