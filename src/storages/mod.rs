use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::get_config;
use crate::errors::Result;

pub mod file;
pub mod redis;

/// 一条短码到长链接的映射，创建后不再修改
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortLink {
    pub code: String,
    pub long_url: String,
    pub created_at: DateTime<Utc>,
}

/// 文档存储的序列化形式，字段名与 `urls/{code}` 文档结构一致
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct SerializableShortLink {
    #[serde(rename = "shortCode")]
    pub short_code: String,
    #[serde(rename = "longURL")]
    pub long_url: String,
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

impl From<&ShortLink> for SerializableShortLink {
    fn from(link: &ShortLink) -> Self {
        SerializableShortLink {
            short_code: link.code.clone(),
            long_url: link.long_url.clone(),
            created_at: link.created_at.to_rfc3339(),
        }
    }
}

impl From<SerializableShortLink> for ShortLink {
    fn from(link: SerializableShortLink) -> Self {
        let created_at = DateTime::parse_from_rfc3339(&link.created_at)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now());

        ShortLink {
            code: link.short_code,
            long_url: link.long_url,
            created_at,
        }
    }
}

#[async_trait]
pub trait Storage: Send + Sync {
    async fn get(&self, code: &str) -> Option<ShortLink>;
    async fn set(&self, link: ShortLink) -> Result<()>;
    async fn load_all(&self) -> HashMap<String, ShortLink>;
    async fn get_backend_name(&self) -> String;
}

pub struct StorageFactory;

impl StorageFactory {
    pub async fn create() -> Result<Arc<dyn Storage>> {
        let backend = get_config().storage.backend.clone();

        let boxed: Box<dyn Storage> = match backend.as_str() {
            "redis" => Box::new(redis::RedisStorage::new()?),
            _ => Box::new(file::FileStorage::new()?),
        };

        Ok(Arc::from(boxed))
    }
}
