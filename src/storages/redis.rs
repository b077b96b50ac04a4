use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use redis::{AsyncCommands, aio::MultiplexedConnection};
use tokio::sync::RwLock;
use tracing::{debug, error, trace};

use super::{SerializableShortLink, ShortLink, Storage};
use crate::config::get_config;
use crate::errors::{QrsuError, Result};

pub struct RedisStorage {
    client: redis::Client,
    /// 持久化连接，使用 RwLock 保护
    connection: Arc<RwLock<Option<MultiplexedConnection>>>,
    key_prefix: String,
}

impl RedisStorage {
    pub fn new() -> Result<Self> {
        let storage_config = &get_config().storage;

        let client = redis::Client::open(storage_config.redis_url.clone()).map_err(|e| {
            QrsuError::storage_connection(format!(
                "Failed to create Redis client. Check REDIS_URL: {}",
                e
            ))
        })?;

        // 测试 Redis 连接 - 使用同步连接进行简单测试
        let mut conn = client.get_connection().map_err(|e| {
            QrsuError::storage_connection(format!(
                "Failed to connect to Redis at {}: {}",
                storage_config.redis_url, e
            ))
        })?;
        redis::cmd("PING").query::<String>(&mut conn).map_err(|e| {
            QrsuError::storage_connection(format!("Redis ping failed: {}", e))
        })?;
        debug!("Redis connection test successful");

        Ok(Self {
            client,
            connection: Arc::new(RwLock::new(None)),
            key_prefix: storage_config.redis_key_prefix.clone(),
        })
    }

    /// 获取或建立持久连接
    async fn get_connection(&self) -> std::result::Result<MultiplexedConnection, redis::RedisError> {
        // 首先尝试读取现有连接
        {
            let conn_guard = self.connection.read().await;
            if let Some(ref conn) = *conn_guard {
                return Ok(conn.clone());
            }
        }

        // 需要建立新连接
        let mut conn_guard = self.connection.write().await;

        // 双重检查，避免竞态条件
        if let Some(ref conn) = *conn_guard {
            return Ok(conn.clone());
        }

        let new_conn = self.client.get_multiplexed_async_connection().await?;
        *conn_guard = Some(new_conn.clone());
        debug!("Redis connection established and cached");

        Ok(new_conn)
    }

    /// 重置连接（在连接错误时调用）
    async fn reset_connection(&self) {
        let mut conn_guard = self.connection.write().await;
        *conn_guard = None;
        debug!("Redis connection reset due to error");
    }

    fn make_key(&self, code: &str) -> String {
        format!("{}{}", self.key_prefix, code)
    }

    fn serialize_link(link: &ShortLink) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string(&SerializableShortLink::from(link))
    }

    fn deserialize_link(data: &str) -> std::result::Result<ShortLink, serde_json::Error> {
        serde_json::from_str::<SerializableShortLink>(data).map(ShortLink::from)
    }
}

#[async_trait]
impl Storage for RedisStorage {
    async fn get(&self, code: &str) -> Option<ShortLink> {
        let redis_key = self.make_key(code);

        let mut conn = match self.get_connection().await {
            Ok(c) => c,
            Err(e) => {
                error!("Failed to get Redis connection: {}", e);
                self.reset_connection().await;
                return None;
            }
        };

        let result: redis::RedisResult<Option<String>> = conn.get(&redis_key).await;

        match result {
            Ok(Some(data)) => match Self::deserialize_link(&data) {
                Ok(link) => {
                    trace!("Retrieved short link: {}", code);
                    Some(link)
                }
                Err(e) => {
                    error!("Failed to deserialize short link '{}': {}", code, e);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                error!("Failed to get key '{}': {}", redis_key, e);
                self.reset_connection().await;
                None
            }
        }
    }

    async fn set(&self, link: ShortLink) -> Result<()> {
        let redis_key = self.make_key(&link.code);
        let serialized = Self::serialize_link(&link)?;

        let mut conn = self.get_connection().await.map_err(|e| {
            QrsuError::storage_connection(format!("Failed to get Redis connection: {}", e))
        })?;

        match conn.set::<_, _, ()>(&redis_key, serialized).await {
            Ok(()) => {
                trace!("Persisted short link: {}", link.code);
                Ok(())
            }
            Err(e) => {
                self.reset_connection().await;
                Err(QrsuError::persistence(format!(
                    "Failed to persist short link '{}': {}",
                    link.code, e
                )))
            }
        }
    }

    async fn load_all(&self) -> HashMap<String, ShortLink> {
        let mut conn = match self.get_connection().await {
            Ok(c) => c,
            Err(e) => {
                error!("Failed to get Redis connection: {}", e);
                self.reset_connection().await;
                return HashMap::new();
            }
        };

        let pattern = format!("{}*", self.key_prefix);
        let keys: Vec<String> = match conn.keys(&pattern).await {
            Ok(keys) => keys,
            Err(e) => {
                error!("Failed to list keys matching '{}': {}", pattern, e);
                self.reset_connection().await;
                return HashMap::new();
            }
        };

        let mut links = HashMap::new();
        for key in keys {
            let data: redis::RedisResult<Option<String>> = conn.get(&key).await;
            if let Ok(Some(data)) = data {
                match Self::deserialize_link(&data) {
                    Ok(link) => {
                        links.insert(link.code.clone(), link);
                    }
                    Err(e) => error!("Failed to deserialize value at '{}': {}", key, e),
                }
            }
        }

        links
    }

    async fn get_backend_name(&self) -> String {
        "redis".to_string()
    }
}
