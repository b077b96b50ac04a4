//! 短链接签发服务
//!
//! 生成随机短码并把映射写入文档存储。调用方负责预先验证 URL，
//! 这里不做重复校验，也不做去重：同一长链接每次都会产生新记录。

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::config::get_config;
use crate::errors::{QrsuError, Result};
use crate::storages::{ShortLink, Storage};
use crate::utils::generate_short_code;

/// 一次签发的结果
#[derive(Debug, Clone)]
pub struct ShortenedUrl {
    pub link: ShortLink,
    pub short_url: String,
}

pub struct ShortenerService {
    storage: Arc<dyn Storage>,
    short_domain: String,
    code_length: usize,
}

impl ShortenerService {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        let shortener_config = &get_config().shortener;
        Self::with_settings(
            storage,
            shortener_config.short_domain.clone(),
            shortener_config.code_length,
        )
    }

    pub fn with_settings(storage: Arc<dyn Storage>, short_domain: String, code_length: usize) -> Self {
        Self {
            storage,
            short_domain,
            code_length,
        }
    }

    /// 为一个长链接签发短码
    ///
    /// 写入是单次无条件 set，短码冲突时以后写者为准，
    /// 持久化失败作为 Persistence 错误向上传播，不做重试。
    pub async fn shorten(&self, long_url: &str) -> Result<ShortenedUrl> {
        let code = generate_short_code(self.code_length);

        let link = ShortLink {
            code,
            long_url: long_url.to_string(),
            created_at: Utc::now(),
        };

        self.storage.set(link.clone()).await.map_err(|e| {
            QrsuError::persistence(format!("Failed to persist short link: {}", e))
        })?;

        info!(
            "ShortenerService: issued '{}' -> '{}'",
            link.code, link.long_url
        );

        Ok(ShortenedUrl {
            short_url: format!("https://{}/{}", self.short_domain, link.code),
            link,
        })
    }
}
