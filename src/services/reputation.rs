//! URI 威胁信誉查询
//!
//! 使用外部 Web Risk 风格的 HTTP API 查询 URI 威胁状态
//! 内置 LRU 缓存 + Singleflight 语义，避免重复查询

use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use serde::Deserialize;
use tracing::{trace, warn};
use ureq::Agent;

use crate::config::WebRiskConfig;

/// 判定缓存 TTL（15 分钟）
const VERDICT_CACHE_TTL_SECS: u64 = 15 * 60;
/// 判定缓存最大容量
const VERDICT_CACHE_MAX_CAPACITY: u64 = 10_000;

/// 全局 HTTP Agent（ureq 的 Agent 是 Send + Sync）
static HTTP_AGENT: OnceLock<Agent> = OnceLock::new();

fn get_agent(timeout_secs: u64) -> &'static Agent {
    HTTP_AGENT.get_or_init(|| {
        Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(timeout_secs)))
            .build()
            .into()
    })
}

/// 一次信誉查询的结论
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThreatVerdict {
    /// 未命中任何威胁类型
    Clean,
    /// 命中的威胁类型列表
    Flagged(Vec<String>),
    /// API 出错、网络失败或响应无法解析，调用方按不安全处理
    Unavailable,
}

#[async_trait]
pub trait ThreatLookup: Send + Sync {
    async fn check_uri(&self, uri: &str) -> ThreatVerdict;
    fn name(&self) -> &'static str;
}

#[derive(Debug, Deserialize)]
struct SearchUrisResponse {
    threat: Option<ThreatMatch>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ThreatMatch {
    #[serde(rename = "threatTypes", default)]
    threat_types: Vec<String>,
}

/// `{code, message, status}` 错误对象
#[derive(Debug, Deserialize)]
struct ApiError {
    code: i64,
    message: String,
    status: String,
}

/// Web Risk 信誉 Provider
///
/// 内置 Moka 缓存：
/// - LRU 淘汰策略，最大 10000 条
/// - TTL 15 分钟
/// - Singleflight：同一 URI 的并发请求只发一次 HTTP
pub struct WebRiskProvider {
    api_key: String,
    endpoint: String,
    threat_types: Vec<String>,
    timeout_secs: u64,
    /// URI → 判定缓存
    cache: Cache<String, ThreatVerdict>,
}

impl WebRiskProvider {
    pub fn new(api_key: String, endpoint: String, threat_types: Vec<String>, timeout_secs: u64) -> Self {
        let cache = Cache::builder()
            .time_to_live(Duration::from_secs(VERDICT_CACHE_TTL_SECS))
            .max_capacity(VERDICT_CACHE_MAX_CAPACITY)
            .build();

        Self {
            api_key,
            endpoint,
            threat_types,
            timeout_secs,
            cache,
        }
    }

    pub fn from_config(config: &WebRiskConfig) -> Self {
        Self::new(
            config.api_key.clone(),
            config.endpoint.clone(),
            config.threat_types.clone(),
            config.timeout_secs,
        )
    }

    fn build_query_url(&self, uri: &str) -> String {
        let mut query_url = format!(
            "{}?key={}&uri={}",
            self.endpoint,
            self.api_key,
            urlencoding::encode(uri)
        );
        for threat_type in &self.threat_types {
            query_url.push_str("&threatTypes=");
            query_url.push_str(threat_type);
        }
        query_url
    }

    /// 发起信誉查询（同步，在 spawn_blocking 中调用）
    fn fetch_verdict_sync(query_url: String, timeout_secs: u64) -> ThreatVerdict {
        let agent = get_agent(timeout_secs);

        let resp = match agent.get(&query_url).call() {
            Ok(r) => r,
            Err(e) => {
                warn!("Reputation API request failed: {}", e);
                return ThreatVerdict::Unavailable;
            }
        };

        let body: SearchUrisResponse = match resp.into_body().read_json() {
            Ok(b) => b,
            Err(e) => {
                warn!("Reputation API response parse failed: {}", e);
                return ThreatVerdict::Unavailable;
            }
        };

        if let Some(err) = body.error {
            warn!(
                "Reputation API error {} ({}): {}",
                err.code, err.status, err.message
            );
            return ThreatVerdict::Unavailable;
        }

        match body.threat {
            Some(threat) => {
                trace!("URI flagged with threat types: {:?}", threat.threat_types);
                ThreatVerdict::Flagged(threat.threat_types)
            }
            None => ThreatVerdict::Clean,
        }
    }

    /// 发起信誉查询（异步包装）
    async fn fetch_verdict(&self, uri: &str) -> ThreatVerdict {
        let query_url = self.build_query_url(uri);
        let timeout_secs = self.timeout_secs;

        // 使用 spawn_blocking 在线程池中执行同步 HTTP 请求
        tokio::task::spawn_blocking(move || Self::fetch_verdict_sync(query_url, timeout_secs))
            .await
            .unwrap_or_else(|e| {
                warn!("Reputation lookup spawn_blocking failed: {}", e);
                ThreatVerdict::Unavailable
            })
    }
}

#[async_trait]
impl ThreatLookup for WebRiskProvider {
    /// 查询 URI 威胁状态（带缓存 + Singleflight）
    ///
    /// - 缓存命中：直接返回
    /// - 缓存未命中：发起 HTTP 请求并缓存结果
    /// - 未配置 API key：直接返回 Unavailable，不缓存
    async fn check_uri(&self, uri: &str) -> ThreatVerdict {
        if self.api_key.is_empty() {
            warn!("Reputation API key not configured, treating URI as unsafe");
            return ThreatVerdict::Unavailable;
        }

        let uri_key = uri.to_string();

        // get_with 自带 singleflight 语义：
        // 同一 key 的并发调用只会执行一次闭包，其他等待结果
        self.cache
            .get_with(uri_key, async {
                trace!("Reputation cache miss, fetching verdict from API");
                self.fetch_verdict(uri).await
            })
            .await
    }

    fn name(&self) -> &'static str {
        "WebRisk"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_provider(api_key: &str) -> WebRiskProvider {
        WebRiskProvider::new(
            api_key.to_string(),
            "https://webrisk.example.invalid/v1/uris:search".to_string(),
            vec!["MALWARE".to_string(), "SOCIAL_ENGINEERING".to_string()],
            2,
        )
    }

    #[test]
    fn test_query_url_shape() {
        let provider = test_provider("test-key");
        let query_url = provider.build_query_url("https://example.com/a b");

        assert!(query_url.starts_with("https://webrisk.example.invalid/v1/uris:search?key=test-key&uri="));
        assert!(query_url.contains("uri=https%3A%2F%2Fexample.com%2Fa%20b"));
        assert!(query_url.contains("&threatTypes=MALWARE"));
        assert!(query_url.contains("&threatTypes=SOCIAL_ENGINEERING"));
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_closed() {
        let provider = test_provider("");
        let verdict = provider.check_uri("https://example.com").await;
        assert_eq!(verdict, ThreatVerdict::Unavailable);
    }

    #[test]
    fn test_response_decoding() {
        let clean: SearchUrisResponse = serde_json::from_str("{}").unwrap();
        assert!(clean.threat.is_none());
        assert!(clean.error.is_none());

        let flagged: SearchUrisResponse =
            serde_json::from_str(r#"{"threat":{"threatTypes":["MALWARE"],"expireTime":"2026-01-01T00:00:00Z"}}"#)
                .unwrap();
        assert_eq!(flagged.threat.unwrap().threat_types, vec!["MALWARE"]);

        let errored: SearchUrisResponse =
            serde_json::from_str(r#"{"error":{"code":400,"message":"API key not valid","status":"INVALID_ARGUMENT"}}"#)
                .unwrap();
        let err = errored.error.unwrap();
        assert_eq!(err.code, 400);
        assert_eq!(err.status, "INVALID_ARGUMENT");
    }

    /// 依赖外部网络服务，CI 环境可能失败
    #[test]
    #[ignore]
    fn test_fetch_verdict_sync_unreachable() {
        // TEST-NET, 不可路由
        let verdict =
            WebRiskProvider::fetch_verdict_sync("http://192.0.2.1/uris:search?key=x&uri=y".to_string(), 2);
        assert_eq!(verdict, ThreatVerdict::Unavailable);
    }
}
