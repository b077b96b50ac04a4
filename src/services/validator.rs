//! URL 验证服务
//!
//! 对输入字符串做语法、公共后缀和威胁信誉三项判定

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::services::reputation::{ThreatLookup, ThreatVerdict};

/// 对单个输入字符串的三项判定，不落盘
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub is_safe: bool,
    pub has_valid_extension: bool,
}

impl ValidationResult {
    fn rejected() -> Self {
        ValidationResult {
            is_valid: false,
            is_safe: false,
            has_valid_extension: false,
        }
    }
}

/// 验证结论和规范化后的 URL
#[derive(Debug, Clone)]
pub struct ValidatedUrl {
    pub normalized: String,
    pub result: ValidationResult,
}

pub struct UrlValidator {
    threat_lookup: Arc<dyn ThreatLookup>,
}

impl UrlValidator {
    pub fn new(threat_lookup: Arc<dyn ThreatLookup>) -> Self {
        Self { threat_lookup }
    }

    /// 缺少 scheme 时补上 `https://`
    pub fn normalize(raw: &str) -> String {
        let trimmed = raw.trim();
        let lower = trimmed.to_lowercase();

        if lower.starts_with("http://") || lower.starts_with("https://") {
            trimmed.to_string()
        } else {
            format!("https://{}", trimmed)
        }
    }

    /// 语法检查：必须可解析、scheme 为 http/https、host 非空
    fn check_syntax(normalized: &str) -> Option<Url> {
        let parsed = Url::parse(normalized).ok()?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return None;
        }

        match parsed.host_str() {
            Some(host) if !host.is_empty() => Some(parsed),
            _ => None,
        }
    }

    /// host 是否带有已知的公共后缀
    fn has_known_suffix(parsed: &Url) -> bool {
        parsed
            .host_str()
            .and_then(|host| psl::suffix(host.as_bytes()))
            .map(|suffix| suffix.is_known())
            .unwrap_or(false)
    }

    /// 验证一个原始输入字符串
    ///
    /// 语法不合法时直接短路，不消耗信誉查询配额；
    /// 信誉查询不可用时按不安全处理（fail closed）。
    pub async fn validate(&self, raw: &str) -> ValidatedUrl {
        let normalized = Self::normalize(raw);

        let parsed = match Self::check_syntax(&normalized) {
            Some(parsed) => parsed,
            None => {
                debug!("Rejected malformed URL input");
                return ValidatedUrl {
                    normalized,
                    result: ValidationResult::rejected(),
                };
            }
        };

        let has_valid_extension = Self::has_known_suffix(&parsed);

        let is_safe = matches!(
            self.threat_lookup.check_uri(&normalized).await,
            ThreatVerdict::Clean
        );

        ValidatedUrl {
            normalized,
            result: ValidationResult {
                is_valid: true,
                is_safe,
                has_valid_extension,
            },
        }
    }
}
