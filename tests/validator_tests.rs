use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use qrsu::services::reputation::{ThreatLookup, ThreatVerdict};
use qrsu::services::validator::UrlValidator;

// 模拟信誉查询实现用于测试
struct MockThreatLookup {
    verdict: ThreatVerdict,
    calls: AtomicUsize,
}

impl MockThreatLookup {
    fn new(verdict: ThreatVerdict) -> Self {
        Self {
            verdict,
            calls: AtomicUsize::new(0),
        }
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ThreatLookup for MockThreatLookup {
    async fn check_uri(&self, _uri: &str) -> ThreatVerdict {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.verdict.clone()
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

#[tokio::test]
async fn test_scheme_less_input_is_checked_as_https() {
    let lookup = Arc::new(MockThreatLookup::new(ThreatVerdict::Clean));
    let validator = UrlValidator::new(lookup.clone());

    let validated = validator.validate("example.com").await;

    assert_eq!(validated.normalized, "https://example.com");
    assert!(validated.result.is_valid);
    assert!(validated.result.has_valid_extension);
    assert_eq!(lookup.call_count(), 1);
}

#[tokio::test]
async fn test_malformed_input_is_rejected() {
    let lookup = Arc::new(MockThreatLookup::new(ThreatVerdict::Clean));
    let validator = UrlValidator::new(lookup.clone());

    let validated = validator.validate("not a url").await;

    assert!(!validated.result.is_valid);
    assert!(!validated.result.is_safe);
    assert!(!validated.result.has_valid_extension);
    // 语法不合法时不调用信誉查询
    assert_eq!(lookup.call_count(), 0);
}

#[tokio::test]
async fn test_valid_url_with_clean_verdict() {
    let lookup = Arc::new(MockThreatLookup::new(ThreatVerdict::Clean));
    let validator = UrlValidator::new(lookup);

    let validated = validator.validate("https://example.com").await;

    assert!(validated.result.is_valid);
    assert!(validated.result.is_safe);
    assert!(validated.result.has_valid_extension);
}

#[tokio::test]
async fn test_flagged_verdict_is_unsafe() {
    let lookup = Arc::new(MockThreatLookup::new(ThreatVerdict::Flagged(vec![
        "MALWARE".to_string(),
    ])));
    let validator = UrlValidator::new(lookup);

    let validated = validator.validate("https://example.com").await;

    assert!(validated.result.is_valid);
    assert!(!validated.result.is_safe);
    assert!(validated.result.has_valid_extension);
}

#[tokio::test]
async fn test_unavailable_verdict_fails_closed() {
    let lookup = Arc::new(MockThreatLookup::new(ThreatVerdict::Unavailable));
    let validator = UrlValidator::new(lookup);

    let validated = validator.validate("https://example.com").await;

    assert!(validated.result.is_valid);
    assert!(!validated.result.is_safe);
}

#[tokio::test]
async fn test_unknown_suffix_is_flagged_but_valid() {
    let lookup = Arc::new(MockThreatLookup::new(ThreatVerdict::Clean));
    let validator = UrlValidator::new(lookup);

    let validated = validator.validate("https://localhost:8080/path").await;

    assert!(validated.result.is_valid);
    assert!(!validated.result.has_valid_extension);
}

#[tokio::test]
async fn test_non_http_scheme_is_rejected() {
    let lookup = Arc::new(MockThreatLookup::new(ThreatVerdict::Clean));
    let validator = UrlValidator::new(lookup.clone());

    let validated = validator.validate("ftp://example.com").await;

    assert!(!validated.result.is_valid);
    assert_eq!(lookup.call_count(), 0);
}
