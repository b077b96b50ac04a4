use std::collections::HashSet;

use qrsu::errors::QrsuError;

fn all_variants() -> Vec<QrsuError> {
    vec![
        QrsuError::invalid_url("bad syntax"),
        QrsuError::unsafe_url("reputation match"),
        QrsuError::unrecognized_extension("unknown suffix"),
        QrsuError::persistence("write failed"),
        QrsuError::render("payload too large"),
        QrsuError::configuration("missing key"),
        QrsuError::serialization("bad json"),
        QrsuError::file_operation("io failed"),
        QrsuError::storage_connection("connect failed"),
    ]
}

#[test]
fn test_error_codes_are_stable() {
    assert_eq!(QrsuError::invalid_url("x").code(), "E001");
    assert_eq!(QrsuError::unsafe_url("x").code(), "E002");
    assert_eq!(QrsuError::unrecognized_extension("x").code(), "E003");
    assert_eq!(QrsuError::persistence("x").code(), "E004");
    assert_eq!(QrsuError::render("x").code(), "E005");
}

#[test]
fn test_error_codes_are_unique() {
    let codes: HashSet<&'static str> = all_variants().iter().map(|e| e.code()).collect();
    assert_eq!(codes.len(), all_variants().len());
}

#[test]
fn test_display_uses_simple_format() {
    let err = QrsuError::render("payload too large");
    assert_eq!(err.to_string(), "Render Error: payload too large");
}

#[test]
fn test_message_preserves_detail() {
    let err = QrsuError::persistence("write failed");
    assert_eq!(err.message(), "write failed");
    assert_eq!(err.error_type(), "Persistence Error");
}

#[test]
fn test_colored_format_contains_code_and_type() {
    let formatted = QrsuError::storage_connection("connect failed").format_colored();
    assert!(formatted.contains("E009"));
    assert!(formatted.contains("Storage Connection Error"));
    assert!(formatted.contains("connect failed"));
}

#[test]
fn test_from_io_error() {
    let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
    let err: QrsuError = io_err.into();
    assert!(matches!(err, QrsuError::FileOperation(_)));
}

#[test]
fn test_from_serde_json_error() {
    let json_err = serde_json::from_str::<serde_json::Value>("{ nope").unwrap_err();
    let err: QrsuError = json_err.into();
    assert!(matches!(err, QrsuError::Serialization(_)));
}
