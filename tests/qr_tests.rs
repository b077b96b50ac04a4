use image::GenericImageView;
use qrcode::{Color, EcLevel, QrCode};
use qrsu::services::qr::{QrFormat, QrRenderer};

const PAYLOAD: &str = "https://qrsu.io/Ab3xZ";

#[test]
fn test_svg_has_one_rect_per_dark_module_plus_background() {
    let code = QrCode::with_error_correction_level(PAYLOAD.as_bytes(), EcLevel::H).unwrap();
    let dark_modules = code
        .to_colors()
        .iter()
        .filter(|c| **c == Color::Dark)
        .count();

    let rendered = QrRenderer::render(PAYLOAD, 200, QrFormat::Svg, false).unwrap();
    let svg = String::from_utf8(rendered.bytes).unwrap();

    assert_eq!(rendered.content_type, "image/svg+xml");
    assert_eq!(svg.matches("<rect").count(), dark_modules + 1);
}

#[test]
fn test_svg_is_wellformed_xml() {
    let rendered = QrRenderer::render(PAYLOAD, 200, QrFormat::Svg, false).unwrap();
    let svg = String::from_utf8(rendered.bytes).unwrap();

    assert!(svg.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
    assert!(svg.contains("<svg width=\"200\" height=\"200\" viewBox=\"0 0 200 200\""));
    // 背景矩形在任何模块矩形之前
    let background_pos = svg.find("fill=\"white\"").unwrap();
    let first_module_pos = svg.find("fill=\"black\"").unwrap();
    assert!(background_pos < first_module_pos);
    assert_eq!(svg.matches("</svg>").count(), 1);
}

#[test]
fn test_png_honors_requested_dimensions() {
    let rendered = QrRenderer::render(PAYLOAD, 200, QrFormat::Png, false).unwrap();

    assert_eq!(rendered.content_type, "image/png");
    assert_eq!(&rendered.bytes[..4], &[0x89, b'P', b'N', b'G']);

    let decoded = image::load_from_memory(&rendered.bytes).unwrap();
    assert_eq!(decoded.dimensions(), (200, 200));
}

#[test]
fn test_png_opaque_by_default() {
    let rendered = QrRenderer::render(PAYLOAD, 100, QrFormat::Png, false).unwrap();
    let decoded = image::load_from_memory(&rendered.bytes).unwrap().to_rgba8();

    assert!(decoded.pixels().all(|p| p[3] == 255));
}

#[test]
fn test_png_transparent_background() {
    let rendered = QrRenderer::render(PAYLOAD, 100, QrFormat::Png, true).unwrap();
    let decoded = image::load_from_memory(&rendered.bytes).unwrap().to_rgba8();

    // 浅色模块透明，深色模块保持不透明
    assert!(decoded.pixels().any(|p| p[3] == 0));
    assert!(decoded.pixels().any(|p| p[3] == 255 && p[0] == 0));
}

#[test]
fn test_jpeg_ignores_transparency_flag() {
    let rendered = QrRenderer::render(PAYLOAD, 100, QrFormat::Jpeg, true).unwrap();

    assert_eq!(rendered.content_type, "image/jpeg");
    assert_eq!(&rendered.bytes[..2], &[0xFF, 0xD8]);

    let decoded = image::load_from_memory(&rendered.bytes).unwrap();
    assert_eq!(decoded.dimensions(), (100, 100));
    assert!(!decoded.color().has_alpha());
}

#[test]
fn test_render_is_deterministic() {
    let first = QrRenderer::render(PAYLOAD, 200, QrFormat::Png, false).unwrap();
    let second = QrRenderer::render(PAYLOAD, 200, QrFormat::Png, false).unwrap();

    assert_eq!(first.bytes, second.bytes);
}

#[test]
fn test_oversized_payload_fails_for_all_formats() {
    let payload = "x".repeat(8000);

    assert!(QrRenderer::render(&payload, 200, QrFormat::Png, false).is_none());
    assert!(QrRenderer::render(&payload, 200, QrFormat::Jpeg, false).is_none());
    assert!(QrRenderer::render(&payload, 200, QrFormat::Svg, false).is_none());
}

#[test]
fn test_size_is_clamped() {
    let rendered = QrRenderer::render(PAYLOAD, 100_000, QrFormat::Png, false).unwrap();
    let decoded = image::load_from_memory(&rendered.bytes).unwrap();

    assert_eq!(decoded.dimensions(), (4096, 4096));
}
