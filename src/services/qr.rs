//! QR 渲染服务
//!
//! 以最高纠错等级编码，按请求尺寸输出 PNG/JPEG/SVG。
//! 栅格路径使用最近邻插值放大模块网格，保持模块边缘锐利可扫。

use image::imageops::FilterType;
use image::{ImageBuffer, Rgb, RgbImage, Rgba, RgbaImage};
use qrcode::{Color, EcLevel, QrCode};
use tracing::debug;

/// 默认输出边长（像素）
pub const DEFAULT_QR_SIZE: u32 = 200;
/// 输出边长上限
pub const MAX_QR_SIZE: u32 = 4096;

const JPEG_QUALITY: u8 = 90;

/// 输出格式，`transparent` 仅对 PNG 生效
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QrFormat {
    Png,
    Jpeg,
    Svg,
}

impl QrFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "png" => Some(QrFormat::Png),
            "jpeg" | "jpg" => Some(QrFormat::Jpeg),
            "svg" => Some(QrFormat::Svg),
            _ => None,
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            QrFormat::Png => "image/png",
            QrFormat::Jpeg => "image/jpeg",
            QrFormat::Svg => "image/svg+xml",
        }
    }
}

/// 渲染结果字节和对应的 Content-Type
#[derive(Debug, Clone)]
pub struct RenderedQr {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
}

pub struct QrRenderer;

impl QrRenderer {
    /// 渲染一个 payload
    ///
    /// 编码失败（payload 超出 QR 容量）返回 None，由调用方按渲染失败处理。
    /// 对同一 (payload, size, format, transparent) 输出是确定的。
    pub fn render(payload: &str, size: u32, format: QrFormat, transparent: bool) -> Option<RenderedQr> {
        let size = size.clamp(1, MAX_QR_SIZE);

        let code = match QrCode::with_error_correction_level(payload.as_bytes(), EcLevel::H) {
            Ok(code) => code,
            Err(e) => {
                debug!("QR encoding failed: {}", e);
                return None;
            }
        };

        match format {
            QrFormat::Svg => Some(RenderedQr {
                bytes: Self::to_svg(&code, size).into_bytes(),
                content_type: QrFormat::Svg.content_type(),
            }),
            QrFormat::Png => Self::to_png(&code, size, transparent),
            QrFormat::Jpeg => Self::to_jpeg(&code, size),
        }
    }

    /// 原生模块网格，RGBA，深色模块不透明黑
    fn module_grid_rgba(code: &QrCode, transparent: bool) -> RgbaImage {
        let width = code.width() as u32;
        let colors = code.to_colors();
        let background = if transparent {
            Rgba([255u8, 255, 255, 0])
        } else {
            Rgba([255u8, 255, 255, 255])
        };

        ImageBuffer::from_fn(width, width, |x, y| {
            match colors[(y * width + x) as usize] {
                Color::Dark => Rgba([0u8, 0, 0, 255]),
                Color::Light => background,
            }
        })
    }

    /// 原生模块网格，RGB，白底
    fn module_grid_rgb(code: &QrCode) -> RgbImage {
        let width = code.width() as u32;
        let colors = code.to_colors();

        ImageBuffer::from_fn(width, width, |x, y| {
            match colors[(y * width + x) as usize] {
                Color::Dark => Rgb([0u8, 0, 0]),
                Color::Light => Rgb([255u8, 255, 255]),
            }
        })
    }

    fn to_png(code: &QrCode, size: u32, transparent: bool) -> Option<RenderedQr> {
        let grid = Self::module_grid_rgba(code, transparent);
        let scaled = image::imageops::resize(&grid, size, size, FilterType::Nearest);

        let mut bytes = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut bytes);
        image::ImageEncoder::write_image(
            encoder,
            scaled.as_raw(),
            size,
            size,
            image::ExtendedColorType::Rgba8,
        )
        .ok()?;

        Some(RenderedQr {
            bytes,
            content_type: QrFormat::Png.content_type(),
        })
    }

    /// JPEG 没有 alpha 通道，透明标志被忽略，始终输出白底
    fn to_jpeg(code: &QrCode, size: u32) -> Option<RenderedQr> {
        let grid = Self::module_grid_rgb(code);
        let scaled = image::imageops::resize(&grid, size, size, FilterType::Nearest);

        let mut bytes = Vec::new();
        let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut bytes, JPEG_QUALITY);
        image::ImageEncoder::write_image(
            encoder,
            scaled.as_raw(),
            size,
            size,
            image::ExtendedColorType::Rgb8,
        )
        .ok()?;

        Some(RenderedQr {
            bytes,
            content_type: QrFormat::Jpeg.content_type(),
        })
    }

    /// 逐模块输出矩形：先画一个白色背景矩形，再为每个深色模块画一个矩形
    fn to_svg(code: &QrCode, size: u32) -> String {
        let width = code.width() as u32;
        let colors = code.to_colors();
        let scale = (size / width).max(1);

        let mut svg = format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<svg width=\"{0}\" height=\"{0}\" viewBox=\"0 0 {0} {0}\" xmlns=\"http://www.w3.org/2000/svg\">\n",
            size
        );
        svg.push_str("<rect width=\"100%\" height=\"100%\" fill=\"white\"/>\n");

        for y in 0..width {
            for x in 0..width {
                if colors[(y * width + x) as usize] == Color::Dark {
                    svg.push_str(&format!(
                        "<rect x=\"{}\" y=\"{}\" width=\"{2}\" height=\"{2}\" fill=\"black\"/>\n",
                        x * scale,
                        y * scale,
                        scale
                    ));
                }
            }
        }

        svg.push_str("</svg>\n");
        svg
    }
}
