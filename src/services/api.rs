//! JSON API：验证、缩短、二维码渲染

use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::errors::QrsuError;
use crate::services::qr::{DEFAULT_QR_SIZE, QrFormat, QrRenderer};
use crate::services::shortener::ShortenerService;
use crate::services::validator::UrlValidator;

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub data: T,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ErrorResponse {
    pub code: i32,
    pub error: String,
}

impl ErrorResponse {
    fn from_error(err: &QrsuError) -> Self {
        ErrorResponse {
            code: 1,
            error: err.to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ValidateRequest {
    pub url: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ValidatePayload {
    pub is_valid: bool,
    pub is_safe: bool,
    pub has_valid_extension: bool,
    pub normalized_url: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ShortenRequest {
    pub url: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ShortenPayload {
    pub short_code: String,
    pub short_url: String,
    pub created_at: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct QrQuery {
    pub data: String,
    pub size: Option<u32>,
    pub format: Option<String>,
    pub transparent: Option<bool>,
}

pub struct ApiService;

impl ApiService {
    /// POST /api/validate
    ///
    /// 验证是一次判定而不是一次失败，结果始终以 200 返回
    pub async fn validate_url(
        req: web::Json<ValidateRequest>,
        validator: web::Data<UrlValidator>,
    ) -> impl Responder {
        let validated = validator.validate(&req.url).await;

        HttpResponse::Ok().json(ApiResponse {
            code: 0,
            data: ValidatePayload {
                is_valid: validated.result.is_valid,
                is_safe: validated.result.is_safe,
                has_valid_extension: validated.result.has_valid_extension,
                normalized_url: validated.normalized,
            },
        })
    }

    /// POST /api/shorten
    ///
    /// 输入默认已经通过验证，这里不做重复校验
    pub async fn shorten_url(
        req: web::Json<ShortenRequest>,
        shortener: web::Data<ShortenerService>,
    ) -> impl Responder {
        match shortener.shorten(&req.url).await {
            Ok(shortened) => HttpResponse::Ok().json(ApiResponse {
                code: 0,
                data: ShortenPayload {
                    short_code: shortened.link.code,
                    short_url: shortened.short_url,
                    created_at: shortened.link.created_at.to_rfc3339(),
                },
            }),
            Err(e) => {
                error!("Shorten request failed: {}", e);
                HttpResponse::InternalServerError().json(ErrorResponse::from_error(&e))
            }
        }
    }

    /// GET /api/qr
    pub async fn render_qr(query: web::Query<QrQuery>) -> impl Responder {
        let format = match query.format.as_deref() {
            Some(raw) => match QrFormat::parse(raw) {
                Some(format) => format,
                None => {
                    let err = QrsuError::render(format!("Unsupported output format '{}'", raw));
                    return HttpResponse::BadRequest().json(ErrorResponse::from_error(&err));
                }
            },
            None => QrFormat::Png,
        };

        let size = query.size.unwrap_or(DEFAULT_QR_SIZE);
        let transparent = query.transparent.unwrap_or(false);

        match QrRenderer::render(&query.data, size, format, transparent) {
            Some(rendered) => HttpResponse::Ok()
                .content_type(rendered.content_type)
                .body(rendered.bytes),
            None => {
                let err = QrsuError::render("QR encoding failed, payload may exceed capacity");
                HttpResponse::BadRequest().json(ErrorResponse::from_error(&err))
            }
        }
    }
}
