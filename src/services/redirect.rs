use actix_web::http::StatusCode;
use actix_web::{HttpResponse, Responder, web};
use once_cell::sync::Lazy;
use std::sync::Arc;
use tracing::debug;

use crate::storages::Storage;

static DEFAULT_REDIRECT_URL: Lazy<String> = Lazy::new(|| {
    std::env::var("DEFAULT_URL").unwrap_or_else(|_| "https://www.qrsu.io".to_string())
});

pub struct RedirectService {}

impl RedirectService {
    /// 根路径跳转到产品主页
    pub async fn handle_root() -> impl Responder {
        HttpResponse::TemporaryRedirect()
            .insert_header(("Location", DEFAULT_REDIRECT_URL.as_str()))
            .finish()
    }

    pub async fn handle_redirect(
        path: web::Path<String>,
        storage: web::Data<Arc<dyn Storage>>,
    ) -> impl Responder {
        let code = path.into_inner();

        match storage.get(&code).await {
            Some(link) => HttpResponse::build(StatusCode::TEMPORARY_REDIRECT)
                .insert_header(("Location", link.long_url))
                .finish(),
            None => {
                debug!("Redirect link not found: {}", code);
                HttpResponse::build(StatusCode::NOT_FOUND)
                    .insert_header(("Content-Type", "text/html; charset=utf-8"))
                    .insert_header(("Cache-Control", "public, max-age=60")) // 缓存404
                    .body("Not Found")
            }
        }
    }
}
