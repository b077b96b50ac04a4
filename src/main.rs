use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use tracing::{info, warn};

use qrsu::config;
use qrsu::services::{
    ApiService, AppStartTime, HealthService, RedirectService, ShortenerService, ThreatLookup,
    UrlValidator, WebRiskProvider,
};
use qrsu::storages::StorageFactory;
use qrsu::system::logging::init_logging;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();

    let config = config::init_config();
    let _log_guard = init_logging(&config.logging);

    // 记录程序启动时间
    let app_start_time = AppStartTime {
        start_datetime: chrono::Utc::now(),
    };

    // 检查存储后端
    let storage = match StorageFactory::create().await {
        Ok(storage) => storage,
        Err(e) => {
            eprintln!("{}", e.format_colored());
            return Err(std::io::Error::other(e.to_string()));
        }
    };
    info!("Using storage backend: {}", storage.get_backend_name().await);

    if config.web_risk.api_key.is_empty() {
        warn!("WEB_RISK_API_KEY not set, safety checks will fail closed");
    }

    let threat_lookup: Arc<dyn ThreatLookup> =
        Arc::new(WebRiskProvider::from_config(&config.web_risk));
    info!("Threat reputation provider: {}", threat_lookup.name());

    let validator = web::Data::new(UrlValidator::new(threat_lookup));
    let shortener = web::Data::new(ShortenerService::new(storage.clone()));

    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    info!("Starting server at http://{}", bind_address);

    // Start the HTTP server
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(storage.clone()))
            .app_data(web::Data::new(app_start_time.clone()))
            .app_data(validator.clone())
            .app_data(shortener.clone())
            .service(
                web::scope("/api")
                    .route("/validate", web::post().to(ApiService::validate_url))
                    .route("/shorten", web::post().to(ApiService::shorten_url))
                    .route("/qr", web::get().to(ApiService::render_qr)),
            )
            .service(
                web::scope("/health")
                    .route("", web::get().to(HealthService::health_check))
                    .route("", web::head().to(HealthService::health_check))
                    .route("/ready", web::get().to(HealthService::readiness_check))
                    .route("/live", web::get().to(HealthService::liveness_check)),
            )
            .route("/", web::get().to(RedirectService::handle_root))
            .route("/{code}", web::get().to(RedirectService::handle_redirect))
            .route("/{code}", web::head().to(RedirectService::handle_redirect))
    })
    .bind(bind_address)?
    .run()
    .await
}
