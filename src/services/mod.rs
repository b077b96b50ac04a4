pub mod api;
pub mod health;
pub mod qr;
pub mod redirect;
pub mod reputation;
pub mod shortener;
pub mod validator;

pub use api::ApiService;
pub use health::{AppStartTime, HealthService};
pub use qr::QrRenderer;
pub use redirect::RedirectService;
pub use reputation::{ThreatLookup, ThreatVerdict, WebRiskProvider};
pub use shortener::ShortenerService;
pub use validator::{UrlValidator, ValidationResult};
