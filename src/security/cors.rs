use axum::http::{header, HeaderValue, Method};
use log::{info, warn};
use tower_http::cors::{AllowOrigin, CorsLayer};

/// CORS policy for the dashboard API. With no configured origins any well-formed
/// http(s) origin is accepted, which matches how the browser client is served in development.
#[derive(Debug, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allowed_methods: Vec<Method>,
    pub allowed_headers: Vec<String>,
    pub allow_credentials: bool,
    pub max_age_secs: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![],
            allowed_methods: vec![Method::GET, Method::POST, Method::OPTIONS],
            allowed_headers: vec![
                "Content-Type".to_string(),
                "Accept".to_string(),
                "HX-Request".to_string(),
                "HX-Trigger".to_string(),
                "HX-Target".to_string(),
                "HX-Current-URL".to_string(),
            ],
            allow_credentials: false,
            max_age_secs: 3600,
        }
    }
}

impl CorsConfig {
    pub fn from_origins(origins: &[String]) -> Self {
        let origins: Vec<String> = origins
            .iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        if origins.is_empty() {
            info!("CORS allows any well-formed origin (none configured)");
        } else {
            info!("CORS configured with {} allowed origins", origins.len());
        }

        Self::default().with_origins(origins)
    }

    pub fn with_origins(mut self, origins: Vec<String>) -> Self {
        self.allowed_origins = origins;
        self
    }

    pub fn build(self) -> CorsLayer {
        let origins: Vec<HeaderValue> = self
            .allowed_origins
            .iter()
            .filter_map(|o| match o.parse() {
                Ok(v) => Some(v),
                Err(_) => {
                    warn!("Ignoring unparseable CORS origin {o:?}");
                    None
                }
            })
            .collect();

        let mut cors = if origins.is_empty() {
            CorsLayer::new().allow_origin(AllowOrigin::predicate(validate_origin))
        } else {
            CorsLayer::new().allow_origin(origins)
        };

        cors = cors.allow_methods(self.allowed_methods);

        let headers: Vec<header::HeaderName> = self
            .allowed_headers
            .iter()
            .filter_map(|h| h.parse().ok())
            .collect();
        cors = cors.allow_headers(headers);

        if self.allow_credentials {
            cors = cors.allow_credentials(true);
        }

        cors.max_age(std::time::Duration::from_secs(self.max_age_secs))
    }
}

fn validate_origin(origin: &HeaderValue, _request: &axum::http::request::Parts) -> bool {
    origin.to_str().is_ok_and(is_valid_origin_format)
}

fn is_valid_origin_format(origin: &str) -> bool {
    if !origin.starts_with("http://") && !origin.starts_with("https://") {
        return false;
    }

    if origin.contains("..") || origin.matches("//").count() > 1 {
        return false;
    }

    let dangerous_patterns = [
        "<script",
        "javascript:",
        "data:",
        "vbscript:",
        "%3c",
        "%3e",
        "\\x",
        "\\u",
    ];

    let origin_lower = origin.to_lowercase();
    !dangerous_patterns.iter().any(|p| origin_lower.contains(p))
}
