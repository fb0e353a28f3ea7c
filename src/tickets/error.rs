use axum::{response::IntoResponse, Json};
use log::{debug, error};

#[derive(Debug, thiserror::Error)]
pub enum TicketsError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Not implemented: {0}")]
    NotImplemented(String),
    #[error("Failed to {action}: {detail}")]
    Database { action: &'static str, detail: String },
    #[error("Internal error: {0}")]
    Internal(String),
}

impl TicketsError {
    /// Adapter for `map_err` on pool and query results.
    pub fn db<E: std::fmt::Display>(action: &'static str) -> impl FnOnce(E) -> Self {
        move |e| Self::Database {
            action,
            detail: e.to_string(),
        }
    }

    /// Message safe to show a client. Database and internal details stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            Self::Validation(msg) | Self::NotFound(msg) | Self::NotImplemented(msg) => msg.clone(),
            Self::Database { action, .. } => format!("Failed to {action}"),
            Self::Internal(_) => "Internal server error".to_string(),
        }
    }

    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::NotImplemented(_) => StatusCode::NOT_IMPLEMENTED,
            Self::Database { .. } | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn log(&self) {
        match self {
            Self::NotFound(_) => debug!("{self}"),
            Self::Database { .. } | Self::Internal(_) => error!("{self}"),
            Self::Validation(_) | Self::NotImplemented(_) => {}
        }
    }
}

impl IntoResponse for TicketsError {
    fn into_response(self) -> axum::response::Response {
        self.log();
        let body = Json(serde_json::json!({ "error": self.public_message() }));
        (self.status_code(), body).into_response()
    }
}
