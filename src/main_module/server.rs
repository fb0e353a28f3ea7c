//! HTTP server initialization and routing

use axum::{routing::get, Router};
use log::{error, info};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::analytics::configure_analytics_routes;
use crate::core::shared::state::AppState;
use crate::core::urls::ApiUrls;
use crate::security::CorsConfig;
use crate::tickets::configure_tickets_routes;
use crate::tickets::ui::configure_explorer_ui_routes;

use super::{health_check, shutdown_signal};

/// Full application router with state, CORS and request tracing applied.
pub fn build_router(app_state: Arc<AppState>) -> Router {
    let cors = CorsConfig::from_origins(&app_state.config.server.cors_allowed_origins).build();

    Router::new()
        .route(ApiUrls::HEALTH, get(health_check))
        .merge(configure_tickets_routes())
        .merge(configure_analytics_routes())
        .merge(configure_explorer_ui_routes())
        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

pub async fn run_axum_server(app_state: Arc<AppState>) -> std::io::Result<()> {
    let addr = app_state.config.bind_address();
    let app = build_router(app_state);

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            error!(
                "Failed to bind to {}: {} - is another instance running?",
                addr, e
            );
            return Err(e);
        }
    };
    info!("HTTP server listening on {}", addr);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
}
