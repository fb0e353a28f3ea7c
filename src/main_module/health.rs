//! Health check handler

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use log::warn;
use serde::Serialize;
use std::sync::Arc;

use crate::core::shared::state::AppState;
use crate::core::shared::utils::DbPool;

#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub database: &'static str,
    pub timestamp: DateTime<Utc>,
}

impl HealthReport {
    pub fn new(database_ok: bool) -> Self {
        Self {
            status: if database_ok { "healthy" } else { "unhealthy" },
            database: if database_ok { "connected" } else { "disconnected" },
            timestamp: Utc::now(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        if self.database == "connected" {
            StatusCode::OK
        } else {
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

async fn ping_database(pool: &DbPool) -> bool {
    let pool = pool.clone();
    let result = tokio::task::spawn_blocking(move || -> Result<(), String> {
        let mut conn = pool.get().map_err(|e| e.to_string())?;
        diesel::sql_query("SELECT 1")
            .execute(&mut conn)
            .map(|_| ())
            .map_err(|e| e.to_string())
    })
    .await;

    match result {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            warn!("Health check failed: {e}");
            false
        }
        Err(e) => {
            warn!("Health check task failed: {e}");
            false
        }
    }
}

pub async fn health_check(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthReport>) {
    let report = HealthReport::new(ping_database(&state.conn).await);
    (report.status_code(), Json(report))
}
