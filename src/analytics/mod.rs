use axum::{extract::State, routing::get, Json, Router};
use chrono::{Duration, Utc};
use diesel::dsl::count_star;
use diesel::pg::Pg;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::core::shared::schema::support_tickets;
use crate::core::shared::state::AppState;
use crate::core::urls::ApiUrls;
use crate::tickets::storage::with_connection;
use crate::tickets::{TicketPriority, TicketsError};

/// Breakdown key for rows whose grouped column is NULL.
pub const NULL_BUCKET: &str = "null";

const TREND_WINDOW_DAYS: i64 = 7;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketAnalytics {
    pub total_tickets: i64,
    pub status_breakdown: BTreeMap<String, i64>,
    pub priority_breakdown: BTreeMap<String, i64>,
    pub product_area_breakdown: BTreeMap<String, i64>,
    pub recent_trends: RecentTrends,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentTrends {
    pub trending_topics: Vec<String>,
    pub volume_change: String,
    pub priority_escalation: String,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WindowCounts {
    pub previous: i64,
    pub current: i64,
}

#[derive(Debug, Clone)]
struct AnalyticsRows {
    total: i64,
    by_status: Vec<(String, i64)>,
    by_priority: Vec<(String, i64)>,
    by_product_area: Vec<(Option<String>, i64)>,
    volume: WindowCounts,
    escalation: WindowCounts,
}

/// Signed whole-percent change, e.g. `"+15%"`. A rise from zero reads as `"+100%"`.
pub fn percent_change(counts: WindowCounts) -> String {
    let WindowCounts { previous, current } = counts;
    if previous == 0 {
        return if current > 0 { "+100%" } else { "+0%" }.to_string();
    }
    let change = ((current - previous) as f64 / previous as f64 * 100.0).round() as i64;
    if change >= 0 {
        format!("+{change}%")
    } else {
        format!("{change}%")
    }
}

fn into_breakdown(rows: Vec<(String, i64)>) -> BTreeMap<String, i64> {
    rows.into_iter().collect()
}

fn into_nullable_breakdown(rows: Vec<(Option<String>, i64)>) -> BTreeMap<String, i64> {
    let mut breakdown = BTreeMap::new();
    for (key, count) in rows {
        *breakdown
            .entry(key.unwrap_or_else(|| NULL_BUCKET.to_string()))
            .or_insert(0) += count;
    }
    breakdown
}

fn window_counts(conn: &mut PgConnection, escalated_only: bool) -> QueryResult<WindowCounts> {
    let now = Utc::now();
    let window_start = now - Duration::days(TREND_WINDOW_DAYS);
    let previous_start = window_start - Duration::days(TREND_WINDOW_DAYS);

    let mut current: support_tickets::BoxedQuery<'static, Pg> = support_tickets::table
        .filter(support_tickets::timestamp_utc.ge(window_start))
        .into_boxed();
    let mut previous: support_tickets::BoxedQuery<'static, Pg> = support_tickets::table
        .filter(support_tickets::timestamp_utc.ge(previous_start))
        .filter(support_tickets::timestamp_utc.lt(window_start))
        .into_boxed();

    if escalated_only {
        let escalated = [TicketPriority::High.as_str(), TicketPriority::Urgent.as_str()];
        current = current.filter(support_tickets::ticket_priority.eq_any(escalated));
        previous = previous.filter(support_tickets::ticket_priority.eq_any(escalated));
    }

    Ok(WindowCounts {
        current: current.count().get_result(conn)?,
        previous: previous.count().get_result(conn)?,
    })
}

/// Every count comes from one read-only repeatable-read transaction, so the total and the
/// breakdowns describe the same snapshot even while tickets are being inserted.
pub fn load_analytics(
    conn: &mut PgConnection,
    trending_topics: Vec<String>,
) -> QueryResult<TicketAnalytics> {
    let rows = conn
        .build_transaction()
        .repeatable_read()
        .read_only()
        .run(load_analytics_rows)?;

    Ok(TicketAnalytics {
        total_tickets: rows.total,
        status_breakdown: into_breakdown(rows.by_status),
        priority_breakdown: into_breakdown(rows.by_priority),
        product_area_breakdown: into_nullable_breakdown(rows.by_product_area),
        recent_trends: RecentTrends {
            trending_topics,
            volume_change: percent_change(rows.volume),
            priority_escalation: percent_change(rows.escalation),
        },
    })
}

fn load_analytics_rows(conn: &mut PgConnection) -> QueryResult<AnalyticsRows> {
    let total: i64 = support_tickets::table.count().get_result(conn)?;

    let by_status: Vec<(String, i64)> = support_tickets::table
        .group_by(support_tickets::ticket_status)
        .select((support_tickets::ticket_status, count_star()))
        .load(conn)?;

    let by_priority: Vec<(String, i64)> = support_tickets::table
        .group_by(support_tickets::ticket_priority)
        .select((support_tickets::ticket_priority, count_star()))
        .load(conn)?;

    let by_product_area: Vec<(Option<String>, i64)> = support_tickets::table
        .group_by(support_tickets::product_area)
        .select((support_tickets::product_area, count_star()))
        .load(conn)?;

    Ok(AnalyticsRows {
        total,
        by_status,
        by_priority,
        by_product_area,
        volume: window_counts(conn, false)?,
        escalation: window_counts(conn, true)?,
    })
}

pub async fn get_analytics(
    State(state): State<Arc<AppState>>,
) -> Result<Json<TicketAnalytics>, TicketsError> {
    let trending_topics = state.config.dashboard.trending_topics.clone();
    let analytics = with_connection(&state.conn, "fetch analytics", move |conn| {
        load_analytics(conn, trending_topics)
    })
    .await?;

    Ok(Json(analytics))
}

pub fn configure_analytics_routes() -> Router<Arc<AppState>> {
    Router::new().route(ApiUrls::ANALYTICS, get(get_analytics))
}
