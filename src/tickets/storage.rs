use diesel::pg::Pg;
use diesel::prelude::*;

use crate::core::shared::schema::{enriched_feedback, support_tickets};
use crate::core::shared::utils::DbPool;

use super::error::TicketsError;
use super::types::{EnrichedFeedback, EnrichedTicket, SupportTicket, TicketFilters};

/// Checks out a pooled connection on the blocking pool and runs `f` with it.
///
/// Pool and query failures both surface as `TicketsError::Database` tagged with `action`.
pub async fn with_connection<T, F>(
    pool: &DbPool,
    action: &'static str,
    f: F,
) -> Result<T, TicketsError>
where
    T: Send + 'static,
    F: FnOnce(&mut PgConnection) -> QueryResult<T> + Send + 'static,
{
    let pool = pool.clone();
    tokio::task::spawn_blocking(move || {
        let mut conn = pool.get().map_err(TicketsError::db(action))?;
        f(&mut conn).map_err(TicketsError::db(action))
    })
    .await
    .map_err(|e: tokio::task::JoinError| TicketsError::Internal(e.to_string()))?
}

/// Equality filters ANDed together, newest first. Values are always bound parameters.
pub fn build_list_query(filters: &TicketFilters) -> support_tickets::BoxedQuery<'static, Pg> {
    let mut q = support_tickets::table.into_boxed();

    if let Some(status) = filters.status.clone() {
        q = q.filter(support_tickets::ticket_status.eq(status));
    }

    if let Some(priority) = filters.priority.clone() {
        q = q.filter(support_tickets::ticket_priority.eq(priority));
    }

    if let Some(product_area) = filters.product_area.clone() {
        q = q.filter(support_tickets::product_area.eq(product_area));
    }

    if let Some(user_persona) = filters.user_persona.clone() {
        q = q.filter(support_tickets::user_persona.eq(user_persona));
    }

    if let Some(tier) = filters.client_firm_tier {
        q = q.filter(support_tickets::client_firm_tier.eq(tier));
    }

    q.order(support_tickets::timestamp_utc.desc())
}

/// `ILIKE` pattern matching `term` as a literal substring.
pub fn substring_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

pub fn build_search_query(term: &str) -> support_tickets::BoxedQuery<'static, Pg> {
    let pattern = substring_pattern(term);
    support_tickets::table
        .filter(
            support_tickets::ticket_subject
                .ilike(pattern.clone())
                .or(support_tickets::ticket_body.ilike(pattern)),
        )
        .order(support_tickets::timestamp_utc.desc())
        .into_boxed()
}

pub fn load_tickets(
    conn: &mut PgConnection,
    filters: &TicketFilters,
) -> QueryResult<Vec<SupportTicket>> {
    build_list_query(filters).load(conn)
}

pub fn find_ticket(conn: &mut PgConnection, ticket_id: &str) -> QueryResult<Option<SupportTicket>> {
    support_tickets::table
        .filter(support_tickets::ticket_id.eq(ticket_id))
        .first(conn)
        .optional()
}

pub fn search_tickets(conn: &mut PgConnection, term: &str) -> QueryResult<Vec<SupportTicket>> {
    build_search_query(term).load(conn)
}

pub fn load_enriched_tickets(conn: &mut PgConnection) -> QueryResult<Vec<EnrichedTicket>> {
    let rows: Vec<(SupportTicket, Option<EnrichedFeedback>)> = support_tickets::table
        .left_join(enriched_feedback::table)
        .order(support_tickets::timestamp_utc.desc())
        .load(conn)?;

    Ok(rows.into_iter().map(EnrichedTicket::from).collect())
}
