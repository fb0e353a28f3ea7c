pub mod error;
pub mod storage;
pub mod types;
pub mod ui;

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use log::debug;
use std::sync::Arc;

use crate::core::shared::state::AppState;
use crate::core::urls::ApiUrls;

pub use error::TicketsError;
pub use types::*;

pub async fn list_tickets(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListTicketsQuery>,
) -> Result<Json<Vec<SupportTicket>>, TicketsError> {
    let filters = TicketFilters::try_from(query)?;
    debug!("Listing tickets with filters {filters:?}");

    let tickets = storage::with_connection(&state.conn, "fetch tickets", move |conn| {
        storage::load_tickets(conn, &filters)
    })
    .await?;

    Ok(Json(tickets))
}

pub async fn get_ticket(
    State(state): State<Arc<AppState>>,
    Path(ticket_id): Path<String>,
) -> Result<Json<SupportTicket>, TicketsError> {
    let ticket = storage::with_connection(&state.conn, "fetch ticket", move |conn| {
        storage::find_ticket(conn, &ticket_id)
    })
    .await?;

    ticket
        .map(Json)
        .ok_or_else(|| TicketsError::NotFound("Ticket not found".to_string()))
}

pub async fn search_tickets(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<SupportTicket>>, TicketsError> {
    let term = query.term()?.to_string();

    let tickets = storage::with_connection(&state.conn, "search tickets", move |conn| {
        storage::search_tickets(conn, &term)
    })
    .await?;

    Ok(Json(tickets))
}

pub async fn list_enriched_tickets(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<EnrichedTicket>>, TicketsError> {
    let tickets = storage::with_connection(
        &state.conn,
        "fetch enriched tickets",
        storage::load_enriched_tickets,
    )
    .await?;

    Ok(Json(tickets))
}

/// Reserved for AI-driven enrichment; has no side effects yet.
pub async fn enrich_ticket(
    Path(ticket_id): Path<String>,
) -> Result<Json<EnrichedFeedback>, TicketsError> {
    debug!("Enrichment requested for ticket {ticket_id}");
    Err(TicketsError::NotImplemented(
        "AI enrichment not implemented yet".to_string(),
    ))
}

pub fn configure_tickets_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(ApiUrls::TICKETS, get(list_tickets))
        .route(ApiUrls::TICKETS_SEARCH, get(search_tickets))
        .route(ApiUrls::TICKETS_ENRICHED, get(list_enriched_tickets))
        .route(ApiUrls::TICKET_BY_ID, get(get_ticket))
        .route(ApiUrls::TICKET_ENRICH, post(enrich_ticket))
}
