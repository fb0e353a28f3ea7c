use axum::{
    extract::{Query, State},
    response::{Html, IntoResponse},
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use log::{debug, info};
use std::sync::Arc;

use crate::core::shared::state::AppState;
use crate::core::urls::ApiUrls;
use crate::explorer::{
    derive_view, time_ago, DateSort, DerivedView, ExplorerParams, ExplorerSelection,
    PrioritySort, SentimentLabel, SentimentScorer, SentimentSort, Tab, TicketSnapshot, TicketView,
    ViewMode,
};

use super::error::TicketsError;
use super::storage;
use super::types::{TicketFilters, TicketPriority, TicketStatus};

const BODY_PREVIEW_CHARS: usize = 160;

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

fn priority_badge(priority: &str) -> &'static str {
    match TicketPriority::parse(priority) {
        Some(TicketPriority::Urgent) => "<span class=\"badge badge-danger\">Urgent</span>",
        Some(TicketPriority::High) => "<span class=\"badge badge-warning\">High</span>",
        Some(TicketPriority::Medium) => "<span class=\"badge badge-info\">Medium</span>",
        Some(TicketPriority::Low) => "<span class=\"badge badge-secondary\">Low</span>",
        None => "<span class=\"badge\">Unknown</span>",
    }
}

fn status_badge(status: &str) -> &'static str {
    match TicketStatus::parse(status) {
        Some(TicketStatus::Open) => "<span class=\"badge badge-primary\">Open</span>",
        Some(TicketStatus::Escalated) => "<span class=\"badge badge-danger\">Escalated</span>",
        Some(TicketStatus::Closed) => "<span class=\"badge badge-secondary\">Closed</span>",
        None => "<span class=\"badge\">Unknown</span>",
    }
}

fn sentiment_badge(view: &TicketView<'_>) -> String {
    let label = view.sentiment.label;
    format!(
        "<span class=\"badge sentiment sentiment-{color}\" title=\"Sentiment score {score:.1}\">{label}</span>",
        color = label.color(),
        score = view.sentiment.score,
        label = label.as_str(),
    )
}

fn preview(body: &str) -> String {
    if body.chars().count() <= BODY_PREVIEW_CHARS {
        return body.to_string();
    }
    let cut: String = body.chars().take(BODY_PREVIEW_CHARS).collect();
    format!("{}…", cut.trim_end())
}

fn render_empty_state(icon: &str, title: &str, description: &str) -> String {
    format!(
        "<div class=\"empty-state\">\
            <div class=\"empty-icon\">{}</div>\
            <h3>{}</h3>\
            <p>{}</p>\
        </div>",
        icon, title, description
    )
}

/// Terminal error state. Retry re-issues the page load; nothing retries automatically.
fn render_error_state(message: &str) -> String {
    format!(
        "<section id=\"ticket-explorer\" class=\"explorer error-state\">\
            <div class=\"empty-icon\">⚠</div>\
            <p class=\"error-message\">Error loading tickets: {message}</p>\
            <button class=\"btn btn-primary\" hx-get=\"{url}\" hx-target=\"#ticket-explorer\" hx-swap=\"outerHTML\">Retry</button>\
        </section>",
        message = html_escape(message),
        url = ApiUrls::UI_EXPLORER,
    )
}

/// Every selection field except `search`, which rides along from the search box.
fn selection_vals(selection: &ExplorerSelection) -> String {
    let vals = serde_json::json!({
        "tab": selection.tab.as_param(),
        "priority_sort": selection.sort.priority().as_param(),
        "sentiment_sort": selection.sort.sentiment().as_param(),
        "date_sort": selection.sort.date().as_param(),
        "view": selection.view.as_param(),
    });
    html_escape(&vals.to_string())
}

fn render_control(label: &str, active: bool, target: &ExplorerSelection) -> String {
    let active_class = if active { " active" } else { "" };
    format!(
        "<button class=\"explorer-control{active_class}\" hx-get=\"{url}\" hx-target=\"#explorer-view\" \
            hx-swap=\"outerHTML\" hx-include=\"#explorer-search\" hx-vals=\"{vals}\">{label}</button>",
        url = ApiUrls::UI_EXPLORER_VIEW,
        vals = selection_vals(target),
        label = html_escape(label),
    )
}

fn render_tabs(view: &DerivedView<'_>, selection: &ExplorerSelection) -> String {
    let mut html = String::from("<nav class=\"explorer-tabs\">");
    for tab in Tab::ALL {
        let target = ExplorerSelection {
            tab,
            ..selection.clone()
        };
        let label = format!("{} ({})", tab.label(), view.tab_counts.get(tab));
        html.push_str(&render_control(&label, tab == selection.tab, &target));
    }
    html.push_str("</nav>");
    html
}

fn render_sort_controls(selection: &ExplorerSelection) -> String {
    let sort = selection.sort;

    let mut by_priority = selection.clone();
    by_priority.sort.set_priority(sort.priority().next());
    let priority_label = match sort.priority() {
        PrioritySort::None => "Priority",
        PrioritySort::HighFirst => "Priority ↓",
        PrioritySort::LowFirst => "Priority ↑",
    };

    let mut by_sentiment = selection.clone();
    by_sentiment.sort.set_sentiment(sort.sentiment().next());
    let sentiment_label = match sort.sentiment() {
        SentimentSort::None => "Sentiment",
        SentimentSort::MostNegativeFirst => "Sentiment: negative first",
        SentimentSort::MostPositiveFirst => "Sentiment: positive first",
    };

    let mut by_date = selection.clone();
    by_date.sort.set_date(sort.date().toggle());
    let date_label = match sort.date() {
        DateSort::NewestFirst => "Newest first",
        DateSort::OldestFirst => "Oldest first",
    };

    let mut other_view = selection.clone();
    other_view.view = match selection.view {
        ViewMode::Grid => ViewMode::List,
        ViewMode::List => ViewMode::Grid,
    };
    let view_label = match other_view.view {
        ViewMode::Grid => "Grid view",
        ViewMode::List => "List view",
    };

    format!(
        "<div class=\"explorer-sort\">{}{}{}{}</div>",
        render_control(
            priority_label,
            sort.priority() != PrioritySort::None,
            &by_priority
        ),
        render_control(
            sentiment_label,
            sort.sentiment() != SentimentSort::None,
            &by_sentiment
        ),
        render_control(date_label, false, &by_date),
        render_control(view_label, false, &other_view),
    )
}

/// Hidden copy of the selection so the search box can send it along.
fn render_state_form(selection: &ExplorerSelection) -> String {
    format!(
        "<form id=\"explorer-state\" hidden>\
            <input type=\"hidden\" name=\"tab\" value=\"{}\">\
            <input type=\"hidden\" name=\"priority_sort\" value=\"{}\">\
            <input type=\"hidden\" name=\"sentiment_sort\" value=\"{}\">\
            <input type=\"hidden\" name=\"date_sort\" value=\"{}\">\
            <input type=\"hidden\" name=\"view\" value=\"{}\">\
        </form>",
        selection.tab.as_param(),
        selection.sort.priority().as_param(),
        selection.sort.sentiment().as_param(),
        selection.sort.date().as_param(),
        selection.view.as_param(),
    )
}

fn render_ticket_card(view: &TicketView<'_>, now: DateTime<Utc>) -> String {
    let ticket = view.ticket;
    format!(
        "<div class=\"ticket-card\" data-id=\"{id}\">\
            <div class=\"ticket-card-header\">\
                <span class=\"ticket-number\">{id}</span>\
                {status}\
                {priority}\
                {sentiment}\
            </div>\
            <div class=\"ticket-card-body\">\
                <h4 class=\"ticket-subject\">{subject}</h4>\
                <p class=\"ticket-preview\">{body}</p>\
            </div>\
            <div class=\"ticket-card-footer\">\
                <span class=\"ticket-area\">{area}</span>\
                <span class=\"ticket-assignee\" title=\"{role}\"><span class=\"avatar\">{initials}</span>{assignee}</span>\
                <span class=\"ticket-age\">{age}</span>\
            </div>\
        </div>",
        id = html_escape(&ticket.ticket_id),
        status = status_badge(&ticket.ticket_status),
        priority = priority_badge(&ticket.ticket_priority),
        sentiment = sentiment_badge(view),
        subject = html_escape(ticket.subject_or_default()),
        body = html_escape(&preview(&ticket.ticket_body)),
        area = html_escape(ticket.product_area.as_deref().unwrap_or("-")),
        role = html_escape(view.assignee.role),
        initials = html_escape(&view.assignee.initials()),
        assignee = html_escape(view.assignee.name),
        age = time_ago(ticket.timestamp_utc, now),
    )
}

fn render_ticket_row(view: &TicketView<'_>, now: DateTime<Utc>) -> String {
    let ticket = view.ticket;
    format!(
        "<tr class=\"ticket-row\" data-id=\"{id}\">\
            <td class=\"ticket-number\">{id}</td>\
            <td class=\"ticket-subject\">{subject}</td>\
            <td class=\"ticket-area\">{area}</td>\
            <td class=\"ticket-status\">{status}</td>\
            <td class=\"ticket-priority\">{priority}</td>\
            <td class=\"ticket-sentiment\">{sentiment}</td>\
            <td class=\"ticket-assignee\">{assignee}</td>\
            <td class=\"ticket-age\">{age}</td>\
        </tr>",
        id = html_escape(&ticket.ticket_id),
        subject = html_escape(ticket.subject_or_default()),
        area = html_escape(ticket.product_area.as_deref().unwrap_or("-")),
        status = status_badge(&ticket.ticket_status),
        priority = priority_badge(&ticket.ticket_priority),
        sentiment = sentiment_badge(view),
        assignee = html_escape(view.assignee.name),
        age = time_ago(ticket.timestamp_utc, now),
    )
}

fn render_tickets(view: &DerivedView<'_>, mode: ViewMode, now: DateTime<Utc>) -> String {
    if view.is_empty() {
        return render_empty_state("🔍", "No tickets", "No tickets match your criteria");
    }

    match mode {
        ViewMode::Grid => {
            let mut html = String::from("<div class=\"tickets-grid\">");
            for ticket in &view.tickets {
                html.push_str(&render_ticket_card(ticket, now));
            }
            html.push_str("</div>");
            html
        }
        ViewMode::List => {
            let mut html = String::from(
                "<table class=\"tickets-table\">\
                    <thead>\
                        <tr>\
                            <th>Ticket</th>\
                            <th>Subject</th>\
                            <th>Product area</th>\
                            <th>Status</th>\
                            <th>Priority</th>\
                            <th>Sentiment</th>\
                            <th>Assignee</th>\
                            <th>Age</th>\
                        </tr>\
                    </thead>\
                    <tbody>",
            );
            for ticket in &view.tickets {
                html.push_str(&render_ticket_row(ticket, now));
            }
            html.push_str("</tbody></table>");
            html
        }
    }
}

fn render_sentiment_chart(view: &DerivedView<'_>) -> String {
    let breakdown = view.sentiment_breakdown();
    let mut html = String::from("<div id=\"explorer-sentiment\" class=\"sentiment-chart\">");
    for (label, count) in [
        (SentimentLabel::Positive, breakdown.positive),
        (SentimentLabel::Neutral, breakdown.neutral),
        (SentimentLabel::Negative, breakdown.negative),
    ] {
        let percent = breakdown.percent(label);
        html.push_str(&format!(
            "<div class=\"sentiment-bar sentiment-{color}\">\
                <span class=\"sentiment-label\">{name}</span>\
                <div class=\"bar\" style=\"width: {percent}%;\"></div>\
                <span class=\"sentiment-count\">{count} ({percent}%)</span>\
            </div>",
            color = label.color(),
            name = label.as_str(),
        ));
    }
    html.push_str("</div>");
    html
}

/// The swappable part of the explorer: tabs, controls, summary and tickets.
pub fn render_view(
    snapshot: &TicketSnapshot,
    selection: &ExplorerSelection,
    scorer: &dyn SentimentScorer,
    now: DateTime<Utc>,
) -> String {
    let view = derive_view(&snapshot.tickets, selection, scorer);
    format!(
        "<div id=\"explorer-view\" class=\"explorer-view view-{mode}\">\
            {state}\
            {tabs}\
            {sort}\
            <p class=\"explorer-summary\">Showing {shown} of {total} tickets \
                <span class=\"explorer-fetched-at\" title=\"{fetched_at}\">as of {fetched_ago} ago</span></p>\
            {chart}\
            {tickets}\
        </div>",
        mode = selection.view.as_param(),
        state = render_state_form(selection),
        tabs = render_tabs(&view, selection),
        sort = render_sort_controls(selection),
        shown = view.len(),
        total = view.snapshot_len,
        fetched_at = snapshot.fetched_at.to_rfc3339(),
        fetched_ago = time_ago(snapshot.fetched_at, now),
        chart = render_sentiment_chart(&view),
        tickets = render_tickets(&view, selection.view, now),
    )
}

pub fn render_explorer_page(
    snapshot: &TicketSnapshot,
    selection: &ExplorerSelection,
    scorer: &dyn SentimentScorer,
    now: DateTime<Utc>,
) -> String {
    format!(
        "<section id=\"ticket-explorer\" class=\"explorer\">\
            <header class=\"explorer-header\">\
                <h2>Ticket Explorer</h2>\
                <input id=\"explorer-search\" type=\"search\" name=\"search\" value=\"{search}\" \
                    placeholder=\"Search tickets...\" hx-get=\"{url}\" hx-trigger=\"keyup changed delay:300ms, search\" \
                    hx-target=\"#explorer-view\" hx-swap=\"outerHTML\" hx-include=\"#explorer-state\">\
            </header>\
            {view}\
        </section>",
        search = html_escape(&selection.search),
        url = ApiUrls::UI_EXPLORER_VIEW,
        view = render_view(snapshot, selection, scorer, now),
    )
}

async fn fetch_snapshot(state: &AppState) -> Result<Arc<TicketSnapshot>, TicketsError> {
    let tickets = storage::with_connection(&state.conn, "fetch tickets", |conn| {
        storage::load_tickets(conn, &TicketFilters::default())
    })
    .await?;
    let snapshot = state.explorer.replace(tickets).await;
    info!("Explorer snapshot refreshed with {} tickets", snapshot.len());
    Ok(snapshot)
}

async fn current_or_fetch(state: &AppState) -> Result<Arc<TicketSnapshot>, TicketsError> {
    match state.explorer.current().await {
        Some(snapshot) => Ok(snapshot),
        None => fetch_snapshot(state).await,
    }
}

fn error_fragment(err: &TicketsError) -> Html<String> {
    err.log();
    Html(render_error_state(&err.public_message()))
}

/// Page load: always refetches and replaces the snapshot.
async fn handle_explorer_page(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ExplorerParams>,
) -> impl IntoResponse {
    let snapshot = match fetch_snapshot(&state).await {
        Ok(snapshot) => snapshot,
        Err(e) => return error_fragment(&e),
    };
    let selection = ExplorerSelection::from(&params);
    Html(render_explorer_page(
        &snapshot,
        &selection,
        state.scorer.as_ref(),
        Utc::now(),
    ))
}

async fn handle_explorer_view(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ExplorerParams>,
) -> impl IntoResponse {
    let snapshot = match current_or_fetch(&state).await {
        Ok(snapshot) => snapshot,
        Err(e) => return error_fragment(&e),
    };
    let selection = ExplorerSelection::from(&params);
    debug!("Deriving explorer view for {selection:?}");
    Html(render_view(
        &snapshot,
        &selection,
        state.scorer.as_ref(),
        Utc::now(),
    ))
}

async fn handle_explorer_sentiment(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ExplorerParams>,
) -> impl IntoResponse {
    let snapshot = match current_or_fetch(&state).await {
        Ok(snapshot) => snapshot,
        Err(e) => return error_fragment(&e),
    };
    let selection = ExplorerSelection::from(&params);
    let view = derive_view(&snapshot.tickets, &selection, state.scorer.as_ref());
    Html(render_sentiment_chart(&view))
}

pub fn configure_explorer_ui_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(ApiUrls::UI_EXPLORER, get(handle_explorer_page))
        .route(ApiUrls::UI_EXPLORER_VIEW, get(handle_explorer_view))
        .route(ApiUrls::UI_EXPLORER_SENTIMENT, get(handle_explorer_sentiment))
}
