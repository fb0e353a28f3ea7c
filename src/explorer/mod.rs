//! In-memory derived views over a cached ticket snapshot.
//!
//! A page load fetches the full ticket list once and stores it as a [`TicketSnapshot`].
//! Every later interaction (search, tab, sort, view mode) calls [`derive_view`] against
//! that snapshot without touching the database.

pub mod present;
pub mod sentiment;
pub mod sort;
pub mod tabs;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::tickets::SupportTicket;

pub use present::{assignee_for, time_ago, Assignee, ViewMode};
pub use sentiment::{KeywordSentimentScorer, Sentiment, SentimentLabel, SentimentScorer};
pub use sort::{DateSort, PrioritySort, SentimentSort, SortSelection};
pub use tabs::{tab_counts, Tab, TabCounts};

#[derive(Debug, Clone)]
pub struct TicketSnapshot {
    pub tickets: Vec<SupportTicket>,
    pub fetched_at: DateTime<Utc>,
}

impl TicketSnapshot {
    pub fn new(tickets: Vec<SupportTicket>) -> Self {
        Self {
            tickets,
            fetched_at: Utc::now(),
        }
    }

    pub fn len(&self) -> usize {
        self.tickets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickets.is_empty()
    }
}

/// Shared slot for the latest snapshot. Replaced wholesale, never mutated in place.
#[derive(Debug, Clone, Default)]
pub struct SnapshotCache {
    slot: Arc<RwLock<Option<Arc<TicketSnapshot>>>>,
}

impl SnapshotCache {
    pub async fn current(&self) -> Option<Arc<TicketSnapshot>> {
        self.slot.read().await.clone()
    }

    pub async fn replace(&self, tickets: Vec<SupportTicket>) -> Arc<TicketSnapshot> {
        let snapshot = Arc::new(TicketSnapshot::new(tickets));
        *self.slot.write().await = Some(Arc::clone(&snapshot));
        snapshot
    }
}

/// Raw query string of the explorer fragments. Anything unrecognised falls back to defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExplorerParams {
    pub search: Option<String>,
    pub tab: Option<String>,
    pub priority_sort: Option<String>,
    pub sentiment_sort: Option<String>,
    pub date_sort: Option<String>,
    pub view: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExplorerSelection {
    pub search: String,
    pub tab: Tab,
    pub sort: SortSelection,
    pub view: ViewMode,
}

impl From<&ExplorerParams> for ExplorerSelection {
    fn from(params: &ExplorerParams) -> Self {
        Self {
            search: params.search.clone().unwrap_or_default(),
            tab: Tab::from_param(params.tab.as_deref()),
            sort: SortSelection::from_params(
                params.priority_sort.as_deref(),
                params.sentiment_sort.as_deref(),
                params.date_sort.as_deref(),
            ),
            view: ViewMode::from_param(params.view.as_deref()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TicketView<'a> {
    pub ticket: &'a SupportTicket,
    pub sentiment: Sentiment,
    pub assignee: &'static Assignee,
}

#[derive(Debug, Clone)]
pub struct DerivedView<'a> {
    pub tickets: Vec<TicketView<'a>>,
    pub tab_counts: TabCounts,
    pub snapshot_len: usize,
}

impl DerivedView<'_> {
    pub fn len(&self) -> usize {
        self.tickets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickets.is_empty()
    }

    pub fn sentiment_breakdown(&self) -> SentimentBreakdown {
        let mut breakdown = SentimentBreakdown::default();
        for view in &self.tickets {
            match view.sentiment.label {
                SentimentLabel::Positive => breakdown.positive += 1,
                SentimentLabel::Neutral => breakdown.neutral += 1,
                SentimentLabel::Negative => breakdown.negative += 1,
            }
        }
        breakdown
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SentimentBreakdown {
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
}

impl SentimentBreakdown {
    pub fn total(&self) -> usize {
        self.positive + self.neutral + self.negative
    }

    /// Rounded whole percent of the total; 0 when there is nothing to count.
    pub fn percent(&self, label: SentimentLabel) -> u32 {
        let total = self.total();
        if total == 0 {
            return 0;
        }
        let n = match label {
            SentimentLabel::Positive => self.positive,
            SentimentLabel::Neutral => self.neutral,
            SentimentLabel::Negative => self.negative,
        };
        ((n as f64 / total as f64) * 100.0).round() as u32
    }
}

/// Case-insensitive substring over subject, body, id, product area and persona.
/// A blank term matches everything. Otherwise the term is matched as typed, spaces included.
pub fn matches_search(ticket: &SupportTicket, term: &str) -> bool {
    if term.trim().is_empty() {
        return true;
    }
    let term = term.to_lowercase();

    [
        ticket.ticket_subject.as_deref(),
        Some(ticket.ticket_body.as_str()),
        Some(ticket.ticket_id.as_str()),
        ticket.product_area.as_deref(),
        ticket.user_persona.as_deref(),
    ]
    .into_iter()
    .flatten()
    .any(|field| field.to_lowercase().contains(&term))
}

/// Tab filter, then search filter, then sort. Date order is applied first and the
/// priority or sentiment sort after it, so ties keep date order.
pub fn derive_view<'a>(
    tickets: &'a [SupportTicket],
    selection: &ExplorerSelection,
    scorer: &dyn SentimentScorer,
) -> DerivedView<'a> {
    let mut rows: Vec<(&SupportTicket, Sentiment)> = tickets
        .iter()
        .filter(|t| selection.tab.matches(t))
        .filter(|t| matches_search(t, &selection.search))
        .map(|t| (t, scorer.sentiment(t)))
        .collect();

    let sort = selection.sort;
    rows.sort_by(|(a, _), (b, _)| sort.date().compare(&a.timestamp_utc, &b.timestamp_utc));

    if sort.priority() != PrioritySort::None {
        rows.sort_by(|(a, _), (b, _)| {
            sort.priority().compare(a.priority_rank(), b.priority_rank())
        });
    } else if sort.sentiment() != SentimentSort::None {
        rows.sort_by(|(_, a), (_, b)| sort.sentiment().compare(a.score, b.score));
    }

    DerivedView {
        tickets: rows
            .into_iter()
            .enumerate()
            .map(|(index, (ticket, sentiment))| TicketView {
                ticket,
                sentiment,
                assignee: assignee_for(index),
            })
            .collect(),
        tab_counts: tab_counts(tickets),
        snapshot_len: tickets.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn base_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 8, 20, 9, 0, 0).unwrap()
    }

    fn ticket(id: &str, hours_ago: i64, priority: &str, status: &str, body: &str) -> SupportTicket {
        SupportTicket {
            ticket_id: id.to_string(),
            timestamp_utc: base_time() - Duration::hours(hours_ago),
            user_id: "U-1".to_string(),
            user_persona: Some("Research Analyst".to_string()),
            client_firm_tier: 2,
            product_area: Some("Excel_Plugin".to_string()),
            ticket_status: status.to_string(),
            ticket_priority: priority.to_string(),
            ticket_subject: Some(format!("Ticket {id}")),
            ticket_body: body.to_string(),
        }
    }

    fn ids(view: &DerivedView<'_>) -> Vec<String> {
        view.tickets
            .iter()
            .map(|v| v.ticket.ticket_id.clone())
            .collect()
    }

    fn select(priority: PrioritySort, sentiment: SentimentSort) -> ExplorerSelection {
        let mut sel = ExplorerSelection::default();
        sel.sort.set_sentiment(sentiment);
        sel.sort.set_priority(priority);
        sel
    }

    #[test]
    fn test_default_view_is_newest_first() {
        let tickets = vec![
            ticket("T1", 5, "low", "open", "x"),
            ticket("T2", 1, "low", "open", "x"),
            ticket("T3", 3, "low", "open", "x"),
        ];
        let view = derive_view(&tickets, &ExplorerSelection::default(), &KeywordSentimentScorer);
        assert_eq!(ids(&view), ["T2", "T3", "T1"]);

        let mut oldest = ExplorerSelection::default();
        oldest.sort.set_date(DateSort::OldestFirst);
        let view = derive_view(&tickets, &oldest, &KeywordSentimentScorer);
        assert_eq!(ids(&view), ["T1", "T3", "T2"]);
    }

    #[test]
    fn test_priority_sort_both_directions() {
        let tickets = vec![
            ticket("LOW", 1, "low", "open", "x"),
            ticket("URG", 2, "urgent", "open", "x"),
            ticket("MED", 3, "medium", "open", "x"),
        ];
        let high = derive_view(
            &tickets,
            &select(PrioritySort::HighFirst, SentimentSort::None),
            &KeywordSentimentScorer,
        );
        assert_eq!(ids(&high), ["URG", "MED", "LOW"]);

        let low = derive_view(
            &tickets,
            &select(PrioritySort::LowFirst, SentimentSort::None),
            &KeywordSentimentScorer,
        );
        assert_eq!(ids(&low), ["LOW", "MED", "URG"]);
    }

    #[test]
    fn test_priority_ties_keep_date_order() {
        let tickets = vec![
            ticket("OLD", 9, "high", "open", "x"),
            ticket("NEW", 1, "high", "open", "x"),
            ticket("MID", 4, "high", "open", "x"),
            ticket("URG", 20, "urgent", "open", "x"),
        ];
        let view = derive_view(
            &tickets,
            &select(PrioritySort::HighFirst, SentimentSort::None),
            &KeywordSentimentScorer,
        );
        assert_eq!(ids(&view), ["URG", "NEW", "MID", "OLD"]);
    }

    #[test]
    fn test_unknown_priority_sorts_with_low() {
        let tickets = vec![
            ticket("ODD", 1, "critical", "open", "x"),
            ticket("MED", 2, "medium", "open", "x"),
        ];
        let view = derive_view(
            &tickets,
            &select(PrioritySort::HighFirst, SentimentSort::None),
            &KeywordSentimentScorer,
        );
        assert_eq!(ids(&view), ["MED", "ODD"]);
    }

    #[test]
    fn test_most_negative_first() {
        let tickets = vec![
            ticket("B", 1, "low", "closed", "great, thanks"),
            ticket("A", 2, "urgent", "open", "terrible bug"),
        ];
        let view = derive_view(
            &tickets,
            &select(PrioritySort::None, SentimentSort::MostNegativeFirst),
            &KeywordSentimentScorer,
        );
        assert_eq!(ids(&view), ["A", "B"]);
        assert_eq!(view.tickets[0].sentiment.label, SentimentLabel::Negative);

        let view = derive_view(
            &tickets,
            &select(PrioritySort::None, SentimentSort::MostPositiveFirst),
            &KeywordSentimentScorer,
        );
        assert_eq!(ids(&view), ["B", "A"]);
    }

    #[test]
    fn test_ai_product_area_counted_and_searchable() {
        let mut t = ticket("TCK-42", 1, "medium", "open", "Chart export fails on refresh");
        t.product_area = Some("AI_Features".to_string());
        let tickets = vec![t, ticket("TCK-43", 2, "low", "open", "Login loop")];

        let sel = ExplorerSelection {
            search: "ai".to_string(),
            ..ExplorerSelection::default()
        };
        let view = derive_view(&tickets, &sel, &KeywordSentimentScorer);
        assert_eq!(view.tab_counts.get(Tab::MentionedAi), 1);
        assert_eq!(ids(&view), ["TCK-42"]);

        let sel = ExplorerSelection {
            search: "AI".to_string(),
            ..ExplorerSelection::default()
        };
        assert_eq!(ids(&derive_view(&tickets, &sel, &KeywordSentimentScorer)), ["TCK-42"]);
    }

    #[test]
    fn test_tab_counts_ignore_active_tab_and_search() {
        let mut esg = ticket("E1", 1, "low", "open", "Carbon data missing");
        esg.product_area = Some("ESG_Data".to_string());
        let tickets = vec![esg, ticket("K1", 2, "low", "open", "Kensho NLP output")];

        let all = derive_view(&tickets, &ExplorerSelection::default(), &KeywordSentimentScorer);
        let narrowed = derive_view(
            &tickets,
            &ExplorerSelection {
                search: "nothing matches this".to_string(),
                tab: Tab::Esg,
                ..ExplorerSelection::default()
            },
            &KeywordSentimentScorer,
        );
        assert!(narrowed.is_empty());
        assert_eq!(all.tab_counts, narrowed.tab_counts);
        assert_eq!(narrowed.snapshot_len, 2);
    }

    #[test]
    fn test_tab_filter_uses_same_predicate_as_count() {
        let mut esg = ticket("E1", 1, "low", "open", "x");
        esg.product_area = Some("ESG_Data".to_string());
        let tickets = vec![esg, ticket("P1", 2, "low", "open", "Venture fund NAV lag")];

        for tab in Tab::ALL {
            let view = derive_view(
                &tickets,
                &ExplorerSelection {
                    tab,
                    ..ExplorerSelection::default()
                },
                &KeywordSentimentScorer,
            );
            assert_eq!(view.len(), view.tab_counts.get(tab), "{tab:?}");
        }
    }

    #[test]
    fn test_blank_search_is_noop() {
        let tickets = vec![ticket("T1", 1, "low", "open", "x")];
        let sel = ExplorerSelection {
            search: "   ".to_string(),
            ..ExplorerSelection::default()
        };
        assert_eq!(derive_view(&tickets, &sel, &KeywordSentimentScorer).len(), 1);
    }

    #[test]
    fn test_search_matches_id_and_persona() {
        let t = ticket("TCK-9001", 1, "low", "open", "x");
        assert!(matches_search(&t, "tck-9001"));
        assert!(matches_search(&t, "research"));
        assert!(!matches_search(&t, "trader"));
    }

    #[test]
    fn test_search_keeps_surrounding_spaces() {
        let t = ticket("TCK-9002", 1, "low", "open", "Export fails on refresh");
        assert!(matches_search(&t, " fails on "));
        assert!(!matches_search(&t, " export"));
        assert!(matches_search(&t, "Export "));
    }

    #[test]
    fn test_assignees_follow_view_position() {
        let tickets: Vec<SupportTicket> = (0..10)
            .map(|i| ticket(&format!("T{i}"), i, "low", "open", "x"))
            .collect();
        let view = derive_view(&tickets, &ExplorerSelection::default(), &KeywordSentimentScorer);
        assert_eq!(view.tickets[0].assignee, assignee_for(0));
        assert_eq!(view.tickets[9].assignee, assignee_for(1));
    }

    #[test]
    fn test_sentiment_breakdown_percentages() {
        let tickets = vec![
            ticket("N", 1, "urgent", "escalated", "x"),
            ticket("P", 2, "low", "closed", "thanks, resolved"),
            ticket("M", 3, "medium", "open", "x"),
        ];
        let view = derive_view(&tickets, &ExplorerSelection::default(), &KeywordSentimentScorer);
        let breakdown = view.sentiment_breakdown();
        assert_eq!(breakdown.total(), 3);
        assert_eq!(breakdown.negative, 1);
        assert_eq!(breakdown.positive, 1);
        assert_eq!(breakdown.percent(SentimentLabel::Neutral), 33);
        assert_eq!(SentimentBreakdown::default().percent(SentimentLabel::Positive), 0);
    }

    #[test]
    fn test_selection_from_params() {
        let params = ExplorerParams {
            search: Some("latency".to_string()),
            tab: Some("esg".to_string()),
            priority_sort: Some("low_first".to_string()),
            sentiment_sort: Some("most_positive".to_string()),
            date_sort: Some("oldest".to_string()),
            view: Some("list".to_string()),
        };
        let sel = ExplorerSelection::from(&params);
        assert_eq!(sel.tab, Tab::Esg);
        assert_eq!(sel.sort.priority(), PrioritySort::LowFirst);
        assert_eq!(sel.sort.sentiment(), SentimentSort::None);
        assert_eq!(sel.sort.date(), DateSort::OldestFirst);
        assert_eq!(sel.view, ViewMode::List);
    }

    #[tokio::test]
    async fn test_snapshot_cache_replaces_wholesale() {
        let cache = SnapshotCache::default();
        assert!(cache.current().await.is_none());

        let first = cache.replace(vec![ticket("T1", 1, "low", "open", "x")]).await;
        let held = cache.current().await;
        cache.replace(Vec::new()).await;

        assert_eq!(first.len(), 1);
        assert_eq!(held.map(|s| s.len()), Some(1));
        assert!(cache.current().await.is_some_and(|s| s.is_empty()));
    }
}
