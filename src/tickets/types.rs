use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::core::shared::schema::{enriched_feedback, support_tickets};

use super::error::TicketsError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Queryable, Selectable)]
#[diesel(table_name = support_tickets)]
pub struct SupportTicket {
    pub ticket_id: String,
    pub timestamp_utc: DateTime<Utc>,
    pub user_id: String,
    pub user_persona: Option<String>,
    pub client_firm_tier: i32,
    pub product_area: Option<String>,
    pub ticket_status: String,
    pub ticket_priority: String,
    pub ticket_subject: Option<String>,
    pub ticket_body: String,
}

impl SupportTicket {
    pub fn priority(&self) -> Option<TicketPriority> {
        TicketPriority::parse(&self.ticket_priority)
    }

    pub fn status(&self) -> Option<TicketStatus> {
        TicketStatus::parse(&self.ticket_status)
    }

    /// Unrecognized priorities rank with `low`.
    pub fn priority_rank(&self) -> u8 {
        self.priority().map_or(1, TicketPriority::rank)
    }

    pub fn subject_or_default(&self) -> &str {
        self.ticket_subject.as_deref().unwrap_or("No Subject")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Queryable, Selectable)]
#[diesel(table_name = enriched_feedback)]
pub struct EnrichedFeedback {
    pub enrichment_id: i32,
    pub ticket_id: String,
    pub processed_at_utc: DateTime<Utc>,
    pub feedback_category: Option<String>,
    pub detected_topics: Option<Vec<String>>,
    pub sentiment_score: Option<f64>,
    pub priority_score: Option<f64>,
    pub mentioned_entities: Option<serde_json::Value>,
    pub is_churn_risk: bool,
    pub llm_summary: Option<String>,
}

/// Enrichment columns as they appear on a joined row; all `null` when the ticket has none.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnrichmentFields {
    pub enrichment_id: Option<i32>,
    pub processed_at_utc: Option<DateTime<Utc>>,
    pub feedback_category: Option<String>,
    pub detected_topics: Option<Vec<String>>,
    pub sentiment_score: Option<f64>,
    pub priority_score: Option<f64>,
    pub mentioned_entities: Option<serde_json::Value>,
    pub is_churn_risk: Option<bool>,
    pub llm_summary: Option<String>,
}

impl From<Option<EnrichedFeedback>> for EnrichmentFields {
    fn from(enrichment: Option<EnrichedFeedback>) -> Self {
        let Some(e) = enrichment else {
            return Self::default();
        };
        Self {
            enrichment_id: Some(e.enrichment_id),
            processed_at_utc: Some(e.processed_at_utc),
            feedback_category: e.feedback_category,
            detected_topics: e.detected_topics,
            sentiment_score: e.sentiment_score,
            priority_score: e.priority_score,
            mentioned_entities: e.mentioned_entities,
            is_churn_risk: Some(e.is_churn_risk),
            llm_summary: e.llm_summary,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedTicket {
    #[serde(flatten)]
    pub ticket: SupportTicket,
    #[serde(flatten)]
    pub enrichment: EnrichmentFields,
}

impl From<(SupportTicket, Option<EnrichedFeedback>)> for EnrichedTicket {
    fn from((ticket, enrichment): (SupportTicket, Option<EnrichedFeedback>)) -> Self {
        Self {
            ticket,
            enrichment: enrichment.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketPriority {
    Low,
    Medium,
    High,
    Urgent,
}

impl TicketPriority {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            "urgent" => Some(Self::Urgent),
            _ => None,
        }
    }

    pub fn rank(self) -> u8 {
        match self {
            Self::Urgent => 4,
            Self::High => 3,
            Self::Medium => 2,
            Self::Low => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    Open,
    Closed,
    Escalated,
}

impl TicketStatus {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "open" => Some(Self::Open),
            "closed" => Some(Self::Closed),
            "escalated" => Some(Self::Escalated),
            _ => None,
        }
    }
}

/// Raw query string of `GET /api/tickets`. Empty values count as absent.
#[derive(Debug, Default, Deserialize)]
pub struct ListTicketsQuery {
    pub status: Option<String>,
    pub priority: Option<String>,
    pub product_area: Option<String>,
    pub user_persona: Option<String>,
    pub client_firm_tier: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketFilters {
    pub status: Option<String>,
    pub priority: Option<String>,
    pub product_area: Option<String>,
    pub user_persona: Option<String>,
    pub client_firm_tier: Option<i32>,
}

impl TicketFilters {
    pub fn matches(&self, ticket: &SupportTicket) -> bool {
        self.status.as_ref().map_or(true, |s| *s == ticket.ticket_status)
            && self
                .priority
                .as_ref()
                .map_or(true, |p| *p == ticket.ticket_priority)
            && self
                .product_area
                .as_ref()
                .map_or(true, |a| ticket.product_area.as_ref() == Some(a))
            && self
                .user_persona
                .as_ref()
                .map_or(true, |u| ticket.user_persona.as_ref() == Some(u))
            && self
                .client_firm_tier
                .map_or(true, |t| t == ticket.client_firm_tier)
    }
}

impl TryFrom<ListTicketsQuery> for TicketFilters {
    type Error = TicketsError;

    fn try_from(query: ListTicketsQuery) -> Result<Self, Self::Error> {
        let client_firm_tier = match non_empty(query.client_firm_tier) {
            Some(raw) => Some(raw.trim().parse::<i32>().map_err(|_| {
                TicketsError::Validation(format!(
                    "client_firm_tier must be an integer, got '{raw}'"
                ))
            })?),
            None => None,
        };

        Ok(Self {
            status: non_empty(query.status),
            priority: non_empty(query.priority),
            product_area: non_empty(query.product_area),
            user_persona: non_empty(query.user_persona),
            client_firm_tier,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

impl SearchQuery {
    /// The search term, or a validation error when it is missing or blank.
    pub fn term(&self) -> Result<&str, TicketsError> {
        match self.q.as_deref() {
            Some(q) if !q.trim().is_empty() => Ok(q),
            _ => Err(TicketsError::Validation(
                "Query parameter required".to_string(),
            )),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
