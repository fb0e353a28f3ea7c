//! Heuristic sentiment scoring for tickets.
//!
//! Scores live in `[0, 1]`: 0 is a furious customer, 1 a delighted one. The default
//! scorer only looks at priority, status and a fixed keyword vocabulary; anything
//! smarter plugs in through [`SentimentScorer`].

use serde::Serialize;

use crate::tickets::{SupportTicket, TicketPriority, TicketStatus};

pub const NEGATIVE_KEYWORDS: &[&str] = &[
    "terrible",
    "awful",
    "horrible",
    "broken",
    "bug",
    "error",
    "fail",
    "crash",
    "slow",
    "timeout",
    "wrong",
    "frustrat",
    "disappoint",
    "unacceptable",
    "problem",
    "issue",
    "angry",
];

pub const POSITIVE_KEYWORDS: &[&str] = &[
    "great",
    "thank",
    "excellent",
    "love",
    "helpful",
    "awesome",
    "appreciat",
    "perfect",
    "impressed",
    "resolved",
    "amazing",
];

const BASELINE_TENTHS: i32 = 5;
const MAX_TENTHS: i32 = 10;

pub trait SentimentScorer: Send + Sync {
    /// Score in `[0, 1]`.
    fn score(&self, ticket: &SupportTicket) -> f64;

    fn sentiment(&self, ticket: &SupportTicket) -> Sentiment {
        Sentiment::from_score(self.score(ticket))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Negative,
    Neutral,
    Positive,
}

impl SentimentLabel {
    pub fn from_score(score: f64) -> Self {
        if score <= 0.3 {
            Self::Negative
        } else if score <= 0.7 {
            Self::Neutral
        } else {
            Self::Positive
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Negative => "Negative",
            Self::Neutral => "Neutral",
            Self::Positive => "Positive",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Self::Negative => "red",
            Self::Neutral => "yellow",
            Self::Positive => "green",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sentiment {
    pub score: f64,
    pub label: SentimentLabel,
}

impl Sentiment {
    pub fn from_score(score: f64) -> Self {
        let score = score.clamp(0.0, 1.0);
        Self {
            score,
            label: SentimentLabel::from_score(score),
        }
    }
}

/// Fixed-weight scorer. All arithmetic is in tenths so repeated adjustments stay exact.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordSentimentScorer;

impl KeywordSentimentScorer {
    pub fn score_tenths(&self, ticket: &SupportTicket) -> i32 {
        let mut tenths = BASELINE_TENTHS;

        tenths += match ticket.priority() {
            Some(TicketPriority::Urgent) => -3,
            Some(TicketPriority::High) => -2,
            Some(TicketPriority::Low) => 1,
            Some(TicketPriority::Medium) | None => 0,
        };

        tenths += match ticket.status() {
            Some(TicketStatus::Escalated) => -2,
            Some(TicketStatus::Closed) => 1,
            Some(TicketStatus::Open) | None => 0,
        };

        let text = format!(
            "{} {}",
            ticket.ticket_subject.as_deref().unwrap_or_default(),
            ticket.ticket_body
        )
        .to_lowercase();

        tenths -= count_occurrences(&text, NEGATIVE_KEYWORDS);
        tenths += count_occurrences(&text, POSITIVE_KEYWORDS);

        tenths.clamp(0, MAX_TENTHS)
    }
}

impl SentimentScorer for KeywordSentimentScorer {
    fn score(&self, ticket: &SupportTicket) -> f64 {
        f64::from(self.score_tenths(ticket)) / f64::from(MAX_TENTHS)
    }
}

fn count_occurrences(text: &str, keywords: &[&str]) -> i32 {
    let total: usize = keywords.iter().map(|kw| text.matches(kw).count()).sum();
    i32::try_from(total).unwrap_or(i32::MAX)
}
