use serde::Serialize;

use crate::tickets::SupportTicket;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tab {
    #[default]
    Assigned,
    MentionedAi,
    PrivateMarkets,
    Esg,
}

impl Tab {
    pub const ALL: [Tab; 4] = [
        Tab::Assigned,
        Tab::MentionedAi,
        Tab::PrivateMarkets,
        Tab::Esg,
    ];

    /// Lowercase substrings that place a ticket in this tab. Empty for `Assigned`.
    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            Tab::Assigned => &[],
            Tab::MentionedAi => &["ai", "kensho"],
            Tab::PrivateMarkets => &[
                "private market",
                "private_market",
                "private equity",
                "private credit",
                "venture",
                "funding round",
            ],
            Tab::Esg => &["esg", "sustainab", "climate", "carbon", "emission"],
        }
    }

    pub fn matches(self, ticket: &SupportTicket) -> bool {
        let keywords = self.keywords();
        if keywords.is_empty() {
            return true;
        }

        [
            ticket.ticket_subject.as_deref(),
            ticket.product_area.as_deref(),
            Some(ticket.ticket_body.as_str()),
        ]
        .into_iter()
        .flatten()
        .map(str::to_lowercase)
        .any(|field| keywords.iter().any(|kw| field.contains(kw)))
    }

    pub fn label(self) -> &'static str {
        match self {
            Tab::Assigned => "Assigned to me",
            Tab::MentionedAi => "Mentioned AI",
            Tab::PrivateMarkets => "Private Markets",
            Tab::Esg => "ESG",
        }
    }

    pub fn as_param(self) -> &'static str {
        match self {
            Tab::Assigned => "assigned",
            Tab::MentionedAi => "mentioned_ai",
            Tab::PrivateMarkets => "private_markets",
            Tab::Esg => "esg",
        }
    }

    /// Unknown or missing values select the default tab.
    pub fn from_param(value: Option<&str>) -> Self {
        let Some(value) = value else {
            return Self::default();
        };
        Self::ALL
            .into_iter()
            .find(|tab| tab.as_param().eq_ignore_ascii_case(value.trim()))
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TabCounts {
    pub assigned: usize,
    pub mentioned_ai: usize,
    pub private_markets: usize,
    pub esg: usize,
}

impl TabCounts {
    pub fn get(&self, tab: Tab) -> usize {
        match tab {
            Tab::Assigned => self.assigned,
            Tab::MentionedAi => self.mentioned_ai,
            Tab::PrivateMarkets => self.private_markets,
            Tab::Esg => self.esg,
        }
    }
}

/// Badge counts over the whole snapshot, regardless of the active tab or search.
pub fn tab_counts(tickets: &[SupportTicket]) -> TabCounts {
    let count = |tab: Tab| tickets.iter().filter(|t| tab.matches(t)).count();
    TabCounts {
        assigned: tickets.len(),
        mentioned_ai: count(Tab::MentionedAi),
        private_markets: count(Tab::PrivateMarkets),
        esg: count(Tab::Esg),
    }
}
