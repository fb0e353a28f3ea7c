//! Presentation-only helpers: relative timestamps, display assignees and view mode.

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Assignee {
    pub name: &'static str,
    pub role: &'static str,
}

impl Assignee {
    pub fn initials(&self) -> String {
        self.name
            .split_whitespace()
            .filter_map(|part| part.chars().next())
            .collect()
    }
}

pub static ASSIGNEE_ROSTER: [Assignee; 8] = [
    Assignee {
        name: "Sofia Chen",
        role: "AI Product Specialist",
    },
    Assignee {
        name: "Marcus Rodriguez",
        role: "Technical Support Lead",
    },
    Assignee {
        name: "Elena Kowalski",
        role: "ESG Data Analyst",
    },
    Assignee {
        name: "James Kim",
        role: "API Engineering",
    },
    Assignee {
        name: "Dr. Sarah Patel",
        role: "Data Solutions Architect",
    },
    Assignee {
        name: "Alex Thompson",
        role: "Frontend Developer",
    },
    Assignee {
        name: "David Zhang",
        role: "Infrastructure Engineer",
    },
    Assignee {
        name: "Dr. Lisa Wang",
        role: "AI Research Lead",
    },
];

/// Display assignee for the ticket at `index` in the derived view. Not stored anywhere.
pub fn assignee_for(index: usize) -> &'static Assignee {
    &ASSIGNEE_ROSTER[index % ASSIGNEE_ROSTER.len()]
}

/// Relative age label: minutes under an hour, hours under a day, days otherwise.
/// Timestamps in the future read as `"0 min"`.
pub fn time_ago(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let minutes = (now - timestamp).num_minutes().max(0);
    if minutes < 60 {
        return format!("{minutes} min");
    }

    let hours = minutes / 60;
    if hours < 24 {
        return format!("{hours} hour{}", plural(hours));
    }

    let days = hours / 24;
    format!("{days} day{}", plural(days))
}

fn plural(n: i64) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Grid,
    List,
}

impl ViewMode {
    pub fn from_param(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("list") => Self::List,
            _ => Self::Grid,
        }
    }

    pub fn as_param(self) -> &'static str {
        match self {
            Self::Grid => "grid",
            Self::List => "list",
        }
    }
}
