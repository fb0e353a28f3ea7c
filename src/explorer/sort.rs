use serde::Serialize;
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PrioritySort {
    #[default]
    None,
    HighFirst,
    LowFirst,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SentimentSort {
    #[default]
    None,
    MostNegativeFirst,
    MostPositiveFirst,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DateSort {
    #[default]
    NewestFirst,
    OldestFirst,
}

impl PrioritySort {
    pub fn from_param(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("high_first") => Self::HighFirst,
            Some("low_first") => Self::LowFirst,
            _ => Self::None,
        }
    }

    pub fn as_param(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::HighFirst => "high_first",
            Self::LowFirst => "low_first",
        }
    }

    /// none -> high first -> low first -> none
    pub fn next(self) -> Self {
        match self {
            Self::None => Self::HighFirst,
            Self::HighFirst => Self::LowFirst,
            Self::LowFirst => Self::None,
        }
    }

    pub fn compare(self, a: u8, b: u8) -> Ordering {
        match self {
            Self::None => Ordering::Equal,
            Self::HighFirst => b.cmp(&a),
            Self::LowFirst => a.cmp(&b),
        }
    }
}

impl SentimentSort {
    pub fn from_param(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("most_negative") => Self::MostNegativeFirst,
            Some("most_positive") => Self::MostPositiveFirst,
            _ => Self::None,
        }
    }

    pub fn as_param(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::MostNegativeFirst => "most_negative",
            Self::MostPositiveFirst => "most_positive",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Self::None => Self::MostNegativeFirst,
            Self::MostNegativeFirst => Self::MostPositiveFirst,
            Self::MostPositiveFirst => Self::None,
        }
    }

    pub fn compare(self, a: f64, b: f64) -> Ordering {
        match self {
            Self::None => Ordering::Equal,
            Self::MostNegativeFirst => a.total_cmp(&b),
            Self::MostPositiveFirst => b.total_cmp(&a),
        }
    }
}

impl DateSort {
    pub fn from_param(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("oldest") => Self::OldestFirst,
            _ => Self::NewestFirst,
        }
    }

    pub fn as_param(self) -> &'static str {
        match self {
            Self::NewestFirst => "newest",
            Self::OldestFirst => "oldest",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            Self::NewestFirst => Self::OldestFirst,
            Self::OldestFirst => Self::NewestFirst,
        }
    }

    pub fn compare<T: Ord>(self, a: &T, b: &T) -> Ordering {
        match self {
            Self::NewestFirst => b.cmp(a),
            Self::OldestFirst => a.cmp(b),
        }
    }
}

/// Active sort modes. Priority and sentiment never both apply: setting one clears the other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SortSelection {
    priority: PrioritySort,
    sentiment: SentimentSort,
    date: DateSort,
}

impl SortSelection {
    /// Builds a selection from request parameters. When both priority and sentiment
    /// are requested, priority is applied last and therefore wins.
    pub fn from_params(
        priority: Option<&str>,
        sentiment: Option<&str>,
        date: Option<&str>,
    ) -> Self {
        let mut selection = Self {
            date: DateSort::from_param(date),
            ..Self::default()
        };
        selection.set_sentiment(SentimentSort::from_param(sentiment));
        selection.set_priority(PrioritySort::from_param(priority));
        selection
    }

    pub fn priority(&self) -> PrioritySort {
        self.priority
    }

    pub fn sentiment(&self) -> SentimentSort {
        self.sentiment
    }

    pub fn date(&self) -> DateSort {
        self.date
    }

    pub fn set_priority(&mut self, mode: PrioritySort) {
        self.priority = mode;
        if mode != PrioritySort::None {
            self.sentiment = SentimentSort::None;
        }
    }

    pub fn set_sentiment(&mut self, mode: SentimentSort) {
        self.sentiment = mode;
        if mode != SentimentSort::None {
            self.priority = PrioritySort::None;
        }
    }

    pub fn set_date(&mut self, mode: DateSort) {
        self.date = mode;
    }
}
