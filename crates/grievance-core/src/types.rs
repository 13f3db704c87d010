//! Core types for grievance triage

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

/// Marker written in place of category, priority and sentiment for rows that
/// could not be analyzed
pub const FAILED_MARKER: &str = "Failed";

/// A category name drawn from the taxonomy's candidate list
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryLabel(String);

impl CategoryLabel {
    /// Create a new label
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    /// Borrow the label text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CategoryLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CategoryLabel {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for CategoryLabel {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CategoryLabel {
    fn from(label: &str) -> Self {
        Self::new(label)
    }
}

impl From<String> for CategoryLabel {
    fn from(label: String) -> Self {
        Self(label)
    }
}

/// Ticket priority, derived from the category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriorityLevel {
    #[serde(alias = "red")]
    High,
    #[serde(alias = "orange")]
    Medium,
    #[serde(alias = "green")]
    Low,
}

impl PriorityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }

    /// Colour tier used by dashboards (red / orange / green)
    pub fn colour(&self) -> &'static str {
        match self {
            Self::High => "red",
            Self::Medium => "orange",
            Self::Low => "green",
        }
    }
}

impl fmt::Display for PriorityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PriorityLevel {
    type Err = String;

    /// Accepts either the tier name or its colour, case-insensitively
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" | "red" => Ok(Self::High),
            "medium" | "orange" => Ok(Self::Medium),
            "low" | "green" => Ok(Self::Low),
            other => Err(format!("unknown priority level: {other}")),
        }
    }
}

/// Sentiment tier, derived from the category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLevel {
    Negative,
    Neutral,
    Positive,
}

impl SentimentLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Negative => "Negative",
            Self::Neutral => "Neutral",
            Self::Positive => "Positive",
        }
    }
}

impl fmt::Display for SentimentLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SentimentLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "negative" => Ok(Self::Negative),
            "neutral" => Ok(Self::Neutral),
            "positive" => Ok(Self::Positive),
            other => Err(format!("unknown sentiment level: {other}")),
        }
    }
}

/// Ticket lifecycle state. Transitions are driven by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    Open,
    InProgress,
    Resolved,
    PendingReview,
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::InProgress => "In Progress",
            Self::Resolved => "Resolved",
            Self::PendingReview => "Pending Review",
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category plus the tiers derived from it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Triage {
    pub category: CategoryLabel,

    /// Top-ranked classifier score (0.0-1.0)
    pub confidence: f32,

    pub priority: PriorityLevel,

    pub sentiment: SentimentLevel,
}

/// Outcome of analyzing one complaint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Assessment {
    Classified(Triage),
    Failed { reason: String },
}

impl Assessment {
    pub fn triage(&self) -> Option<&Triage> {
        match self {
            Self::Classified(triage) => Some(triage),
            Self::Failed { .. } => None,
        }
    }

    pub fn category(&self) -> Option<&CategoryLabel> {
        self.triage().map(|t| &t.category)
    }

    pub fn priority(&self) -> Option<PriorityLevel> {
        self.triage().map(|t| t.priority)
    }

    pub fn sentiment(&self) -> Option<SentimentLevel> {
        self.triage().map(|t| t.sentiment)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// A classified (or failed) grievance with its draft reply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: String,

    pub customer: String,

    pub complaint_text: String,

    pub assessment: Assessment,

    pub status: TicketStatus,

    /// Received date as supplied by the input, or the creation date
    pub date: String,

    /// Empty for failed tickets
    pub draft_reply: String,
}

impl Ticket {
    /// Create an open ticket from a successful analysis
    pub fn classified(
        id: impl Into<String>,
        customer: impl Into<String>,
        complaint_text: impl Into<String>,
        triage: Triage,
        draft_reply: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            customer: customer.into(),
            complaint_text: complaint_text.into(),
            assessment: Assessment::Classified(triage),
            status: TicketStatus::Open,
            date: today(),
            draft_reply: draft_reply.into(),
        }
    }

    /// Create a ticket carrying the failure marker; it waits for manual review
    pub fn failed(
        id: impl Into<String>,
        customer: impl Into<String>,
        complaint_text: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            customer: customer.into(),
            complaint_text: complaint_text.into(),
            assessment: Assessment::Failed {
                reason: reason.into(),
            },
            status: TicketStatus::PendingReview,
            date: today(),
            draft_reply: String::new(),
        }
    }

    /// Replace the date
    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = date.into();
        self
    }

    /// Move to another status
    pub fn with_status(mut self, status: TicketStatus) -> Self {
        self.status = status;
        self
    }

    /// Replace the draft reply after a manual edit
    pub fn with_reply(mut self, draft_reply: impl Into<String>) -> Self {
        self.draft_reply = draft_reply.into();
        self
    }

    pub fn is_failed(&self) -> bool {
        self.assessment.is_failed()
    }

    /// Category column value for exports
    pub fn category_field(&self) -> &str {
        self.assessment
            .category()
            .map(CategoryLabel::as_str)
            .unwrap_or(FAILED_MARKER)
    }

    /// Priority column value for exports
    pub fn priority_field(&self) -> &str {
        self.assessment
            .priority()
            .map(|p| p.as_str())
            .unwrap_or(FAILED_MARKER)
    }

    /// Sentiment column value for exports
    pub fn sentiment_field(&self) -> &str {
        self.assessment
            .sentiment()
            .map(|s| s.as_str())
            .unwrap_or(FAILED_MARKER)
    }
}

fn today() -> String {
    chrono::Local::now().date_naive().format("%Y-%m-%d").to_string()
}
