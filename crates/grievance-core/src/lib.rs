//! Grievance Core
//!
//! Core types, traits, and utilities shared across the grievance triage crates.
//!
//! This crate provides:
//! - The ticket data model (categories, priority and sentiment tiers, statuses)
//! - The category taxonomy with its static priority/sentiment mapping
//! - Error types and result handling

pub mod error;
pub mod taxonomy;
pub mod types;

pub use error::{Error, Result};
pub use taxonomy::{CategorySpec, Taxonomy};
pub use types::{
    Assessment, CategoryLabel, PriorityLevel, SentimentLevel, Ticket, TicketStatus, Triage,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::taxonomy::Taxonomy;
    pub use crate::types::{
        Assessment, CategoryLabel, PriorityLevel, SentimentLevel, Ticket, TicketStatus,
    };
}
