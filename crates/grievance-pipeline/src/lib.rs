//! Grievance Pipeline
//!
//! Turns complaint text into tickets with a category, priority, sentiment and
//! draft reply, one at a time or a CSV batch at a time.
//!
//! - [`GrievanceAnalyzer`] handles one complaint and is reused by every batch row
//! - [`BatchProcessor`] normalises columns, runs rows in order, reports progress
//!   and honours cancellation between rows
//! - [`aggregate`] computes distributions and writes the augmented CSV

pub mod aggregate;
pub mod analyzer;
pub mod batch;
pub mod config;
pub mod progress;
pub mod table;
pub mod templates;

pub use aggregate::{
    category_distribution, distribution, export_csv, export_tickets, priority_distribution,
    sentiment_distribution, APPENDED_COLUMNS,
};
pub use analyzer::GrievanceAnalyzer;
pub use batch::{AnalyzedRecord, BatchOptions, BatchOutcome, BatchProcessor, BatchResult, BatchSummary};
pub use config::{CategoryConfig, PipelineConfig};
pub use progress::{BatchProgress, ChannelProgress, LogProgress, NoProgress, ProgressReporter};
pub use table::{ColumnAliases, ColumnMap, Table};
pub use templates::{ReplyParams, ReplyTemplates};

pub use tokio_util::sync::CancellationToken;
