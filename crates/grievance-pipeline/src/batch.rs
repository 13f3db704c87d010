//! Batch processor
//!
//! Runs every row of a [`Table`] through the [`GrievanceAnalyzer`], strictly in
//! input order and one at a time. A row that cannot be analyzed becomes a
//! failed ticket and the batch carries on; losing the classifier aborts the
//! batch. Cancellation is checked between rows.

use crate::aggregate::{category_distribution, export_csv, sentiment_distribution};
use crate::analyzer::GrievanceAnalyzer;
use crate::progress::{BatchProgress, NoProgress, ProgressReporter};
use crate::table::{ColumnAliases, ColumnMap, Table};
use grievance_core::{CategoryLabel, Error, Result, SentimentLevel, Ticket};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Batch behaviour knobs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchOptions {
    /// Customer name used when the input has none
    #[serde(default = "default_customer")]
    pub default_customer: String,

    /// Prefix of synthesized ticket ids
    #[serde(default = "default_id_prefix")]
    pub generated_id_prefix: String,

    /// Added to the zero-based row index in synthesized ids
    #[serde(default = "default_id_offset")]
    pub generated_id_offset: usize,

    /// Rows slower than this are logged and counted; nothing is interrupted
    #[serde(default = "default_row_latency_budget_ms")]
    pub row_latency_budget_ms: u64,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            default_customer: default_customer(),
            generated_id_prefix: default_id_prefix(),
            generated_id_offset: default_id_offset(),
            row_latency_budget_ms: default_row_latency_budget_ms(),
        }
    }
}

impl BatchOptions {
    pub fn row_latency_budget(&self) -> Duration {
        Duration::from_millis(self.row_latency_budget_ms)
    }

    fn generated_id(&self, index: usize) -> String {
        format!("{}{}", self.generated_id_prefix, index + self.generated_id_offset)
    }
}

/// How a batch run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum BatchOutcome {
    Completed,
    /// Stopped after `processed` rows
    Cancelled { processed: usize },
}

/// One input row with its ticket
#[derive(Debug, Clone)]
pub struct AnalyzedRecord {
    /// Zero-based row index in the input
    pub index: usize,

    /// Original fields, as wide as the input header
    pub fields: Vec<String>,

    pub ticket: Ticket,

    pub latency: Duration,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total_rows: usize,
    pub processed: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub over_budget: usize,
    pub elapsed_ms: u64,
}

/// Result of one batch run, owned by the caller
#[derive(Debug, Clone)]
pub struct BatchResult {
    /// Input header
    pub columns: Vec<String>,

    /// Records in input order
    pub records: Vec<AnalyzedRecord>,

    pub category_counts: BTreeMap<CategoryLabel, usize>,

    pub sentiment_counts: BTreeMap<SentimentLevel, usize>,

    pub summary: BatchSummary,

    pub outcome: BatchOutcome,
}

impl BatchResult {
    fn new(
        columns: Vec<String>,
        records: Vec<AnalyzedRecord>,
        total_rows: usize,
        over_budget: usize,
        elapsed: Duration,
        outcome: BatchOutcome,
    ) -> Self {
        let failed = records.iter().filter(|r| r.ticket.is_failed()).count();
        let summary = BatchSummary {
            total_rows,
            processed: records.len(),
            succeeded: records.len() - failed,
            failed,
            over_budget,
            elapsed_ms: elapsed.as_millis() as u64,
        };

        Self {
            category_counts: category_distribution(records.iter().map(|r| &r.ticket)),
            sentiment_counts: sentiment_distribution(records.iter().map(|r| &r.ticket)),
            columns,
            records,
            summary,
            outcome,
        }
    }

    pub fn tickets(&self) -> impl Iterator<Item = &Ticket> + '_ {
        self.records.iter().map(|r| &r.ticket)
    }

    pub fn failed_records(&self) -> impl Iterator<Item = &AnalyzedRecord> + '_ {
        self.records.iter().filter(|r| r.ticket.is_failed())
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self.outcome, BatchOutcome::Cancelled { .. })
    }

    /// Augmented table as CSV bytes
    pub fn to_csv(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        export_csv(&mut buf, &self.columns, &self.records)?;
        Ok(buf)
    }
}

pub struct BatchProcessor {
    analyzer: Arc<GrievanceAnalyzer>,
    columns: ColumnAliases,
    options: BatchOptions,
}

impl BatchProcessor {
    pub fn new(analyzer: Arc<GrievanceAnalyzer>) -> Self {
        Self {
            analyzer,
            columns: ColumnAliases::default(),
            options: BatchOptions::default(),
        }
    }

    pub fn with_columns(mut self, columns: ColumnAliases) -> Self {
        self.columns = columns;
        self
    }

    pub fn with_options(mut self, options: BatchOptions) -> Self {
        self.options = options;
        self
    }

    pub fn analyzer(&self) -> &GrievanceAnalyzer {
        &self.analyzer
    }

    pub fn options(&self) -> &BatchOptions {
        &self.options
    }

    /// Process a whole table without progress or cancellation
    pub async fn process_batch(&self, table: &Table) -> Result<BatchResult> {
        self.process_with(table, &mut NoProgress, &CancellationToken::new())
            .await
    }

    /// Process a table, reporting after each row and stopping early once
    /// `cancel` fires
    pub async fn process_with<P>(
        &self,
        table: &Table,
        progress: &mut P,
        cancel: &CancellationToken,
    ) -> Result<BatchResult>
    where
        P: ProgressReporter + ?Sized,
    {
        let columns = self.columns.resolve(table.headers())?;
        let total = table.len();
        let budget = self.options.row_latency_budget();
        let start = Instant::now();

        info!(
            rows = total,
            classifier = self.analyzer.classifier_name(),
            "Starting batch"
        );

        let mut records = Vec::with_capacity(total);
        let mut over_budget = 0;
        let mut outcome = BatchOutcome::Completed;

        for (index, fields) in table.rows().iter().enumerate() {
            if cancel.is_cancelled() {
                warn!("Batch cancelled after {}/{} rows", index, total);
                outcome = BatchOutcome::Cancelled { processed: index };
                break;
            }

            let row_start = Instant::now();
            let ticket = self.process_row(index, fields, &columns).await?;
            let latency = row_start.elapsed();

            if latency > budget {
                over_budget += 1;
                metrics::counter!("grievance_rows_over_budget_total").increment(1);
                warn!(
                    ticket_id = %ticket.id,
                    "Row {} took {}ms, over the {}ms budget",
                    index + 1,
                    latency.as_millis(),
                    budget.as_millis()
                );
            }

            records.push(AnalyzedRecord {
                index,
                fields: fields.clone(),
                ticket,
                latency,
            });

            progress.report(&BatchProgress::new(index + 1, total));
        }

        let result = BatchResult::new(
            table.headers().to_vec(),
            records,
            total,
            over_budget,
            start.elapsed(),
            outcome,
        );

        info!(
            processed = result.summary.processed,
            succeeded = result.summary.succeeded,
            failed = result.summary.failed,
            elapsed_ms = result.summary.elapsed_ms,
            "Batch finished"
        );

        Ok(result)
    }

    async fn process_row(&self, index: usize, fields: &[String], columns: &ColumnMap) -> Result<Ticket> {
        let text = ColumnMap::cell(fields, columns.text);
        let ticket_id = ColumnMap::optional(fields, columns.id)
            .map(str::to_string)
            .unwrap_or_else(|| self.options.generated_id(index));
        let customer = ColumnMap::optional(fields, columns.customer)
            .unwrap_or(self.options.default_customer.as_str());

        let analyzed = self.analyzer.analyze(text, &ticket_id, customer).await;
        let ticket = match analyzed {
            Ok(ticket) => {
                metrics::counter!("grievance_rows_total", "outcome" => "classified").increment(1);
                ticket
            }
            Err(e) if e.is_row_recoverable() => {
                metrics::counter!("grievance_rows_total", "outcome" => "failed").increment(1);
                warn!("{}", Error::row_failed(index + 1, e.to_string()));
                Ticket::failed(ticket_id, customer, text, e.to_string())
            }
            Err(e) => {
                error!("Aborting batch at row {}: {}", index + 1, e);
                return Err(e);
            }
        };

        Ok(match ColumnMap::optional(fields, columns.date) {
            Some(date) => ticket.with_date(date),
            None => ticket,
        })
    }
}

fn default_customer() -> String {
    "Customer".to_string()
}

fn default_id_prefix() -> String {
    "GEN-".to_string()
}

fn default_id_offset() -> usize {
    100
}

fn default_row_latency_budget_ms() -> u64 {
    5_000
}
