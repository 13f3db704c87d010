//! Subcommand handlers

use anyhow::{bail, Context, Result};
use grievance_core::{Assessment, PriorityLevel, Ticket};
use grievance_pipeline::{
    export_tickets, BatchOutcome, BatchProgress, BatchResult, BatchSummary, CancellationToken,
    LogProgress, PipelineConfig, ProgressReporter, Table,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::{IsTerminal, Read, Write};
use std::path::Path;
use tracing::{info, warn};

const BAR_WIDTH: usize = 30;

/// Classify one complaint and print the diagnosis and draft reply
pub async fn analyze(
    config: &PipelineConfig,
    text: Option<String>,
    id: Option<String>,
    customer: Option<String>,
    json: bool,
    export: Option<&Path>,
) -> Result<()> {
    let text = match text {
        Some(text) => text,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read complaint from stdin")?;
            buf
        }
    };
    if text.trim().is_empty() {
        bail!("Please enter some text to analyze.");
    }

    let ticket_id = id.unwrap_or_else(live_ticket_id);
    let customer = customer.unwrap_or_else(|| config.batch.default_customer.clone());

    let analyzer = config.build_analyzer()?;
    let ticket = analyzer.analyze(text.trim(), &ticket_id, &customer).await?;

    if let Some(path) = export {
        let file = std::fs::File::create(path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        export_tickets(file, [&ticket])?;
        info!("Ticket written to {}", path.display());
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&ticket)?);
    } else {
        print_diagnosis(&ticket);
    }
    Ok(())
}

/// Process a CSV file and write the augmented table
pub async fn batch(
    config: &PipelineConfig,
    input: &Path,
    output: &Path,
    summary_json: bool,
    quiet: bool,
) -> Result<()> {
    let table =
        Table::from_path(input).with_context(|| format!("failed to read {}", input.display()))?;
    let processor = config.build_processor()?;

    let cancel = CancellationToken::new();
    let token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, stopping after the current row");
            token.cancel();
        }
    });

    let result = if quiet {
        processor
            .process_with(&table, &mut LogProgress, &cancel)
            .await?
    } else {
        let mut bar = ProgressBar::default();
        let result = processor.process_with(&table, &mut bar, &cancel).await;
        bar.finish();
        result?
    };

    let file = std::fs::File::create(output)
        .with_context(|| format!("failed to create {}", output.display()))?;
    let mut writer = std::io::BufWriter::new(file);
    writer.write_all(&result.to_csv()?)?;
    writer.flush()?;
    info!("Augmented table written to {}", output.display());

    if summary_json {
        println!("{}", serde_json::to_string_pretty(&RunReport::from(&result))?);
    } else {
        print_summary(&result, output);
    }
    Ok(())
}

/// Validate categories, templates and the fallback label
pub fn validate(config: &PipelineConfig) -> Result<()> {
    let taxonomy = config.validate()?;
    println!(
        "Configuration OK: {} categories, {} templates, backend {:?}",
        taxonomy.len(),
        config.templates().len(),
        config.classifier.backend
    );
    Ok(())
}

/// Print the category table
pub fn labels(config: &PipelineConfig) -> Result<()> {
    let taxonomy = config.taxonomy()?;
    println!("{:<22} {:<8} {:<8} {}", "CATEGORY", "PRIORITY", "COLOUR", "SENTIMENT");
    for spec in taxonomy.specs() {
        println!(
            "{:<22} {:<8} {:<8} {}",
            spec.label,
            spec.priority,
            spec.priority.colour(),
            spec.sentiment
        );
    }
    Ok(())
}

fn live_ticket_id() -> String {
    let uuid = uuid::Uuid::new_v4().simple().to_string();
    format!("LIVE-{}", &uuid[..8].to_ascii_uppercase())
}

fn priority_banner(priority: PriorityLevel) -> &'static str {
    match priority {
        PriorityLevel::High => "HIGH PRIORITY TICKET",
        PriorityLevel::Medium => "MEDIUM PRIORITY TICKET",
        PriorityLevel::Low => "STANDARD TICKET",
    }
}

fn print_diagnosis(ticket: &Ticket) {
    let Some(triage) = ticket.assessment.triage() else {
        println!("Ticket {} could not be classified", ticket.id);
        return;
    };

    println!("Ticket:     {}", ticket.id);
    println!("Category:   {}", triage.category);
    println!("Confidence: {:.1}%", triage.confidence * 100.0);
    println!("Sentiment:  {}", triage.sentiment);
    println!(
        "Priority:   {} ({})",
        priority_banner(triage.priority),
        triage.priority.colour()
    );
    println!();
    println!("Draft reply");
    println!("-----------");
    println!("{}", ticket.draft_reply);
}

fn print_summary(result: &BatchResult, output: &Path) {
    let summary = &result.summary;
    if result.is_cancelled() {
        println!(
            "Batch cancelled: {}/{} rows processed",
            summary.processed, summary.total_rows
        );
    } else {
        println!("Processed {} tickets successfully!", summary.processed);
    }
    println!(
        "Succeeded: {}  Failed: {}  Over budget: {}  Elapsed: {} ms",
        summary.succeeded, summary.failed, summary.over_budget, summary.elapsed_ms
    );

    println!();
    println!("Complaint distribution");
    for (category, count) in &result.category_counts {
        println!("  {:<22} {}", category, count);
    }
    println!("Customer sentiment");
    for (sentiment, count) in &result.sentiment_counts {
        println!("  {:<22} {}", sentiment, count);
    }

    for record in result.failed_records() {
        if let Some(reason) = failure_reason(&record.ticket) {
            println!("  row {} ({}): {}", record.index + 1, record.ticket.id, reason);
        }
    }
    println!();
    println!("Output: {}", output.display());
}

fn failure_reason(ticket: &Ticket) -> Option<&str> {
    match &ticket.assessment {
        Assessment::Failed { reason } => Some(reason),
        Assessment::Classified(_) => None,
    }
}

/// Machine-readable run report
#[derive(Debug, Serialize)]
struct RunReport<'a> {
    outcome: &'a BatchOutcome,
    summary: &'a BatchSummary,
    categories: BTreeMap<&'a str, usize>,
    sentiments: BTreeMap<&'a str, usize>,
}

impl<'a> From<&'a BatchResult> for RunReport<'a> {
    fn from(result: &'a BatchResult) -> Self {
        Self {
            outcome: &result.outcome,
            summary: &result.summary,
            categories: result
                .category_counts
                .iter()
                .map(|(label, count)| (label.as_str(), *count))
                .collect(),
            sentiments: result
                .sentiment_counts
                .iter()
                .map(|(sentiment, count)| (sentiment.as_str(), *count))
                .collect(),
        }
    }
}

/// Redraws a single progress line on stderr
#[derive(Debug, Default)]
struct ProgressBar {
    drawn: bool,
}

impl ProgressBar {
    fn finish(&mut self) {
        if self.drawn {
            eprintln!();
        }
    }
}

impl ProgressReporter for ProgressBar {
    fn report(&mut self, progress: &BatchProgress) {
        let stderr = std::io::stderr();
        if !stderr.is_terminal() {
            return;
        }
        let filled = (progress.fraction() * BAR_WIDTH as f32).round() as usize;
        let bar: String = "#".repeat(filled) + &" ".repeat(BAR_WIDTH.saturating_sub(filled));
        eprint!(
            "\r[{bar}] {:>3}% {}",
            (progress.fraction() * 100.0).round() as u32,
            progress.message
        );
        let _ = stderr.lock().flush();
        self.drawn = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_live_ticket_id_shape() {
        let id = live_ticket_id();
        assert!(id.starts_with("LIVE-"));
        assert_eq!(id.len(), "LIVE-".len() + 8);
        assert_ne!(id, live_ticket_id());
    }

    #[test]
    fn test_priority_banner() {
        assert_eq!(priority_banner(PriorityLevel::High), "HIGH PRIORITY TICKET");
        assert_eq!(priority_banner(PriorityLevel::Low), "STANDARD TICKET");
    }

    #[tokio::test]
    async fn test_batch_writes_augmented_csv() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("complaints.csv");
        let output = dir.path().join("out.csv");
        std::fs::write(
            &input,
            "Complaint_ID,Complaint\nC1,My parcel arrived broken\nC2,\n",
        )
        .unwrap();

        batch(&PipelineConfig::default(), &input, &output, true, true)
            .await
            .unwrap();

        let table = Table::from_path(&output).unwrap();
        assert_eq!(
            table.headers(),
            [
                "Complaint_ID",
                "Complaint",
                "Category",
                "Priority",
                "Sentiment",
                "Draft_Reply"
            ]
        );
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0][2], "Damaged/Lost");
        assert_eq!(table.rows()[1][2], "Failed");
    }

    #[tokio::test]
    async fn test_analyze_rejects_blank_text() {
        let err = analyze(
            &PipelineConfig::default(),
            Some("   ".to_string()),
            None,
            None,
            true,
            None,
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("enter some text"));
    }
}
