//! Grievance CLI
//!
//! Classifies postal complaints, sets their priority and sentiment, and drafts
//! a reply. Works on a single complaint or a CSV file of them.

use anyhow::Result;
use clap::Parser;
use tracing::{debug, info};

mod cli;
mod commands;
mod config;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    init_tracing(cli.global.verbose, cli.global.log_json);

    // Load configuration
    let config = config::load(&cli.global.config, &cli.global)?;
    debug!(
        backend = ?config.classifier.backend,
        categories = config.categories.len(),
        "Configuration loaded"
    );

    match cli.command {
        Commands::Analyze {
            text,
            id,
            customer,
            json,
            export,
        } => commands::analyze(&config, text, id, customer, json, export.as_deref()).await?,
        Commands::Batch {
            input,
            output,
            summary_json,
            quiet,
        } => {
            info!("Processing {}", input.display());
            commands::batch(&config, &input, &output, summary_json, quiet).await?
        }
        Commands::Validate => commands::validate(&config)?,
        Commands::Labels => commands::labels(&config)?,
    }

    Ok(())
}

/// Logs go to stderr so stdout stays clean for replies, CSV and JSON
fn init_tracing(verbose: bool, json: bool) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("grievance=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("grievance=info"))
    };

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use grievance_classifiers::BackendKind;
    use std::path::PathBuf;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_batch_with_globals() {
        let cli = Cli::try_parse_from([
            "grievance",
            "batch",
            "complaints.csv",
            "-o",
            "out.csv",
            "--backend",
            "hf",
            "-v",
        ])
        .unwrap();

        assert!(cli.global.verbose);
        assert_eq!(cli.global.backend, Some(BackendKind::HuggingFace));
        assert_eq!(cli.global.config, PathBuf::from("grievance.yaml"));
        match cli.command {
            Commands::Batch { input, output, .. } => {
                assert_eq!(input, PathBuf::from("complaints.csv"));
                assert_eq!(output, PathBuf::from("out.csv"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_analyze_defaults() {
        let cli = Cli::try_parse_from(["grievance", "analyze", "Parcel is late"]).unwrap();
        match cli.command {
            Commands::Analyze { text, id, json, .. } => {
                assert_eq!(text.as_deref(), Some("Parcel is late"));
                assert!(id.is_none());
                assert!(!json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_backend_rejected() {
        assert!(Cli::try_parse_from(["grievance", "labels", "--backend", "gpt"]).is_err());
    }
}
