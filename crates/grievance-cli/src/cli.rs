use clap::{Args, Parser, Subcommand};
use grievance_classifiers::BackendKind;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "grievance")]
#[command(
    author,
    version,
    about = "Classify postal grievances, set priority and draft replies"
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug, Default)]
pub struct GlobalArgs {
    /// Configuration file path
    #[arg(short, long, global = true, default_value = "grievance.yaml")]
    pub config: PathBuf,

    /// Classifier backend (keyword or huggingface)
    #[arg(long, global = true)]
    pub backend: Option<BackendKind>,

    /// Hosted zero-shot model id
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Hugging Face API token
    #[arg(long, global = true, env = "HF_API_TOKEN", hide_env_values = true)]
    pub hf_token: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub log_json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze a single complaint
    Analyze {
        /// Complaint text; read from stdin when omitted
        text: Option<String>,

        /// Ticket id (defaults to a generated LIVE- id)
        #[arg(long)]
        id: Option<String>,

        /// Customer name used in the reply
        #[arg(long)]
        customer: Option<String>,

        /// Print the ticket as JSON
        #[arg(long)]
        json: bool,

        /// Also write the ticket to this CSV file
        #[arg(long)]
        export: Option<PathBuf>,
    },

    /// Process a CSV file of complaints
    Batch {
        /// Input CSV with a Complaint or Text column
        input: PathBuf,

        /// Output CSV with appended Category, Priority, Sentiment and Draft_Reply
        #[arg(short, long, default_value = "processed_complaints_with_replies.csv")]
        output: PathBuf,

        /// Print the run summary as JSON on stdout
        #[arg(long)]
        summary_json: bool,

        /// Suppress the progress bar
        #[arg(short, long)]
        quiet: bool,
    },

    /// Check that categories, templates and fallback label agree
    Validate,

    /// List categories with their priority and sentiment
    Labels,
}
