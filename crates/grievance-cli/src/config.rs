//! Configuration loading for the command line

use crate::cli::GlobalArgs;
use anyhow::Context;
use grievance_pipeline::PipelineConfig;
use std::path::Path;
use tracing::debug;

/// Load the pipeline configuration from file and CLI overrides
pub fn load(config_path: &Path, args: &GlobalArgs) -> anyhow::Result<PipelineConfig> {
    // Try to load from file, or use defaults
    let mut config = if config_path.exists() {
        debug!("Loading configuration from {}", config_path.display());
        PipelineConfig::from_file(config_path)
            .with_context(|| format!("failed to load {}", config_path.display()))?
    } else {
        debug!(
            "{} not found, using built-in postal defaults",
            config_path.display()
        );
        PipelineConfig::default()
    };

    // Apply CLI overrides
    if let Some(backend) = args.backend {
        config.classifier.backend = backend;
    }

    if let Some(model) = &args.model {
        config.classifier.model = model.clone();
    }

    if let Some(token) = &args.hf_token {
        config.classifier.api_token = Some(token.clone());
    }

    Ok(config)
}
