//! CLI entry-point for the offline training job.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args as ClapArgs;
use tracing::instrument;

use crate::{config::Settings, nlp::train};

/// Args for the `train` command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// JSON array of `{text, label}` objects.
    #[arg(long, default_value = "data/training_data.json")]
    pub data: PathBuf,
    /// Output directory; defaults to MODEL_DIR.
    #[arg(long)]
    pub model_dir: Option<PathBuf>,
}

#[instrument(skip(settings))]
pub async fn run(args: Args, settings: Settings) -> Result<()> {
    let model_dir = args.model_dir.unwrap_or_else(|| settings.model_dir.clone());
    let segmenter = settings.segmenter;
    let data = args.data.clone();
    let out = model_dir.clone();
    let report =
        tokio::task::spawn_blocking(move || train::train(&data, &out, segmenter)).await??;

    println!("Training set: {} samples.", report.samples);
    println!("Training accuracy: {:.2}%", report.accuracy * 100.0);
    for (label, count) in &report.label_counts {
        println!("  {:<18} {count}", label.as_str());
    }
    println!("Model saved to {}", model_dir.display());
    Ok(())
}
