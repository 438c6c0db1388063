//! CLI entry-point for analysing a single report locally.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use tokio::io::AsyncReadExt;
use tracing::instrument;

use crate::{config::Settings, nlp::Analyzer};

/// Args for the `analyze` command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// Report text file; reads stdin when omitted.
    #[arg(long)]
    pub file: Option<PathBuf>,
    /// Print the segmented sentences before the analysis.
    #[arg(long)]
    pub show_sentences: bool,
}

#[instrument(skip(settings))]
pub async fn run(args: Args, settings: Settings) -> Result<()> {
    let text = match &args.file {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading {path:?}"))?,
        None => {
            let mut buf = String::new();
            tokio::io::stdin().read_to_string(&mut buf).await?;
            buf
        }
    };

    let analyzer = Analyzer::new(&settings)?;
    if args.show_sentences {
        for (idx, sentence) in analyzer.segmenter().segment(&text).iter().enumerate() {
            println!("[{idx}] {:?} -> {}", sentence.text, sentence.joined_tokens());
        }
    }

    let result = analyzer.analyze(&text).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
