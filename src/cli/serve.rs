//! CLI entry-point for serving the HTTP API.

use std::sync::Arc;

use anyhow::Result;
use clap::Args as ClapArgs;
use tokio::task;
use tracing::{info, instrument};

use crate::{api, config::Settings, nlp::Analyzer};

/// Run the Axum server.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// Port to bind (default 8000).
    #[arg(long, default_value_t = 8000)]
    pub port: u16,
    /// Host address, defaults to all interfaces.
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,
}

#[instrument(skip(settings))]
pub async fn run(args: Args, settings: Settings) -> Result<()> {
    let analyzer = Arc::new(Analyzer::new(&settings)?);
    // Load artifacts before the first request instead of inside a handler.
    let warm = Arc::clone(&analyzer);
    let model_available = task::spawn_blocking(move || warm.is_model_available()).await?;
    info!(
        mode = settings.classifier_mode.as_str(),
        segmenter = settings.segmenter.as_str(),
        model_available,
        "analyzer ready"
    );
    api::serve(analyzer, args.host, args.port).await
}
