//! Entry point wiring CLI dispatch to the analysis service.

use anyhow::Result;
use site_report_nlp::{cli::Cli, config::Settings, logging};
use tracing::{info, instrument};

#[tokio::main]
#[instrument]
async fn main() -> Result<()> {
    logging::init_tracing()?;
    let settings = Settings::load()?;
    let cli = Cli::parse();

    info!(?cli, mode = settings.classifier_mode.as_str(), "starting command");
    cli.dispatch(settings).await
}
