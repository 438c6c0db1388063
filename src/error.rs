//! Failure taxonomy shared by the classifiers and the analysis pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while classifying sentences.
#[derive(Debug, Error)]
pub enum ClassifierError {
    /// Statistical artifacts are absent from the model directory.
    #[error("Model not found. Run: site-report-nlp train")]
    ModelNotFound { dir: PathBuf },

    /// An artifact exists but cannot be decoded.
    #[error("Model artifact {path} could not be loaded: {message}")]
    ModelCorrupt { path: PathBuf, message: String },

    /// Vectorizer and classifier disagree on their dimensions.
    #[error("Model artifacts are inconsistent: {0}")]
    ModelShape(String),

    #[error("LLM configuration missing. Set AZURE_OPENAI_* env vars.")]
    RemoteConfigMissing,

    /// Transport failure, timeout or undecodable response body.
    #[error("remote classifier request failed: {0}")]
    RemoteRequest(#[from] reqwest::Error),

    #[error("remote classifier returned HTTP {0}")]
    RemoteStatus(reqwest::StatusCode),

    /// A successful response without any completion choice.
    #[error("remote classifier response is malformed: {0}")]
    RemoteMalformed(String),
}

impl ClassifierError {
    /// True when the statistical backend cannot serve; maps to 503 at the HTTP edge.
    pub fn is_model_unavailable(&self) -> bool {
        matches!(
            self,
            Self::ModelNotFound { .. } | Self::ModelCorrupt { .. } | Self::ModelShape(_)
        )
    }
}
