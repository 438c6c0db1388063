//! Runtime configuration utilities for site-report-nlp.

use std::{env, fmt, path::PathBuf};

use tracing::warn;

use crate::nlp::segment::SegmenterKind;

const DEFAULT_API_VERSION: &str = "2024-10-01-preview";

/// Backend selection for sentence classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClassifierMode {
    /// TF-IDF + logistic regression artifacts only.
    #[default]
    Statistical,
    /// Remote chat-completion classifier, statistical fallback per sentence.
    Remote,
    /// Currently routed exactly like `Remote`.
    Hybrid,
}

impl ClassifierMode {
    /// Parse a mode string; anything unrecognised maps to `Statistical` with a warning.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "ml" => Self::Statistical,
            "llm" => Self::Remote,
            "hybrid" => Self::Hybrid,
            other => {
                warn!(value = other, "unknown NLP_CLASSIFIER_MODE; using ml");
                Self::Statistical
            }
        }
    }

    /// Wire name reported in analysis metadata.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Statistical => "ml",
            Self::Remote => "llm",
            Self::Hybrid => "hybrid",
        }
    }

    /// Whether this mode prefers the remote classifier when it is configured.
    pub fn prefers_remote(&self) -> bool {
        matches!(self, Self::Remote | Self::Hybrid)
    }
}

/// Connection details for the remote chat-completion classifier.
#[derive(Clone, Default)]
pub struct RemoteSettings {
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub deployment: Option<String>,
    pub api_version: String,
}

impl RemoteSettings {
    /// Endpoint, credential and deployment must all be present.
    pub fn is_configured(&self) -> bool {
        self.endpoint.is_some() && self.api_key.is_some() && self.deployment.is_some()
    }
}

impl fmt::Debug for RemoteSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteSettings")
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("deployment", &self.deployment)
            .field("api_version", &self.api_version)
            .finish()
    }
}

/// Application configuration resolved from `.env` and defaults.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Which classifier backend handles sentences.
    pub classifier_mode: ClassifierMode,
    /// Sentence splitter and lemmatizer used for serving and training.
    pub segmenter: SegmenterKind,
    /// Folder holding `vectorizer.json` and `classifier.json`.
    pub model_dir: PathBuf,
    pub remote: RemoteSettings,
}

impl Settings {
    /// Load configuration from environment with reasonable defaults.
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Ok(Self::from_lookup(|key| env::var(key).ok()))
    }

    /// Resolve settings through an arbitrary variable lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let classifier_mode = var("NLP_CLASSIFIER_MODE")
            .map(|raw| ClassifierMode::parse(&raw))
            .unwrap_or_default();
        let segmenter = var("NLP_SEGMENTER")
            .map(|raw| SegmenterKind::parse(&raw))
            .unwrap_or_default();
        let model_dir = var("MODEL_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./model"));
        let remote = RemoteSettings {
            endpoint: var("AZURE_OPENAI_ENDPOINT")
                .map(|endpoint| endpoint.trim_end_matches('/').to_string())
                .filter(|endpoint| !endpoint.is_empty()),
            api_key: var("AZURE_OPENAI_KEY"),
            deployment: var("AZURE_OPENAI_DEPLOYMENT_NAME"),
            api_version: var("AZURE_OPENAI_API_VERSION")
                .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
        };

        if classifier_mode.prefers_remote() && !remote.is_configured() {
            warn!(
                mode = classifier_mode.as_str(),
                "remote classifier not configured; sentences will use the statistical model"
            );
        }

        Self {
            classifier_mode,
            segmenter,
            model_dir,
            remote,
        }
    }
}
