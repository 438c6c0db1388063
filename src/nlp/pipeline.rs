//! Analysis orchestrator: segmentation, backend dispatch, fallback and flag assembly.

use std::{sync::Arc, time::Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    config::{ClassifierMode, Settings},
    error::ClassifierError,
    nlp::{
        label::{ClassificationResult, Label},
        remote::{remote_confidence, RemoteClassifier},
        segment::{SegmenterKind, Sentence},
        statistical::ModelStore,
    },
};

/// Minimum probability for a sentence to become a flag.
pub const CONFIDENCE_THRESHOLD: f64 = 0.65;

/// Version tag reported in every result's metadata.
pub const MODEL_VERSION: &str = "tfidf-logreg-v1.0";

/// One reported finding tied to a sentence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flag {
    pub label: Label,
    pub confidence: f64,
    pub snippet: String,
    pub suggested_action: String,
    pub sentence_index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisMetadata {
    pub text_length: usize,
    pub sentence_count: usize,
    pub processing_time_ms: f64,
    pub model_version: String,
    pub classifier_mode: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub flags: Vec<Flag>,
    pub metadata: AnalysisMetadata,
}

/// Which backend classifies the sentences of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Backend {
    Statistical,
    Remote,
}

/// Stateless per request; only the model cache is shared.
#[derive(Debug, Clone)]
pub struct Analyzer {
    mode: ClassifierMode,
    segmenter: SegmenterKind,
    models: Arc<ModelStore>,
    remote: RemoteClassifier,
}

impl Analyzer {
    /// Build the analyzer from settings. Artifacts load lazily on first use.
    pub fn new(settings: &Settings) -> Result<Self, ClassifierError> {
        Ok(Self::with_parts(
            settings.classifier_mode,
            settings.segmenter,
            Arc::new(ModelStore::new(settings.model_dir.clone())),
            RemoteClassifier::new(settings.remote.clone())?,
        ))
    }

    pub fn with_parts(
        mode: ClassifierMode,
        segmenter: SegmenterKind,
        models: Arc<ModelStore>,
        remote: RemoteClassifier,
    ) -> Self {
        Self {
            mode,
            segmenter,
            models,
            remote,
        }
    }

    pub fn segmenter(&self) -> SegmenterKind {
        self.segmenter
    }

    /// Backend availability for health checks: remote configuration in llm/hybrid
    /// mode, loadable artifacts otherwise.
    pub fn is_model_available(&self) -> bool {
        if self.mode.prefers_remote() {
            self.remote.is_configured()
        } else {
            self.models.is_available()
        }
    }

    fn backend(&self) -> Backend {
        if self.mode.prefers_remote() && self.remote.is_configured() {
            Backend::Remote
        } else {
            Backend::Statistical
        }
    }

    /// Analyse `text` and return flags plus run metadata.
    ///
    /// Fails only when the statistical model is needed and cannot be loaded.
    pub async fn analyze(&self, text: &str) -> Result<AnalysisResult, ClassifierError> {
        if text.trim().is_empty() {
            return Ok(AnalysisResult {
                flags: Vec::new(),
                metadata: self.metadata(0, 0, 0.0),
            });
        }

        let start = Instant::now();
        let sentences = self.segmenter.segment(text);
        let backend = self.backend();
        let mut flags = Vec::new();

        for (index, sentence) in sentences.iter().enumerate() {
            if !sentence.has_tokens() {
                continue;
            }
            let result = self.classify_sentence(index, sentence, backend).await?;
            if let Some(flag) = build_flag(index, sentence, result) {
                flags.push(flag);
            }
        }

        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
        let metadata = self.metadata(text.chars().count(), sentences.len(), round2(elapsed_ms));
        info!(
            mode = self.mode.as_str(),
            sentences = metadata.sentence_count,
            flags = flags.len(),
            elapsed_ms = metadata.processing_time_ms,
            "analysis complete"
        );
        Ok(AnalysisResult { flags, metadata })
    }

    async fn classify_sentence(
        &self,
        index: usize,
        sentence: &Sentence,
        backend: Backend,
    ) -> Result<ClassificationResult, ClassifierError> {
        if backend == Backend::Remote {
            match self.remote.classify(&sentence.text).await {
                Ok(label) => return Ok(ClassificationResult::new(label, remote_confidence(label))),
                Err(err) => {
                    warn!(sentence = index, error = %err, "remote classifier failed; using statistical model");
                }
            }
        }
        let result = self.models.classify(&sentence.tokens)?;
        debug!(sentence = index, label = %result.label, confidence = result.confidence, "classified");
        Ok(result)
    }

    fn metadata(
        &self,
        text_length: usize,
        sentence_count: usize,
        processing_time_ms: f64,
    ) -> AnalysisMetadata {
        AnalysisMetadata {
            text_length,
            sentence_count,
            processing_time_ms,
            model_version: MODEL_VERSION.to_string(),
            classifier_mode: self.mode.as_str().to_string(),
        }
    }
}

/// Turn a sentence classification into a flag when it is actionable and confident enough.
pub fn build_flag(index: usize, sentence: &Sentence, result: ClassificationResult) -> Option<Flag> {
    if !result.label.is_actionable() || !result.exceeds_threshold(CONFIDENCE_THRESHOLD) {
        return None;
    }
    Some(Flag {
        label: result.label,
        confidence: round2(result.confidence),
        snippet: sentence.text.clone(),
        suggested_action: result.label.suggested_action().to_string(),
        sentence_index: index,
    })
}

/// Two decimals, ties to even.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}
