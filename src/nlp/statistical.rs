//! Statistical backend: TF-IDF vectorizer plus linear classifier loaded from disk.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context;
use once_cell::sync::OnceCell;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info};

use crate::{
    error::ClassifierError,
    nlp::{label::ClassificationResult, linear::LinearClassifier, tfidf::TfidfVectorizer},
};

pub const VECTORIZER_FILE: &str = "vectorizer.json";
pub const CLASSIFIER_FILE: &str = "classifier.json";

/// Both artifacts, checked against each other.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelArtifacts {
    vectorizer: TfidfVectorizer,
    classifier: LinearClassifier,
}

impl ModelArtifacts {
    pub fn new(
        vectorizer: TfidfVectorizer,
        classifier: LinearClassifier,
    ) -> Result<Self, ClassifierError> {
        vectorizer.validate().map_err(ClassifierError::ModelShape)?;
        classifier
            .validate(vectorizer.n_features())
            .map_err(ClassifierError::ModelShape)?;
        Ok(Self {
            vectorizer,
            classifier,
        })
    }

    /// Read both artifacts from `dir`.
    pub fn load(dir: &Path) -> Result<Self, ClassifierError> {
        let vec_path = dir.join(VECTORIZER_FILE);
        let clf_path = dir.join(CLASSIFIER_FILE);
        if !vec_path.exists() || !clf_path.exists() {
            return Err(ClassifierError::ModelNotFound {
                dir: dir.to_path_buf(),
            });
        }
        let vectorizer: TfidfVectorizer = read_json(&vec_path)?;
        let classifier: LinearClassifier = read_json(&clf_path)?;
        Self::new(vectorizer, classifier)
    }

    /// Write both artifacts into `dir`, creating it when needed.
    pub fn save(&self, dir: &Path) -> anyhow::Result<()> {
        fs::create_dir_all(dir).with_context(|| format!("creating model dir {dir:?}"))?;
        write_json(&dir.join(VECTORIZER_FILE), &self.vectorizer)?;
        write_json(&dir.join(CLASSIFIER_FILE), &self.classifier)?;
        info!(dir = %dir.display(), features = self.vectorizer.n_features(), "saved model artifacts");
        Ok(())
    }

    pub fn vectorizer(&self) -> &TfidfVectorizer {
        &self.vectorizer
    }

    pub fn classifier(&self) -> &LinearClassifier {
        &self.classifier
    }

    /// Classify a token sequence exactly as it was represented at training time.
    pub fn classify(&self, tokens: &[String]) -> ClassificationResult {
        let features = self.vectorizer.transform(&tokens.join(" "));
        self.classifier.predict(&features)
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ClassifierError> {
    let corrupt = |message: String| ClassifierError::ModelCorrupt {
        path: path.to_path_buf(),
        message,
    };
    let raw = fs::read_to_string(path).map_err(|err| corrupt(err.to_string()))?;
    serde_json::from_str(&raw).map_err(|err| corrupt(err.to_string()))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    let payload = serde_json::to_string(value)?;
    fs::write(path, payload).with_context(|| format!("writing {path:?}"))
}

/// Lazily loaded, process-lifetime cache of the model artifacts.
///
/// A failed load stores nothing, so the next call retries; once a load succeeds every
/// caller observes the same `Arc` and no further I/O happens.
#[derive(Debug)]
pub struct ModelStore {
    dir: PathBuf,
    cell: OnceCell<Arc<ModelArtifacts>>,
}

impl ModelStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            cell: OnceCell::new(),
        }
    }

    /// A store that already holds `artifacts` and never touches disk.
    pub fn preloaded(artifacts: ModelArtifacts) -> Self {
        Self {
            dir: PathBuf::new(),
            cell: OnceCell::with_value(Arc::new(artifacts)),
        }
    }

    pub fn get(&self) -> Result<Arc<ModelArtifacts>, ClassifierError> {
        self.cell
            .get_or_try_init(|| {
                let artifacts = ModelArtifacts::load(&self.dir)?;
                info!(
                    dir = %self.dir.display(),
                    features = artifacts.vectorizer.n_features(),
                    classes = artifacts.classifier.classes.len(),
                    "loaded statistical model"
                );
                Ok(Arc::new(artifacts))
            })
            .cloned()
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.get().is_some()
    }

    /// Attempts a load if needed.
    pub fn is_available(&self) -> bool {
        match self.get() {
            Ok(_) => true,
            Err(err) => {
                debug!(error = %err, "statistical model unavailable");
                false
            }
        }
    }

    pub fn classify(&self, tokens: &[String]) -> Result<ClassificationResult, ClassifierError> {
        Ok(self.get()?.classify(tokens))
    }
}
