//! Offline training: segment labelled reports, fit TF-IDF + logistic regression, save.

use std::{collections::BTreeMap, path::Path};

use anyhow::{bail, Context, Result};
use linfa::{
    dataset::DatasetBase,
    prelude::{Fit, Predict},
};
use linfa_logistic::MultiLogisticRegression;
use ndarray::Array1;
use serde::Deserialize;
use tracing::{info, warn};

use crate::nlp::{
    label::Label, linear::LinearClassifier, segment::SegmenterKind,
    statistical::ModelArtifacts, tfidf::TfidfVectorizer,
};

/// Unigrams and bigrams.
pub const NGRAM_RANGE: (usize, usize) = (1, 2);
pub const MAX_FEATURES: usize = 5000;
pub const MAX_ITERATIONS: u64 = 1000;

/// One labelled report from the training file.
#[derive(Debug, Clone, Deserialize)]
pub struct TrainingExample {
    pub text: String,
    #[serde(default)]
    pub label: Option<String>,
}

/// Sentence-level samples derived from the examples.
#[derive(Debug, Clone, Default)]
pub struct TrainingSet {
    pub documents: Vec<String>,
    pub labels: Vec<Label>,
}

/// Summary printed after a training run.
#[derive(Debug, Clone)]
pub struct TrainingReport {
    pub samples: usize,
    pub accuracy: f64,
    pub label_counts: BTreeMap<Label, usize>,
}

/// Read a JSON array of `{text, label}` objects.
pub fn load_examples(path: &Path) -> Result<Vec<TrainingExample>> {
    if !path.exists() {
        bail!("Training data not found at {}", path.display());
    }
    let raw = std::fs::read_to_string(path).with_context(|| format!("reading {path:?}"))?;
    let examples: Vec<TrainingExample> =
        serde_json::from_str(&raw).with_context(|| format!("parsing {path:?}"))?;
    if examples.is_empty() {
        bail!("{} must be a non-empty array.", path.display());
    }
    Ok(examples)
}

/// Segment every example; each sentence with tokens inherits the example's label.
pub fn build_training_set(examples: &[TrainingExample], segmenter: SegmenterKind) -> TrainingSet {
    let mut set = TrainingSet::default();
    for example in examples {
        let raw_label = example
            .label
            .as_deref()
            .map(|label| label.trim().to_lowercase())
            .filter(|label| !label.is_empty())
            .unwrap_or_else(|| Label::None.as_str().to_string());
        let Ok(label) = raw_label.parse::<Label>() else {
            warn!(label = %raw_label, "skipping example with unknown label");
            continue;
        };
        for sentence in segmenter.segment(&example.text) {
            if !sentence.has_tokens() {
                continue;
            }
            set.documents.push(sentence.joined_tokens());
            set.labels.push(label);
        }
    }
    set
}

/// Fit both artifacts on a training set.
pub fn fit(set: &TrainingSet) -> Result<(ModelArtifacts, TrainingReport)> {
    if set.documents.is_empty() {
        bail!("no training samples after preprocessing");
    }
    let mut classes: Vec<Label> = set.labels.clone();
    classes.sort();
    classes.dedup();
    if classes.len() < 2 {
        bail!("training needs at least two distinct labels, found {}", classes.len());
    }

    let vectorizer = TfidfVectorizer::fit(&set.documents, NGRAM_RANGE, MAX_FEATURES);
    info!(features = vectorizer.n_features(), samples = set.documents.len(), "fitted tf-idf");

    let records = vectorizer.transform_dense(&set.documents);
    let targets: Array1<usize> = set.labels.iter().map(Label::index).collect();
    let dataset = DatasetBase::new(records.clone(), targets);

    let model = MultiLogisticRegression::default().max_iterations(MAX_ITERATIONS);
    let fitted = model.fit(&dataset)?;

    // linfa orders probability columns by ascending target value, which is `classes` order.
    let classifier = LinearClassifier::from_params(classes, fitted.params(), fitted.intercept());
    let artifacts = ModelArtifacts::new(vectorizer, classifier)?;

    let linfa_predictions: Array1<usize> = fitted.predict(&records);
    let mut agree = 0usize;
    let mut correct = 0usize;
    for (row, document) in set.documents.iter().enumerate() {
        let tokens: Vec<String> = document.split(' ').map(str::to_string).collect();
        let predicted = artifacts.classify(&tokens).label;
        if predicted.index() == linfa_predictions[row] {
            agree += 1;
        }
        if predicted == set.labels[row] {
            correct += 1;
        }
    }
    let samples = set.documents.len();
    if (agree as f64) < 0.99 * samples as f64 {
        bail!("exported classifier disagrees with the fitted model on {} of {samples} samples", samples - agree);
    }

    let mut label_counts = BTreeMap::new();
    for label in &set.labels {
        *label_counts.entry(*label).or_insert(0) += 1;
    }
    let report = TrainingReport {
        samples,
        accuracy: correct as f64 / samples as f64,
        label_counts,
    };
    Ok((artifacts, report))
}

/// Full training job: load, segment, fit and write artifacts into `model_dir`.
pub fn train(data_path: &Path, model_dir: &Path, segmenter: SegmenterKind) -> Result<TrainingReport> {
    let examples = load_examples(data_path)?;
    info!(examples = examples.len(), segmenter = segmenter.as_str(), "preprocessing training data");
    let set = build_training_set(&examples, segmenter);
    let (artifacts, report) = fit(&set)?;
    artifacts.save(model_dir)?;
    info!(samples = report.samples, accuracy = report.accuracy, "training complete");
    Ok(report)
}
