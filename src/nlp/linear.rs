//! Multinomial logistic model evaluated over sparse TF-IDF vectors.

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::nlp::{
    label::{ClassificationResult, Label},
    tfidf::SparseVector,
};

/// Per-class weights and intercepts; probabilities are the softmax of the logits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearClassifier {
    pub classes: Vec<Label>,
    /// One row of `n_features` weights per class.
    pub coef: Vec<Vec<f64>>,
    pub intercept: Vec<f64>,
}

impl LinearClassifier {
    /// Convert linfa's `(n_features, n_classes)` parameter layout into per-class rows.
    pub fn from_params(classes: Vec<Label>, params: &Array2<f64>, intercept: &Array1<f64>) -> Self {
        let coef = params
            .columns()
            .into_iter()
            .map(|column| column.to_vec())
            .collect();
        Self {
            classes,
            coef,
            intercept: intercept.to_vec(),
        }
    }

    /// Check shapes against the vectorizer width.
    pub fn validate(&self, n_features: usize) -> Result<(), String> {
        if self.coef.len() != self.classes.len() || self.intercept.len() != self.classes.len() {
            return Err(format!(
                "{} classes but {} coefficient rows and {} intercepts",
                self.classes.len(),
                self.coef.len(),
                self.intercept.len()
            ));
        }
        if let Some(row) = self.coef.iter().find(|row| row.len() != n_features) {
            return Err(format!(
                "coefficient row has {} weights, vectorizer has {n_features} features",
                row.len()
            ));
        }
        Ok(())
    }

    fn logits(&self, x: &SparseVector) -> Vec<f64> {
        self.coef
            .iter()
            .zip(&self.intercept)
            .map(|(row, bias)| {
                bias + x
                    .iter()
                    .map(|(col, value)| row.get(*col).copied().unwrap_or_default() * value)
                    .sum::<f64>()
            })
            .collect()
    }

    /// Probability per class, aligned with `classes`.
    pub fn predict_proba(&self, x: &SparseVector) -> Vec<f64> {
        softmax(&self.logits(x))
    }

    /// Most probable class and its probability; `none` at 0.0 when there are no classes.
    pub fn predict(&self, x: &SparseVector) -> ClassificationResult {
        let probabilities = self.predict_proba(x);
        let best = probabilities
            .iter()
            .enumerate()
            .fold(None, |best: Option<(usize, f64)>, (idx, &p)| match best {
                Some((_, top)) if top >= p => best,
                _ => Some((idx, p)),
            });
        match best.and_then(|(idx, p)| self.classes.get(idx).map(|label| (*label, p))) {
            Some((label, p)) => ClassificationResult::new(label, p),
            None => ClassificationResult::new(Label::None, 0.0),
        }
    }
}

fn softmax(logits: &[f64]) -> Vec<f64> {
    let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = logits.iter().map(|z| (z - max).exp()).collect();
    let total: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / total).collect()
}
