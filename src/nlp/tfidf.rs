//! Word and bigram TF-IDF vectorizer persisted as JSON.

use std::collections::{BTreeMap, HashMap, HashSet};

use ndarray::Array2;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static TERM: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w\w+\b").expect("valid regex"));

/// `(column, weight)` pairs sorted by column; absent columns are zero.
pub type SparseVector = Vec<(usize, f64)>;

/// Fitted vocabulary plus smoothed inverse document frequencies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    pub ngram_min: usize,
    pub ngram_max: usize,
    /// Term to column index.
    pub vocabulary: BTreeMap<String, usize>,
    /// One weight per column.
    pub idf: Vec<f64>,
}

impl TfidfVectorizer {
    /// Build a vectorizer from explicit `(term, idf)` pairs. Columns follow term order.
    pub fn from_terms<I, S>(terms: I, ngram_range: (usize, usize)) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let mut pairs: Vec<(String, f64)> = terms
            .into_iter()
            .map(|(term, idf)| (term.into(), idf))
            .collect();
        pairs.sort_by(|a, b| a.0.cmp(&b.0));
        pairs.dedup_by(|a, b| a.0 == b.0);
        let idf = pairs.iter().map(|(_, weight)| *weight).collect();
        let vocabulary = pairs
            .into_iter()
            .enumerate()
            .map(|(col, (term, _))| (term, col))
            .collect();
        Self {
            ngram_min: ngram_range.0,
            ngram_max: ngram_range.1,
            vocabulary,
            idf,
        }
    }

    /// Fit on a corpus keeping the `max_features` most frequent terms.
    pub fn fit(documents: &[String], ngram_range: (usize, usize), max_features: usize) -> Self {
        let mut corpus_counts: HashMap<String, usize> = HashMap::new();
        let mut doc_freq: HashMap<String, usize> = HashMap::new();
        for document in documents {
            let mut seen = HashSet::new();
            for term in analyze(document, ngram_range.0, ngram_range.1) {
                *corpus_counts.entry(term.clone()).or_default() += 1;
                if seen.insert(term.clone()) {
                    *doc_freq.entry(term).or_default() += 1;
                }
            }
        }

        let mut ranked: Vec<(String, usize)> = corpus_counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(max_features);

        let n_docs = documents.len() as f64;
        Self::from_terms(
            ranked.into_iter().map(|(term, _)| {
                let df = doc_freq.get(&term).copied().unwrap_or_default() as f64;
                let idf = ((1.0 + n_docs) / (1.0 + df)).ln() + 1.0;
                (term, idf)
            }),
            ngram_range,
        )
    }

    pub fn n_features(&self) -> usize {
        self.idf.len()
    }

    /// Check internal consistency after deserialisation.
    pub fn validate(&self) -> Result<(), String> {
        if self.ngram_min == 0 || self.ngram_min > self.ngram_max {
            return Err(format!(
                "invalid ngram range ({}, {})",
                self.ngram_min, self.ngram_max
            ));
        }
        if self.vocabulary.len() != self.idf.len() {
            return Err(format!(
                "vocabulary has {} terms but idf has {} weights",
                self.vocabulary.len(),
                self.idf.len()
            ));
        }
        if let Some((term, col)) = self.vocabulary.iter().find(|(_, col)| **col >= self.idf.len()) {
            return Err(format!("term '{term}' points at missing column {col}"));
        }
        Ok(())
    }

    /// L2-normalised TF-IDF weights for one document.
    pub fn transform(&self, document: &str) -> SparseVector {
        let mut counts: HashMap<usize, f64> = HashMap::new();
        for term in analyze(document, self.ngram_min, self.ngram_max) {
            if let Some(&col) = self.vocabulary.get(&term) {
                *counts.entry(col).or_default() += 1.0;
            }
        }

        let mut vector: SparseVector = counts
            .into_iter()
            .map(|(col, tf)| (col, tf * self.idf.get(col).copied().unwrap_or_default()))
            .collect();
        vector.sort_by_key(|(col, _)| *col);

        let norm = vector.iter().map(|(_, v)| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, value) in vector.iter_mut() {
                *value /= norm;
            }
        }
        vector
    }

    /// Dense `(documents, features)` matrix for model fitting.
    pub fn transform_dense(&self, documents: &[String]) -> Array2<f64> {
        let mut matrix = Array2::<f64>::zeros((documents.len(), self.n_features()));
        for (row, document) in documents.iter().enumerate() {
            for (col, value) in self.transform(document) {
                matrix[[row, col]] = value;
            }
        }
        matrix
    }
}

/// Extract word n-grams (words of two or more characters) from a document.
pub fn analyze(document: &str, ngram_min: usize, ngram_max: usize) -> Vec<String> {
    let lowered = document.to_lowercase();
    let words: Vec<&str> = TERM.find_iter(&lowered).map(|m| m.as_str()).collect();
    let mut terms = Vec::new();
    for n in ngram_min.max(1)..=ngram_max {
        if n > words.len() {
            break;
        }
        terms.extend(words.windows(n).map(|window| window.join(" ")));
    }
    terms
}
