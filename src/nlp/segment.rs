//! Sentence segmentation and rule-based lemmatization.
//!
//! Both segmenters return the same `(display text, tokens)` shape so that the
//! classifiers never need to know which one produced a sentence. Training and
//! serving must use the same segmenter: the vectorizer only ever sees
//! `tokens.join(" ")`.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// One segmented sentence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sentence {
    /// Trimmed sentence as shown back to users in flag snippets.
    pub text: String,
    /// Normalised word forms fed to the statistical classifier.
    pub tokens: Vec<String>,
}

impl Sentence {
    pub fn has_tokens(&self) -> bool {
        !self.tokens.is_empty()
    }

    /// Document representation shared by training and serving.
    pub fn joined_tokens(&self) -> String {
        self.tokens.join(" ")
    }
}

/// Which segmentation strategy to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SegmenterKind {
    /// Boundary detection plus lemmatization on lowercased text.
    #[default]
    Linguistic,
    /// Period split with whitespace tokens; keeps the original casing in snippets.
    Naive,
}

impl SegmenterKind {
    /// Parse a segmenter name; unknown values fall back to `Linguistic` with a warning.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "linguistic" => Self::Linguistic,
            "naive" => Self::Naive,
            other => {
                warn!(value = other, "unknown NLP_SEGMENTER; using linguistic");
                Self::Linguistic
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Linguistic => "linguistic",
            Self::Naive => "naive",
        }
    }

    pub fn segment(&self, text: &str) -> Vec<Sentence> {
        if text.trim().is_empty() {
            return Vec::new();
        }
        match self {
            Self::Linguistic => linguistic(text),
            Self::Naive => naive(text),
        }
    }
}

/// Segment `text` with the given strategy. Never fails; empty input yields no sentences.
pub fn segment(text: &str, kind: SegmenterKind) -> Vec<Sentence> {
    kind.segment(text)
}

static BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[.!?]+["')\]]*(?:\s+|$)"#).expect("valid regex"));

static TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\d+(?:[.,:/]\d+)+|\w+(?:'\w+)*|[^\w\s]+").expect("valid regex")
});

/// Never end a sentence: titles precede names and dotted forms carry their own periods.
const ALWAYS_JOINED: &[&str] = &["mr", "mrs", "ms", "dr", "e.g", "i.e"];

/// End a sentence unless the next word continues in lowercase or with a number.
const ABBREVIATIONS: &[&str] = &[
    "approx", "vs", "fig", "dept", "qty", "incl", "excl", "st", "etc",
];

fn linguistic(text: &str) -> Vec<Sentence> {
    let normalized = text.trim().replace('\u{2019}', "'");
    split_sentences(&normalized)
        .into_iter()
        .filter_map(|raw| {
            let raw = raw.to_lowercase();
            let tokens: Vec<String> = tokenize(&raw)
                .into_iter()
                .map(|token| lemmatize(&token))
                .filter(|lemma| !lemma.trim().is_empty())
                .collect();
            if tokens.is_empty() {
                return None;
            }
            Some(Sentence { text: raw, tokens })
        })
        .collect()
}

fn naive(text: &str) -> Vec<Sentence> {
    text.replace('\n', " ")
        .split('.')
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(|piece| Sentence {
            text: piece.to_string(),
            tokens: piece
                .to_lowercase()
                .split_whitespace()
                .map(str::to_string)
                .collect(),
        })
        .collect()
}

/// Split on terminal punctuation and line breaks, skipping common abbreviations.
///
/// Casing matters: run this before lowercasing so "Block A. Access" still splits.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    for line in text.lines() {
        let mut start = 0;
        for boundary in BOUNDARY.find_iter(line) {
            if boundary.end() < line.len()
                && is_abbreviation(&line[start..boundary.start()], &line[boundary.end()..])
            {
                continue;
            }
            sentences.push(line[start..boundary.end()].trim());
            start = boundary.end();
        }
        sentences.push(line[start..].trim());
    }
    sentences.retain(|sentence| !sentence.is_empty());
    sentences
}

fn is_abbreviation(head: &str, rest: &str) -> bool {
    let word = head
        .rsplit(char::is_whitespace)
        .next()
        .unwrap_or_default()
        .trim_start_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase();
    if ALWAYS_JOINED.contains(&word.as_str()) {
        return true;
    }
    ABBREVIATIONS.contains(&word.as_str())
        && rest
            .chars()
            .next()
            .is_some_and(|c| c.is_lowercase() || c.is_numeric())
}

/// Break a sentence into words, numbers and punctuation, splitting contractions.
pub fn tokenize(sentence: &str) -> Vec<String> {
    TOKEN
        .find_iter(sentence)
        .flat_map(|m| split_contraction(m.as_str()))
        .collect()
}

fn split_contraction(token: &str) -> Vec<String> {
    if let Some(stem) = token.strip_suffix("n't") {
        let base = match stem {
            "ca" => "can",
            "wo" => "will",
            "sha" => "shall",
            other => other,
        };
        return [base, "not"]
            .into_iter()
            .filter(|part| !part.is_empty())
            .map(str::to_string)
            .collect();
    }
    match token.split_once('\'') {
        Some((base, suffix)) if !base.is_empty() && !suffix.is_empty() => {
            vec![base.to_string(), format!("'{suffix}")]
        }
        _ => vec![token.to_string()],
    }
}

static IRREGULAR: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    [
        ("is", "be"),
        ("are", "be"),
        ("was", "be"),
        ("were", "be"),
        ("been", "be"),
        ("being", "be"),
        ("am", "be"),
        ("'s", "'s"),
        ("'re", "be"),
        ("'m", "be"),
        ("'ve", "have"),
        ("'ll", "will"),
        ("'d", "would"),
        ("has", "have"),
        ("had", "have"),
        ("having", "have"),
        ("does", "do"),
        ("did", "do"),
        ("done", "do"),
        ("doing", "do"),
        ("went", "go"),
        ("gone", "go"),
        ("goes", "go"),
        ("got", "get"),
        ("gotten", "get"),
        ("made", "make"),
        ("making", "make"),
        ("took", "take"),
        ("taken", "take"),
        ("taking", "take"),
        ("came", "come"),
        ("coming", "come"),
        ("gave", "give"),
        ("given", "give"),
        ("giving", "give"),
        ("saw", "see"),
        ("seen", "see"),
        ("found", "find"),
        ("built", "build"),
        ("held", "hold"),
        ("laid", "lay"),
        ("brought", "bring"),
        ("bought", "buy"),
        ("sent", "send"),
        ("paid", "pay"),
        ("began", "begin"),
        ("begun", "begin"),
        ("broke", "break"),
        ("broken", "break"),
        ("fell", "fall"),
        ("fallen", "fall"),
        ("ran", "run"),
        ("said", "say"),
        ("told", "tell"),
        ("kept", "keep"),
        ("met", "meet"),
        ("stood", "stand"),
        ("lost", "lose"),
        ("felt", "feel"),
        ("hung", "hang"),
        ("dug", "dig"),
        ("spent", "spend"),
        ("stuck", "stick"),
        ("struck", "strike"),
        ("torn", "tear"),
        ("worn", "wear"),
        ("wrote", "write"),
        ("written", "write"),
        ("used", "use"),
        ("using", "use"),
        ("tied", "tie"),
        ("tying", "tie"),
        ("died", "die"),
        ("dying", "die"),
        ("opened", "open"),
        ("men", "man"),
        ("women", "woman"),
        ("children", "child"),
        ("feet", "foot"),
        ("teeth", "tooth"),
    ]
    .into_iter()
    .collect()
});

/// Words whose surface form is already the lemma, mostly `-ing`/`-s` nouns.
static INVARIANT: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "always", "perhaps", "besides", "whereas", "various", "previous", "series", "species",
        "news", "physics", "analysis", "basis", "crisis", "this", "thus", "plus", "yes", "bus",
        "gas", "during", "building", "scaffolding", "flooring", "ceiling", "roofing", "cladding",
        "plumbing", "wiring", "thing", "something", "nothing", "anything", "everything",
        "morning", "evening", "opening", "meeting", "string", "spring", "timing", "framing",
        "housing", "railing", "siding", "paving", "decking", "lighting", "heating", "painting",
        "footing", "coating", "sheeting", "fencing", "drawing", "booking", "parking", "bedding",
        "landing", "earthworks", "works", "premises", "lens", "ongoing",
    ]
    .into_iter()
    .collect()
});

const SILENT_E_ENDINGS: &[&str] = &[
    "at", "iz", "iv", "ov", "av", "uir", "ur", "ag", "rg", "uc", "ac", "aus", "bl", "let", "dul",
    "ssu", "inu",
];

/// Map a lowercased token to its base form.
pub fn lemmatize(token: &str) -> String {
    if let Some(lemma) = IRREGULAR.get(token) {
        return (*lemma).to_string();
    }
    if token.chars().count() <= 3
        || !token.chars().all(char::is_alphabetic)
        || INVARIANT.contains(token)
    {
        return token.to_string();
    }
    strip_inflection(token).unwrap_or_else(|| token.to_string())
}

fn strip_inflection(word: &str) -> Option<String> {
    if let Some(stem) = word.strip_suffix("ies") {
        if stem.chars().count() >= 2 {
            return Some(format!("{stem}y"));
        }
    }
    for suffix in ["sses", "xes", "ches", "shes"] {
        if word.ends_with(suffix) {
            return word.strip_suffix("es").map(str::to_string);
        }
    }
    if let Some(stem) = word.strip_suffix("ing") {
        return verb_stem(stem);
    }
    if let Some(stem) = word.strip_suffix("ied") {
        if stem.chars().count() >= 2 {
            return Some(format!("{stem}y"));
        }
    }
    if word.ends_with("eed") {
        return None;
    }
    if let Some(stem) = word.strip_suffix("ed") {
        return verb_stem(stem);
    }
    if ["ss", "us", "is"].iter().any(|ending| word.ends_with(ending)) {
        return None;
    }
    word.strip_suffix('s').map(str::to_string)
}

fn verb_stem(stem: &str) -> Option<String> {
    let chars: Vec<char> = stem.chars().collect();
    let n = chars.len();
    if n < 2 || !chars.iter().any(|c| is_vowel(*c)) {
        return None;
    }
    let last = chars[n - 1];
    if n >= 3 && last == chars[n - 2] && !is_vowel(last) && !matches!(last, 'l' | 's' | 'z') {
        return Some(chars[..n - 1].iter().collect());
    }
    if needs_silent_e(stem, &chars) {
        return Some(format!("{stem}e"));
    }
    Some(stem.to_string())
}

fn needs_silent_e(stem: &str, chars: &[char]) -> bool {
    let by_ending = SILENT_E_ENDINGS.iter().any(|ending| stem.ends_with(ending))
        && !stem.ends_with("our")
        && !stem.ends_with("eat")
        && !stem.ends_with("oat");
    if by_ending {
        return true;
    }
    // short consonant-vowel-consonant stems: mak(e), stor(e), not(e)
    let n = chars.len();
    (3..=4).contains(&n)
        && !is_vowel(chars[n - 3])
        && is_vowel(chars[n - 2])
        && !is_vowel(chars[n - 1])
        && !matches!(chars[n - 1], 'w' | 'x' | 'y')
}

fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u')
}
