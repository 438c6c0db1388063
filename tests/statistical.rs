mod common;

use std::{fs, sync::Arc, thread};

use site_report_nlp::{
    error::ClassifierError,
    nlp::{
        linear::LinearClassifier,
        statistical::{CLASSIFIER_FILE, VECTORIZER_FILE},
        tfidf::TfidfVectorizer,
        Label, ModelArtifacts, ModelStore,
    },
};

fn tokens(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

#[test]
fn missing_artifacts_report_model_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let store = ModelStore::new(dir.path());
    let err = store.classify(&tokens(&["roof"])).unwrap_err();
    assert!(matches!(err, ClassifierError::ModelNotFound { .. }));
    assert!(err.is_model_unavailable());
    assert!(!store.is_available());
    assert!(!store.is_loaded());
}

#[test]
fn load_retries_until_artifacts_appear_then_caches() {
    let dir = tempfile::tempdir().unwrap();
    let store = ModelStore::new(dir.path());
    assert!(!store.is_available());

    common::test_artifacts().save(dir.path()).unwrap();
    let result = store.classify(&tokens(&["access", "be", "unsafe", "."])).unwrap();
    assert_eq!(result.label, Label::Risk);
    assert!((result.confidence - 0.8).abs() < 1e-9);
    assert!(store.is_loaded());

    fs::remove_file(dir.path().join(VECTORIZER_FILE)).unwrap();
    fs::remove_file(dir.path().join(CLASSIFIER_FILE)).unwrap();
    assert!(store.classify(&tokens(&["unsafe"])).is_ok());
}

#[test]
fn concurrent_first_access_shares_one_model() {
    let dir = tempfile::tempdir().unwrap();
    common::test_artifacts().save(dir.path()).unwrap();
    let store = Arc::new(ModelStore::new(dir.path()));
    assert!(!store.is_loaded());

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let store = Arc::clone(&store);
            thread::spawn(move || store.get().unwrap())
        })
        .collect();
    let models: Vec<Arc<ModelArtifacts>> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert!(store.is_loaded());
    let cached = store.get().unwrap();
    assert!(models.iter().all(|model| Arc::ptr_eq(model, &cached)));
}

#[test]
fn saved_artifacts_load_back_identically() {
    let dir = tempfile::tempdir().unwrap();
    let artifacts = common::test_artifacts();
    artifacts.save(dir.path()).unwrap();
    assert_eq!(ModelArtifacts::load(dir.path()).unwrap(), artifacts);
}

#[test]
fn unreadable_artifact_is_reported_as_corrupt() {
    let dir = tempfile::tempdir().unwrap();
    common::test_artifacts().save(dir.path()).unwrap();
    fs::write(dir.path().join(CLASSIFIER_FILE), "{not json").unwrap();
    let err = ModelArtifacts::load(dir.path()).unwrap_err();
    assert!(matches!(err, ClassifierError::ModelCorrupt { .. }));
    assert!(err.is_model_unavailable());
}

#[test]
fn mismatched_shapes_are_rejected() {
    let vectorizer = TfidfVectorizer::from_terms([("unsafe", 1.0)], (1, 1));
    let classifier = LinearClassifier {
        classes: vec![Label::None, Label::Risk],
        coef: vec![vec![0.0, 1.0], vec![1.0, 0.0]],
        intercept: vec![0.0, 0.0],
    };
    let err = ModelArtifacts::new(vectorizer, classifier).unwrap_err();
    assert!(matches!(err, ClassifierError::ModelShape(_)));
}

#[test]
fn neutral_sentence_is_none() {
    let artifacts = common::test_artifacts();
    let result = artifacts.classify(&tokens(&["wall", "be", "ready", "."]));
    assert_eq!(result.label, Label::None);
    assert!(result.confidence < 0.5);
}

#[test]
fn empty_class_list_defaults_to_none() {
    let classifier = LinearClassifier {
        classes: Vec::new(),
        coef: Vec::new(),
        intercept: Vec::new(),
    };
    let result = classifier.predict(&vec![(0, 1.0)]);
    assert_eq!(result.label, Label::None);
    assert_eq!(result.confidence, 0.0);
}

#[test]
fn tfidf_uses_bigrams_and_l2_norm() {
    let docs = vec![
        "access be unsafe".to_string(),
        "access be open".to_string(),
        "roof be up".to_string(),
    ];
    let vectorizer = TfidfVectorizer::fit(&docs, (1, 2), 5000);
    assert!(vectorizer.vocabulary.contains_key("be unsafe"));
    assert!(vectorizer.vocabulary.contains_key("access"));
    // single-character words never become terms
    assert!(!vectorizer.vocabulary.keys().any(|term| term.len() == 1));

    let row = vectorizer.transform("access be unsafe");
    let norm: f64 = row.iter().map(|(_, v)| v * v).sum::<f64>().sqrt();
    assert!((norm - 1.0).abs() < 1e-9);

    let be = vectorizer.vocabulary["be"];
    let unsafe_col = vectorizer.vocabulary["unsafe"];
    assert!(vectorizer.idf[be] < vectorizer.idf[unsafe_col]);
    assert!(vectorizer.transform("nothing known here").is_empty());
}

#[test]
fn max_features_keeps_most_frequent_terms() {
    let docs = vec!["delay delay delay".to_string(), "delay roof".to_string()];
    let vectorizer = TfidfVectorizer::fit(&docs, (1, 1), 1);
    assert_eq!(vectorizer.n_features(), 1);
    assert!(vectorizer.vocabulary.contains_key("delay"));
}
