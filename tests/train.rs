use std::fs;

use serde_json::json;
use site_report_nlp::nlp::{
    train::{build_training_set, fit, load_examples, train, TrainingExample},
    Label, ModelArtifacts, SegmenterKind,
};

fn corpus() -> serde_json::Value {
    json!([
        {"text": "Delivery of bricks delayed by two weeks.", "label": "delay"},
        {"text": "Concrete pour postponed, programme delay expected.", "label": "Delay "},
        {"text": "Access to the roof is unsafe.", "label": "risk"},
        {"text": "Scaffolding is not tied properly and is dangerous.", "label": "risk"},
        {"text": "Out of cement, supplier shortage.", "label": "material_shortage"},
        {"text": "Timber stock ran out, waiting for material.", "label": "material_shortage"},
        {"text": "Walls are ready for render.", "label": "none"},
        {"text": "Windows are installed."},
        {"text": "Site was tidy.", "label": "housekeeping"}
    ])
}

fn examples() -> Vec<TrainingExample> {
    serde_json::from_value(corpus()).unwrap()
}

#[test]
fn labels_are_normalised_and_unknown_ones_skipped() {
    let set = build_training_set(&examples(), SegmenterKind::Linguistic);
    assert_eq!(set.documents.len(), 8);
    assert_eq!(set.labels.len(), 8);
    assert_eq!(set.labels[1], Label::Delay);
    assert_eq!(set.labels[7], Label::None);
    assert!(set.documents[2].contains("unsafe"));
}

#[test]
fn fit_produces_consistent_artifacts() {
    let set = build_training_set(&examples(), SegmenterKind::Linguistic);
    let (artifacts, report) = fit(&set).unwrap();
    assert_eq!(report.samples, 8);
    assert_eq!(report.label_counts[&Label::Risk], 2);
    assert!((0.0..=1.0).contains(&report.accuracy));
    assert_eq!(artifacts.classifier().classes, Label::ALL.to_vec());
    assert!(artifacts.vectorizer().vocabulary.contains_key("be unsafe"));
    assert!(artifacts
        .classifier()
        .coef
        .iter()
        .all(|row| row.len() == artifacts.vectorizer().n_features()));
}

#[test]
fn single_label_corpus_is_rejected() {
    let examples: Vec<TrainingExample> =
        serde_json::from_value(json!([{"text": "Roof is up.", "label": "none"}])).unwrap();
    let set = build_training_set(&examples, SegmenterKind::Linguistic);
    assert!(fit(&set).is_err());
}

#[test]
fn train_writes_loadable_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("training_data.json");
    fs::write(&data, corpus().to_string()).unwrap();
    let model_dir = dir.path().join("model");

    let report = train(&data, &model_dir, SegmenterKind::Linguistic).unwrap();
    assert_eq!(report.samples, 8);
    let loaded = ModelArtifacts::load(&model_dir).unwrap();
    assert_eq!(loaded.classifier().classes.len(), 4);
}

#[test]
fn missing_or_empty_training_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    assert!(load_examples(&dir.path().join("absent.json")).is_err());
    let empty = dir.path().join("empty.json");
    fs::write(&empty, "[]").unwrap();
    assert!(load_examples(&empty).is_err());
}
