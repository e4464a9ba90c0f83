//! Tests for loading classifier artifacts from disk.

use std::fs;
use std::path::Path;

use sectionrank::classify::{CASE_ENCODER_FILE, LABEL_DECODER_FILE, MODEL_FILE, SCALER_FILE};
use sectionrank::{classify, Error, ModelBundle, SpanLabel, TextSpan};

const CASES: &str = r#"{"classes": ["lower", "mixed", "sentence", "upper"]}"#;
const LABELS: &str = r#"{"classes": ["H1", "H2", "O", "P", "Title"]}"#;
const SCALER: &str = r#"{"mean": [11.5, 42.0], "scale": [2.5, 30.0]}"#;

/// Two trees voting on bold text and enumerators.
const MODEL: &str = r#"{
    "n_classes": 5,
    "trees": [
        {
            "children_left": [1, -1, 3, -1, -1],
            "children_right": [2, -1, 4, -1, -1],
            "feature": [1, -2, 4, -2, -2],
            "threshold": [0.5, -2.0, 0.5, -2.0, -2.0],
            "value": [
                [4.0, 4.0, 1.0, 9.0, 1.0],
                [0.0, 0.0, 1.0, 9.0, 0.0],
                [4.0, 4.0, 0.0, 0.0, 1.0],
                [8.0, 0.0, 0.0, 0.0, 1.0],
                [0.0, 8.0, 0.0, 0.0, 0.0]
            ]
        },
        {
            "children_left": [1, -1, -1],
            "children_right": [2, -1, -1],
            "feature": [1, -2, -2],
            "threshold": [0.5, -2.0, -2.0],
            "value": [
                [1.0, 1.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 1.0, 0.0],
                [1.0, 1.0, 0.0, 0.0, 0.0]
            ]
        }
    ]
}"#;

fn write_artifacts(dir: &Path, labels: &str, model: &str) {
    fs::write(dir.join(CASE_ENCODER_FILE), CASES).unwrap();
    fs::write(dir.join(LABEL_DECODER_FILE), labels).unwrap();
    fs::write(dir.join(SCALER_FILE), SCALER).unwrap();
    fs::write(dir.join(MODEL_FILE), model).unwrap();
}

fn span(text: &str, font: &str, size: f32) -> TextSpan {
    TextSpan::from_raw(text, Some(size), Some(font.to_string()), 1).unwrap()
}

#[test]
fn test_load_and_classify() {
    let dir = tempfile::tempdir().unwrap();
    write_artifacts(dir.path(), LABELS, MODEL);

    let bundle = ModelBundle::load(dir.path()).unwrap();
    assert_eq!(bundle.model().n_classes(), 5);
    assert_eq!(bundle.label_decoder().len(), 5);

    let spans = vec![
        span("Overview", "Arial-Bold", 16.0),
        span("This report covers the year.", "Arial", 11.0),
        span("1. Background", "Arial-Bold", 13.0),
    ];
    let labels: Vec<_> = classify(spans, &bundle)
        .unwrap()
        .into_iter()
        .map(|s| s.label)
        .collect();
    assert_eq!(
        labels,
        [SpanLabel::Heading(1), SpanLabel::Paragraph, SpanLabel::Heading(2)]
    );
}

#[test]
fn test_missing_artifact() {
    let dir = tempfile::tempdir().unwrap();
    write_artifacts(dir.path(), LABELS, MODEL);
    fs::remove_file(dir.path().join(SCALER_FILE)).unwrap();

    let err = ModelBundle::load(dir.path()).unwrap_err();
    assert!(matches!(err, Error::ModelArtifact(ref msg) if msg.contains(SCALER_FILE)));
    assert!(err.is_fatal());
}

#[test]
fn test_unknown_label_fails_at_load() {
    let dir = tempfile::tempdir().unwrap();
    write_artifacts(
        dir.path(),
        r#"{"classes": ["H1", "H2", "O", "P", "Caption"]}"#,
        MODEL,
    );

    let err = ModelBundle::load(dir.path()).unwrap_err();
    assert!(matches!(err, Error::UnexpectedLabel(ref label) if label == "Caption"));
}

#[test]
fn test_class_count_mismatch() {
    let dir = tempfile::tempdir().unwrap();
    write_artifacts(dir.path(), r#"{"classes": ["H1", "H2", "O", "P"]}"#, MODEL);

    let err = ModelBundle::load(dir.path()).unwrap_err();
    assert!(matches!(err, Error::ModelArtifact(_)));
}

#[test]
fn test_malformed_model() {
    let dir = tempfile::tempdir().unwrap();
    write_artifacts(dir.path(), LABELS, r#"{"n_classes": 5, "trees": "oak"}"#);
    assert!(matches!(
        ModelBundle::load(dir.path()),
        Err(Error::ModelArtifact(_))
    ));

    // A node pointing back at its parent would never reach a leaf.
    let cyclic = MODEL.replacen("[1, -1, 3, -1, -1]", "[1, -1, 0, -1, -1]", 1);
    write_artifacts(dir.path(), LABELS, &cyclic);
    assert!(matches!(
        ModelBundle::load(dir.path()),
        Err(Error::ModelArtifact(_))
    ));
}
