//! Span classification with the pretrained model bundle.

mod bundle;
mod encoder;
mod label;
mod model;

pub use bundle::{
    ModelBundle, CASE_ENCODER_FILE, LABEL_DECODER_FILE, MODEL_FILE, SCALER_FILE,
};
pub use encoder::{CaseEncoder, LabelDecoder, NumericScaler};
pub use label::SpanLabel;
pub use model::{DecisionTree, ModelInput, SpanModel, TreeEnsemble};

use serde::Serialize;

use crate::error::{Error, Result};
use crate::extract::TextSpan;
use crate::features::{self, FeatureVector};

/// A span together with its predicted structural role.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedSpan {
    #[serde(flatten)]
    pub span: TextSpan,
    pub label: SpanLabel,
}

impl ClassifiedSpan {
    pub fn new(span: TextSpan, label: SpanLabel) -> Self {
        Self { span, label }
    }
}

/// Label every span of one document.
pub fn classify(spans: Vec<TextSpan>, bundle: &ModelBundle) -> Result<Vec<ClassifiedSpan>> {
    if spans.is_empty() {
        return Ok(Vec::new());
    }

    let matrix = features::encode(&spans);
    let rows = matrix
        .rows
        .iter()
        .map(|fv| model_input(fv, bundle))
        .collect::<Result<Vec<_>>>()?;

    let classes = bundle.model().predict(&rows)?;
    if classes.len() != spans.len() {
        return Err(Error::ModelArtifact(format!(
            "classifier returned {} predictions for {} spans",
            classes.len(),
            spans.len()
        )));
    }

    let decoder = bundle.label_decoder();
    spans
        .into_iter()
        .zip(classes)
        .map(|(span, class)| Ok(ClassifiedSpan::new(span, decoder.inverse_transform(class)?)))
        .collect()
}

/// Scale and encode one feature vector into model column order.
pub fn model_input(fv: &FeatureVector, bundle: &ModelBundle) -> Result<ModelInput> {
    let (size, text_len) = bundle.scaler().transform(fv.size, fv.text_len as f64);
    let text_case = bundle.case_encoder().transform(fv.text_case.as_str())?;
    Ok([
        size,
        flag(fv.bold),
        flag(fv.italic),
        text_len,
        flag(fv.num_prefix),
        flag(fv.is_larger_than_common_font),
        text_case as f64,
        flag(fv.is_bulleted),
    ])
}

fn flag(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Predicts "H1" for bold rows and "P" otherwise.
    struct BoldIsHeading;

    impl SpanModel for BoldIsHeading {
        fn predict(&self, rows: &[ModelInput]) -> Result<Vec<usize>> {
            Ok(rows.iter().map(|r| if r[1] > 0.5 { 0 } else { 1 }).collect())
        }

        fn n_classes(&self) -> usize {
            2
        }
    }

    fn bundle(cases: &[&str]) -> ModelBundle {
        ModelBundle::new(
            CaseEncoder::new(cases.iter().copied()),
            LabelDecoder::new(["H1", "P"]).unwrap(),
            NumericScaler::new([10.0, 20.0], [2.0, 10.0]),
            Box::new(BoldIsHeading),
        )
        .unwrap()
    }

    fn span(text: &str, font: &str) -> TextSpan {
        TextSpan::from_raw(text, Some(12.0), Some(font.into()), 1).unwrap()
    }

    #[test]
    fn test_classify_labels_each_span() {
        let bundle = bundle(&["lower", "mixed", "sentence", "upper"]);
        let spans = vec![
            span("Overview", "Arial-Bold"),
            span("Some text.", "Arial"),
        ];
        let labeled = classify(spans, &bundle).unwrap();
        assert_eq!(labeled[0].label, SpanLabel::Heading(1));
        assert_eq!(labeled[1].label, SpanLabel::Paragraph);
        assert_eq!(labeled[1].span.text, "Some text.");
    }

    #[test]
    fn test_classify_empty_input() {
        let bundle = bundle(&["lower", "mixed", "sentence", "upper"]);
        assert!(classify(Vec::new(), &bundle).unwrap().is_empty());
    }

    #[test]
    fn test_unseen_case_is_fatal() {
        let bundle = bundle(&["lower", "upper"]);
        let err = classify(vec![span("Sentence case", "Arial")], &bundle).unwrap_err();
        assert!(matches!(err, Error::UnseenCategory(ref c) if c == "sentence"));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_model_input_scales_numeric_columns() {
        let bundle = bundle(&["lower", "mixed", "sentence", "upper"]);
        let fv = features::encode(&[span("ABC", "Arial-Bold")]).rows.remove(0);
        let row = model_input(&fv, &bundle).unwrap();
        assert!((row[0] - 1.0).abs() < 1e-12);
        assert!((row[3] - (3.0 - 20.0) / 10.0).abs() < 1e-12);
        assert_eq!(row[1], 1.0);
        assert_eq!(row[6], 3.0);
    }

    #[test]
    fn test_bundle_rejects_class_mismatch() {
        let err = ModelBundle::new(
            CaseEncoder::new(["lower"]),
            LabelDecoder::new(["H1", "H2", "P"]).unwrap(),
            NumericScaler::new([0.0, 0.0], [1.0, 1.0]),
            Box::new(BoldIsHeading),
        )
        .unwrap_err();
        assert!(matches!(err, Error::ModelArtifact(_)));
    }
}
