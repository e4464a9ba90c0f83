//! Fitted preprocessing artifacts: categorical encoders and the numeric scaler.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

use super::label::SpanLabel;

/// Maps `text_case` categories to the integer codes the model was trained on.
///
/// Codes are positions in the fitted `classes` list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseEncoder {
    pub classes: Vec<String>,
}

impl CaseEncoder {
    pub fn new<I, S>(classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            classes: classes.into_iter().map(Into::into).collect(),
        }
    }

    /// Encode a category; values outside the fitted vocabulary are an error.
    pub fn transform(&self, category: &str) -> Result<usize> {
        self.classes
            .iter()
            .position(|c| c == category)
            .ok_or_else(|| Error::UnseenCategory(category.to_string()))
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.classes.is_empty() {
            return Err(Error::ModelArtifact("case encoder has no classes".into()));
        }
        Ok(())
    }
}

/// Maps model class indices back to span labels.
///
/// Every class is parsed into a [`SpanLabel`] when the decoder is built, so
/// a malformed label fails at load time instead of mid-document.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelDecoder {
    classes: Vec<String>,
    labels: Vec<SpanLabel>,
}

#[derive(Deserialize)]
struct LabelDecoderFile {
    classes: Vec<String>,
}

impl LabelDecoder {
    /// Build a decoder, validating every class name.
    pub fn new<I, S>(classes: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let classes: Vec<String> = classes.into_iter().map(Into::into).collect();
        if classes.is_empty() {
            return Err(Error::ModelArtifact("label decoder has no classes".into()));
        }
        let labels = classes
            .iter()
            .map(|c| c.parse::<SpanLabel>())
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { classes, labels })
    }

    /// Parse the JSON artifact form `{"classes": [...]}`.
    pub fn from_json(json: &str) -> Result<Self> {
        let file: LabelDecoderFile = serde_json::from_str(json)
            .map_err(|e| Error::ModelArtifact(format!("label decoder: {}", e)))?;
        Self::new(file.classes)
    }

    /// Decode a predicted class index.
    pub fn inverse_transform(&self, class_index: usize) -> Result<SpanLabel> {
        self.labels.get(class_index).copied().ok_or_else(|| {
            Error::ModelArtifact(format!(
                "class index {} outside label decoder ({} classes)",
                class_index,
                self.labels.len()
            ))
        })
    }

    /// Raw class names in fitted order.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Standardization of the `size` and `text_len` columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericScaler {
    /// Column means, `[size, text_len]`
    pub mean: [f64; 2],
    /// Column scales, `[size, text_len]`
    pub scale: [f64; 2],
}

impl NumericScaler {
    pub fn new(mean: [f64; 2], scale: [f64; 2]) -> Self {
        Self { mean, scale }
    }

    /// Scale `(size, text_len)`. A zero scale leaves the centered value as is.
    pub fn transform(&self, size: f64, text_len: f64) -> (f64, f64) {
        let apply = |x: f64, i: usize| {
            let scale = if self.scale[i] == 0.0 { 1.0 } else { self.scale[i] };
            (x - self.mean[i]) / scale
        };
        (apply(size, 0), apply(text_len, 1))
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.mean.iter().chain(&self.scale).any(|v| !v.is_finite()) {
            return Err(Error::ModelArtifact(
                "scaler contains non-finite values".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_encoder() {
        let encoder = CaseEncoder::new(["lower", "mixed", "sentence", "upper"]);
        assert_eq!(encoder.transform("lower").unwrap(), 0);
        assert_eq!(encoder.transform("upper").unwrap(), 3);
        assert!(matches!(
            encoder.transform("title"),
            Err(Error::UnseenCategory(ref c)) if c == "title"
        ));
    }

    #[test]
    fn test_label_decoder() {
        let decoder = LabelDecoder::new(["H1", "H2", "O", "P"]).unwrap();
        assert_eq!(decoder.inverse_transform(1).unwrap(), SpanLabel::Heading(2));
        assert_eq!(decoder.inverse_transform(3).unwrap(), SpanLabel::Paragraph);
        assert!(matches!(
            decoder.inverse_transform(4),
            Err(Error::ModelArtifact(_))
        ));
    }

    #[test]
    fn test_label_decoder_fails_fast_on_bad_class() {
        assert!(matches!(
            LabelDecoder::new(["H1", "Footer"]),
            Err(Error::UnexpectedLabel(ref l)) if l == "Footer"
        ));
        assert!(LabelDecoder::from_json(r#"{"classes": []}"#).is_err());
        let decoder = LabelDecoder::from_json(r#"{"classes": ["H1", "P"]}"#).unwrap();
        assert_eq!(decoder.len(), 2);
    }

    #[test]
    fn test_numeric_scaler() {
        let scaler = NumericScaler::new([10.0, 40.0], [2.0, 0.0]);
        let (size, len) = scaler.transform(14.0, 45.0);
        assert!((size - 2.0).abs() < 1e-12);
        assert!((len - 5.0).abs() < 1e-12);
        assert!(NumericScaler::new([f64::NAN, 0.0], [1.0, 1.0])
            .validate()
            .is_err());
    }
}
