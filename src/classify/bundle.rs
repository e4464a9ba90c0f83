//! Loading the pretrained artifacts as one read-only bundle.

use std::fmt;
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

use super::encoder::{CaseEncoder, LabelDecoder, NumericScaler};
use super::model::{SpanModel, TreeEnsemble};

/// Case encoder artifact file name.
pub const CASE_ENCODER_FILE: &str = "le_case.json";
/// Label decoder artifact file name.
pub const LABEL_DECODER_FILE: &str = "le_label.json";
/// Numeric scaler artifact file name.
pub const SCALER_FILE: &str = "scaler.json";
/// Classifier artifact file name.
pub const MODEL_FILE: &str = "model.json";

/// Everything needed to label spans, shared read-only across documents.
pub struct ModelBundle {
    case_encoder: CaseEncoder,
    label_decoder: LabelDecoder,
    scaler: NumericScaler,
    model: Box<dyn SpanModel>,
}

impl ModelBundle {
    /// Assemble a bundle from parts, checking they agree with each other.
    pub fn new(
        case_encoder: CaseEncoder,
        label_decoder: LabelDecoder,
        scaler: NumericScaler,
        model: Box<dyn SpanModel>,
    ) -> Result<Self> {
        case_encoder.validate()?;
        scaler.validate()?;
        if model.n_classes() != label_decoder.len() {
            return Err(Error::ModelArtifact(format!(
                "classifier emits {} classes but label decoder knows {}",
                model.n_classes(),
                label_decoder.len()
            )));
        }
        Ok(Self {
            case_encoder,
            label_decoder,
            scaler,
            model,
        })
    }

    /// Load all four artifacts from a directory.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        log::info!("Loading model artifacts from {}", dir.display());

        let case_encoder: CaseEncoder = serde_json::from_str(&read_artifact(dir, CASE_ENCODER_FILE)?)
            .map_err(|e| Error::ModelArtifact(format!("{}: {}", CASE_ENCODER_FILE, e)))?;
        let label_decoder = LabelDecoder::from_json(&read_artifact(dir, LABEL_DECODER_FILE)?)?;
        let scaler: NumericScaler = serde_json::from_str(&read_artifact(dir, SCALER_FILE)?)
            .map_err(|e| Error::ModelArtifact(format!("{}: {}", SCALER_FILE, e)))?;
        let model = TreeEnsemble::from_json(&read_artifact(dir, MODEL_FILE)?)?;

        log::debug!(
            "Classifier: {} trees, labels {:?}",
            model.trees.len(),
            label_decoder.classes()
        );
        Self::new(case_encoder, label_decoder, scaler, Box::new(model))
    }

    pub fn case_encoder(&self) -> &CaseEncoder {
        &self.case_encoder
    }

    pub fn label_decoder(&self) -> &LabelDecoder {
        &self.label_decoder
    }

    pub fn scaler(&self) -> &NumericScaler {
        &self.scaler
    }

    pub fn model(&self) -> &dyn SpanModel {
        self.model.as_ref()
    }
}

impl fmt::Debug for ModelBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelBundle")
            .field("case_encoder", &self.case_encoder)
            .field("label_decoder", &self.label_decoder)
            .field("scaler", &self.scaler)
            .field("n_classes", &self.model.n_classes())
            .finish()
    }
}

fn read_artifact(dir: &Path, name: &str) -> Result<String> {
    let path = dir.join(name);
    fs::read_to_string(&path)
        .map_err(|e| Error::ModelArtifact(format!("cannot read {}: {}", path.display(), e)))
}
