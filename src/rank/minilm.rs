//! all-MiniLM-L6-v2 sentence embeddings via candle.
//!
//! Produces 384-dimensional, mean-pooled, L2-normalized vectors. The model
//! is read from a local directory holding `config.json`, `tokenizer.json`
//! and `model.safetensors`, or fetched from the Hugging Face hub.

use std::path::{Path, PathBuf};

use candle_core::{Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config, DTYPE};
use hf_hub::{api::sync::Api, Repo, RepoType};
use tokenizers::{PaddingParams, PaddingStrategy, Tokenizer, TruncationParams};

use crate::error::{Error, Result};

use super::embed::Embedder;

/// Hub identifier of the default embedding model.
pub const DEFAULT_MODEL_ID: &str = "sentence-transformers/all-MiniLM-L6-v2";

/// Sequence length the sentence-transformers export was configured with.
const MAX_SEQ_LEN: usize = 256;

const CONFIG_FILE: &str = "config.json";
const TOKENIZER_FILE: &str = "tokenizer.json";
const WEIGHTS_FILE: &str = "model.safetensors";

/// BERT-family sentence embedder on the CPU.
pub struct MiniLmEmbedder {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
}

impl MiniLmEmbedder {
    /// Load from a local model directory.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        log::info!("Loading embedding model from {}", dir.display());
        Self::from_files(
            &dir.join(CONFIG_FILE),
            &dir.join(TOKENIZER_FILE),
            &dir.join(WEIGHTS_FILE),
        )
    }

    /// Download (or reuse the cached copy of) a model from the hub.
    pub fn from_hub(model_id: &str) -> Result<Self> {
        log::info!("Fetching embedding model {} from the hub", model_id);
        let api = Api::new()?;
        let repo = api.repo(Repo::new(model_id.to_string(), RepoType::Model));

        let config_path = repo.get(CONFIG_FILE)?;
        let tokenizer_path = repo.get(TOKENIZER_FILE)?;
        let weights_path = repo.get(WEIGHTS_FILE)?;
        Self::from_files(&config_path, &tokenizer_path, &weights_path)
    }

    /// Load from a directory if `location` names one, else from the hub.
    pub fn open(location: &str) -> Result<Self> {
        let path = PathBuf::from(location);
        if path.is_dir() {
            Self::from_dir(path)
        } else {
            Self::from_hub(location)
        }
    }

    fn from_files(config_path: &Path, tokenizer_path: &Path, weights_path: &Path) -> Result<Self> {
        let device = Device::Cpu;

        let config_str = std::fs::read_to_string(config_path).map_err(|e| {
            Error::Embedding(format!("cannot read {}: {}", config_path.display(), e))
        })?;
        let config: Config = serde_json::from_str(&config_str)
            .map_err(|e| Error::Embedding(format!("invalid model config: {}", e)))?;

        let mut tokenizer = Tokenizer::from_file(tokenizer_path)?;
        tokenizer.with_padding(Some(PaddingParams {
            strategy: PaddingStrategy::BatchLongest,
            ..Default::default()
        }));
        tokenizer.with_truncation(Some(TruncationParams {
            max_length: MAX_SEQ_LEN,
            ..Default::default()
        }))?;

        let vb = unsafe { VarBuilder::from_mmaped_safetensors(&[weights_path], DTYPE, &device)? };
        let model = BertModel::load(vb, &config)?;
        log::debug!(
            "Embedding model ready: {} layers, hidden size {}",
            config.num_hidden_layers,
            config.hidden_size
        );

        Ok(Self {
            model,
            tokenizer,
            device,
        })
    }

    fn forward(&self, texts: &[&str]) -> Result<Tensor> {
        let encodings = self.tokenizer.encode_batch(texts.to_vec(), true)?;
        let batch_size = encodings.len();
        let seq_len = encodings.first().map(|e| e.get_ids().len()).unwrap_or(0);

        let mut ids = Vec::with_capacity(batch_size * seq_len);
        let mut mask = Vec::with_capacity(batch_size * seq_len);
        let mut type_ids = Vec::with_capacity(batch_size * seq_len);
        for encoding in &encodings {
            ids.extend(encoding.get_ids().iter().map(|&x| x as i64));
            mask.extend(encoding.get_attention_mask().iter().map(|&x| x as i64));
            type_ids.extend(encoding.get_type_ids().iter().map(|&x| x as i64));
        }

        let input_ids = Tensor::from_vec(ids, (batch_size, seq_len), &self.device)?;
        let attention_mask = Tensor::from_vec(mask, (batch_size, seq_len), &self.device)?;
        let token_type_ids = Tensor::from_vec(type_ids, (batch_size, seq_len), &self.device)?;

        let hidden = self
            .model
            .forward(&input_ids, &token_type_ids, Some(&attention_mask))?;

        // Mean over real tokens only.
        let mask = attention_mask
            .unsqueeze(2)?
            .to_dtype(DTYPE)?
            .broadcast_as(hidden.shape())?;
        let summed = hidden.mul(&mask)?.sum(1)?;
        let counts = mask.sum(1)?.clamp(1e-9, f64::MAX)?;
        let pooled = summed.div(&counts)?;

        let norm = pooled
            .sqr()?
            .sum_keepdim(1)?
            .sqrt()?
            .clamp(1e-12, f64::MAX)?;
        Ok(pooled.broadcast_div(&norm)?)
    }
}

impl Embedder for MiniLmEmbedder {
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let embeddings = self.forward(texts)?.to_vec2::<f32>()?;
        log::debug!("Embedded {} texts", embeddings.len());
        Ok(embeddings)
    }
}
