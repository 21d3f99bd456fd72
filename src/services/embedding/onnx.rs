//! ONNX sentence-transformer inference.

use std::path::Path;
use std::sync::Mutex;

use ndarray::{ArrayView3, Axis, Ix3};
use ort::session::{Session, builder::GraphOptimizationLevel};
use ort::value::Tensor;
use tokenizers::Tokenizer;
use tokenizers::{PaddingParams, PaddingStrategy, TruncationParams, TruncationStrategy};

use super::SentenceEncoder;
use crate::error::EmbeddingError;
use crate::models::EmbeddingConfig;

/// Feature-extraction model producing mean-pooled, L2-normalized sentence vectors.
pub struct EmbeddingModel {
    session: Mutex<Session>,
    tokenizer: Tokenizer,
    dimension: usize,
}

impl EmbeddingModel {
    pub fn load(config: &EmbeddingConfig, model_dir: &Path) -> Result<Self, EmbeddingError> {
        let model_path = model_dir.join("model.onnx");
        let tokenizer_path = model_dir.join("tokenizer.json");
        let max_tokens = config.max_tokens as usize;

        if !model_path.exists() {
            return Err(EmbeddingError::NotFound(format!(
                "model not found: {}",
                model_path.display()
            )));
        }
        if !tokenizer_path.exists() {
            return Err(EmbeddingError::NotFound(format!(
                "tokenizer not found: {}",
                tokenizer_path.display()
            )));
        }

        let session = Session::builder()
            .map_err(|e: ort::Error| EmbeddingError::LoadError(e.to_string()))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e: ort::Error| EmbeddingError::LoadError(e.to_string()))?
            .with_intra_threads(num_cpus())
            .map_err(|e: ort::Error| EmbeddingError::LoadError(e.to_string()))?
            .commit_from_file(&model_path)
            .map_err(|e: ort::Error| EmbeddingError::LoadError(e.to_string()))?;

        let mut tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| EmbeddingError::TokenizerError(e.to_string()))?;

        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: max_tokens,
                strategy: TruncationStrategy::LongestFirst,
                ..Default::default()
            }))
            .map_err(|e| EmbeddingError::TokenizerError(e.to_string()))?;

        tokenizer.with_padding(Some(PaddingParams {
            strategy: PaddingStrategy::BatchLongest,
            ..Default::default()
        }));

        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
            dimension: config.dimension as usize,
        })
    }
}

impl SentenceEncoder for EmbeddingModel {
    fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let encodings = self
            .tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(|e| EmbeddingError::TokenizerError(e.to_string()))?;

        let max_len = encodings
            .iter()
            .map(|e| e.get_ids().len())
            .max()
            .unwrap_or(0);
        let batch_size = encodings.len();

        let mut input_ids = vec![0i64; batch_size * max_len];
        let mut attention_mask = vec![0i64; batch_size * max_len];
        let mut token_type_ids = vec![0i64; batch_size * max_len];

        for (i, encoding) in encodings.iter().enumerate() {
            let ids = encoding.get_ids();
            let mask = encoding.get_attention_mask();
            let types = encoding.get_type_ids();
            for (j, ((&id, &m), &t)) in ids.iter().zip(mask.iter()).zip(types.iter()).enumerate() {
                input_ids[i * max_len + j] = i64::from(id);
                attention_mask[i * max_len + j] = i64::from(m);
                token_type_ids[i * max_len + j] = i64::from(t);
            }
        }

        let input_ids_tensor = Tensor::from_array(([batch_size, max_len], input_ids))
            .map_err(|e: ort::Error| EmbeddingError::InferenceError(e.to_string()))?;
        let attention_mask_tensor =
            Tensor::from_array(([batch_size, max_len], attention_mask.clone()))
                .map_err(|e: ort::Error| EmbeddingError::InferenceError(e.to_string()))?;
        let token_type_ids_tensor = Tensor::from_array(([batch_size, max_len], token_type_ids))
            .map_err(|e: ort::Error| EmbeddingError::InferenceError(e.to_string()))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| EmbeddingError::InferenceError("session lock poisoned".to_string()))?;

        let outputs = session
            .run(ort::inputs![
                "input_ids" => input_ids_tensor,
                "attention_mask" => attention_mask_tensor,
                "token_type_ids" => token_type_ids_tensor
            ])
            .map_err(|e: ort::Error| EmbeddingError::InferenceError(e.to_string()))?;

        let output_array = outputs[0]
            .try_extract_array::<f32>()
            .map_err(|e: ort::Error| EmbeddingError::InferenceError(e.to_string()))?;

        // Token-level output: [batch, seq_len, hidden]
        let hidden = output_array.into_dimensionality::<Ix3>().map_err(|e| {
            EmbeddingError::InferenceError(format!("unexpected output shape: {}", e))
        })?;

        let embeddings = mean_pool(hidden, &attention_mask);
        if let Some(first) = embeddings.first()
            && first.len() != self.dimension
        {
            return Err(EmbeddingError::InferenceError(format!(
                "model produced {} dimensions, expected {}",
                first.len(),
                self.dimension
            )));
        }

        Ok(embeddings)
    }
}

/// Average token embeddings weighted by the attention mask, then L2-normalize.
///
/// `attention_mask` is row-major `[batch, seq_len]`.
pub(crate) fn mean_pool(hidden: ArrayView3<'_, f32>, attention_mask: &[i64]) -> Vec<Vec<f32>> {
    let (batch_size, seq_len, dim) = hidden.dim();

    (0..batch_size)
        .map(|i| {
            let mut pooled = vec![0.0f32; dim];
            let mut weight = 0.0f32;

            for (j, token) in hidden.index_axis(Axis(0), i).outer_iter().enumerate() {
                let m = attention_mask[i * seq_len + j] as f32;
                if m == 0.0 {
                    continue;
                }
                weight += m;
                for (acc, v) in pooled.iter_mut().zip(token.iter()) {
                    *acc += v * m;
                }
            }

            let weight = weight.max(1e-9);
            for v in &mut pooled {
                *v /= weight;
            }
            normalize(&pooled)
        })
        .collect()
}

pub(crate) fn normalize(v: &[f32]) -> Vec<f32> {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        v.iter().map(|x| x / norm).collect()
    } else {
        v.to_vec()
    }
}

fn num_cpus() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}
