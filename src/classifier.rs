use crate::config::LoadOptions;
use crate::error::{Error, Result};
use crate::model::{self, Config, SequenceClassifier, NUM_LABELS};
use candle_core::{DType, Tensor, D};
use candle_nn::VarBuilder;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::fs::File;
use std::path::{Path, PathBuf};
use tokenizers::{Tokenizer, TruncationParams};

/// Class order produced by the sentiment head.
const LABEL_ORDER: [&str; NUM_LABELS] = ["negative", "neutral", "positive"];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Negative,
    Neutral,
    Positive,
    Unknown,
}

impl Label {
    pub fn from_index(index: usize) -> Self {
        match index {
            0 => Self::Negative,
            1 => Self::Neutral,
            2 => Self::Positive,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Negative => "negative",
            Self::Neutral => "neutral",
            Self::Positive => "positive",
            Self::Unknown => "unknown",
        }
    }
}

impl Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Label of the highest score. Ties go to the lowest index; an empty
/// vector yields `Unknown`.
pub fn allot(scores: &[f32]) -> Label {
    scores
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f32)>, (i, &score)| match best {
            Some((_, top)) if top >= score => best,
            _ => Some((i, score)),
        })
        .map_or(Label::Unknown, |(i, _)| Label::from_index(i))
}

/// Softmax over the last dimension of `logits`, returned as a flat vector.
pub fn softmax(logits: &Tensor) -> Result<Vec<f32>> {
    let probs = candle_nn::ops::softmax(&logits.to_dtype(DType::F32)?, D::Minus1)?;
    Ok(probs.flatten_all()?.to_vec1()?)
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    #[serde(rename = "result")]
    pub label: Label,
    pub scores: Vec<f32>,
}

/// Tokenizer and classifier loaded once and shared read-only by every prediction.
pub struct ModelHandle {
    tokenizer: Tokenizer,
    model: Box<dyn SequenceClassifier>,
}

impl ModelHandle {
    /// Loads `tokenizer/tokenizer.json`, `config.json` and `model.safetensors`
    /// from `path`.
    pub fn load<P: AsRef<Path>>(path: P, options: &LoadOptions) -> Result<Self> {
        let root = path.as_ref();
        tracing::info!(path = %root.display(), "loading model");
        let mut dir = PathBuf::from(root);

        dir.push("tokenizer");
        dir.push("tokenizer.json");
        tracing::debug!(file = %dir.display(), "reading tokenizer");
        let tokenizer = Tokenizer::from_file(&dir).map_err(|e| Error::load(&dir, e))?;
        dir.pop();
        dir.pop();

        dir.push("config.json");
        tracing::debug!(file = %dir.display(), "reading model config");
        let config_reader = File::open(&dir).map_err(|e| Error::load(&dir, e))?;
        let config = Config::from_reader(config_reader).map_err(|e| Error::load(&dir, e))?;
        tracing::debug!(architecture = config.architecture.name(), "model config parsed");
        dir.pop();

        let num_labels = config.classifier_config.num_labels();
        if num_labels != NUM_LABELS {
            return Err(Error::load(
                root,
                format!("expected {NUM_LABELS} labels, model declares {num_labels}"),
            ));
        }
        if let Some(labels) = config.classifier_config.ordered_labels() {
            let matches = labels
                .iter()
                .zip(LABEL_ORDER)
                .enumerate()
                .all(|(i, (label, expected))| {
                    label.eq_ignore_ascii_case(expected) || *label == format!("LABEL_{i}")
                });
            if !matches {
                tracing::warn!(
                    ?labels,
                    "model labels differ from negative/neutral/positive; index order is used as-is"
                );
            }
        }

        dir.push("model.safetensors");
        tracing::debug!(file = %dir.display(), "mapping weights");
        if !dir.is_file() {
            return Err(Error::load(&dir, "weights file not found"));
        }
        let model_builder = unsafe {
            VarBuilder::from_mmaped_safetensors(&[&dir], DType::F32, &options.device)
        }
        .map_err(|e| Error::load(&dir, e))?;
        dir.pop();

        let model =
            model::load_classifier(model_builder, &config).map_err(|e| Error::load(root, e))?;

        let handle = Self::new(tokenizer, model, options.max_length)
            .map_err(|e| Error::load(root, e))?;
        tracing::info!(
            path = %root.display(),
            max_length = options.max_length,
            "model loaded"
        );
        Ok(handle)
    }

    /// Wraps an already built tokenizer and model. Truncation is forced to
    /// `max_length` tokens; padding is left as the tokenizer declares it.
    pub fn new(
        mut tokenizer: Tokenizer,
        model: Box<dyn SequenceClassifier>,
        max_length: usize,
    ) -> Result<Self> {
        tokenizer.with_truncation(Some(TruncationParams {
            max_length,
            ..Default::default()
        }))?;
        Ok(Self { tokenizer, model })
    }

    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    /// Tokenizes `text`, runs one forward pass and picks the most probable label.
    pub fn predict(&self, text: &str) -> Result<PredictionResult> {
        let encoding = self.tokenizer.encode(text, true)?;
        tracing::trace!(tokens = encoding.len(), "encoded input");

        let logits = self.model.forward(&encoding)?;
        let scores = softmax(&logits)?;
        if scores.len() != NUM_LABELS {
            return Err(Error::inference(format!(
                "expected {NUM_LABELS} logits, model returned {}",
                scores.len()
            )));
        }
        let label = allot(&scores);
        tracing::debug!(%label, ?scores, "prediction");

        Ok(PredictionResult { label, scores })
    }
}

/// Free-function form of [`ModelHandle::predict`].
pub fn predict(text: &str, handle: &ModelHandle) -> Result<PredictionResult> {
    handle.predict(text)
}
