#![allow(dead_code)]

use candle_core::{DType, Device, Tensor};
use candle_nn::{VarBuilder, VarMap};
use sentiment_shim::model::Config;
use sentiment_shim::{load_classifier, Result, SequenceClassifier};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokenizers::{Encoding, Tokenizer};

pub const VOCAB: [&str; 8] = ["[UNK]", "i", "love", "this", "product", "hate", "it", "word"];

/// Whitespace word-level tokenizer over [`VOCAB`].
pub fn tokenizer_json() -> serde_json::Value {
    let vocab: serde_json::Map<String, serde_json::Value> = VOCAB
        .iter()
        .enumerate()
        .map(|(i, w)| (w.to_string(), serde_json::json!(i)))
        .collect();
    serde_json::json!({
        "version": "1.0",
        "truncation": null,
        "padding": null,
        "added_tokens": [],
        "normalizer": { "type": "Lowercase" },
        "pre_tokenizer": { "type": "WhitespaceSplit" },
        "post_processor": null,
        "decoder": null,
        "model": {
            "type": "WordLevel",
            "vocab": vocab,
            "unk_token": "[UNK]"
        }
    })
}

pub fn tokenizer() -> Tokenizer {
    Tokenizer::from_bytes(serde_json::to_vec(&tokenizer_json()).unwrap()).unwrap()
}

/// Returns the same logits for every input and remembers the longest sequence seen.
#[derive(Clone)]
pub struct FixedLogits {
    logits: Vec<f32>,
    pub max_seen: Arc<AtomicUsize>,
    pub calls: Arc<AtomicUsize>,
}

impl FixedLogits {
    pub fn new(logits: &[f32]) -> Self {
        Self {
            logits: logits.to_vec(),
            max_seen: Arc::new(AtomicUsize::new(0)),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl SequenceClassifier for FixedLogits {
    fn forward(&self, encoding: &Encoding) -> Result<Tensor> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.max_seen.fetch_max(encoding.len(), Ordering::SeqCst);
        Ok(Tensor::new(self.logits.as_slice(), &Device::Cpu)?)
    }
}

/// Logits whose softmax is `probs`.
pub fn logits_for(probs: &[f32]) -> Vec<f32> {
    probs.iter().map(|p| p.ln()).collect()
}

pub fn bert_config_json(num_labels: Option<usize>) -> serde_json::Value {
    let mut config = serde_json::json!({
        "architectures": ["BertForSequenceClassification"],
        "model_type": "bert",
        "vocab_size": VOCAB.len(),
        "hidden_size": 8,
        "num_hidden_layers": 1,
        "num_attention_heads": 2,
        "intermediate_size": 16,
        "hidden_act": "gelu",
        "hidden_dropout_prob": 0.1,
        "attention_probs_dropout_prob": 0.1,
        "max_position_embeddings": 512,
        "type_vocab_size": 2,
        "initializer_range": 0.02,
        "layer_norm_eps": 1e-12,
        "pad_token_id": 0,
        "position_embedding_type": "absolute",
        "use_cache": true,
        "classifier_dropout": null,
        "id2label": { "0": "negative", "1": "neutral", "2": "positive" }
    });
    if let Some(n) = num_labels {
        config["num_labels"] = serde_json::json!(n);
    }
    config
}

/// Config of a three-way RoBERTa-family sentiment checkpoint with generic label names.
pub fn roberta_config_json(model_type: &str) -> serde_json::Value {
    let mut config = bert_config_json(None);
    config["architectures"] = serde_json::json!(["RobertaForSequenceClassification"]);
    config["model_type"] = serde_json::json!(model_type);
    // positions start after the padding index
    config["max_position_embeddings"] = serde_json::json!(514);
    config["type_vocab_size"] = serde_json::json!(1);
    config["id2label"] = serde_json::json!({ "0": "LABEL_0", "1": "LABEL_1", "2": "LABEL_2" });
    config
}

/// Writes a randomly initialised classifier checkpoint for `config_json`,
/// laid out like a fine-tuned model directory.
pub fn write_checkpoint(dir: &Path, config_json: &serde_json::Value) {
    let config = Config::from_value(config_json.clone()).unwrap();

    let varmap = VarMap::new();
    let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
    if let Err(e) = load_classifier(vb, &config) {
        panic!("building checkpoint failed: {e}");
    }
    varmap.save(dir.join("model.safetensors")).unwrap();

    std::fs::write(
        dir.join("config.json"),
        serde_json::to_vec_pretty(config_json).unwrap(),
    )
    .unwrap();

    std::fs::create_dir_all(dir.join("tokenizer")).unwrap();
    std::fs::write(
        dir.join("tokenizer").join("tokenizer.json"),
        serde_json::to_vec(&tokenizer_json()).unwrap(),
    )
    .unwrap();
}

/// BERT checkpoint with negative/neutral/positive labels.
pub fn write_model_dir(dir: &Path, num_labels: Option<usize>) {
    write_checkpoint(dir, &bert_config_json(num_labels));
}
