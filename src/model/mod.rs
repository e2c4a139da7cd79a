//! Sequence-classification models behind a single forward-pass seam.

pub mod config;

use crate::error::{Error, Result};
use candle_core::{Device, IndexOp, Tensor};
use candle_nn::{Linear, Module, VarBuilder};
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use candle_transformers::models::xlm_roberta::{
    Config as XlmRobertaConfig, XLMRobertaForSequenceClassification,
};
use tokenizers::Encoding;

pub use config::{Architecture, ClassifierConfig, Config, ConfigError, NUM_LABELS};

/// A model that maps one tokenized sequence to a vector of class logits.
pub trait SequenceClassifier: Send + Sync {
    /// Runs one forward pass and returns a 1-D tensor of `num_labels` logits.
    fn forward(&self, encoding: &Encoding) -> Result<Tensor>;
}

/// Builds the classifier matching `config.architecture`.
pub fn load_classifier(vb: VarBuilder, config: &Config) -> Result<Box<dyn SequenceClassifier>> {
    let num_labels = config.classifier_config.num_labels();
    let model: Box<dyn SequenceClassifier> = match &config.architecture {
        Architecture::Bert(bert) => Box::new(BertSequenceClassifier::load(vb, bert, num_labels)?),
        Architecture::XlmRoberta(roberta) => {
            Box::new(XlmRobertaSequenceClassifier::load(vb, roberta, num_labels)?)
        }
    };
    tracing::debug!(
        architecture = config.architecture.name(),
        num_labels,
        "built classifier"
    );
    Ok(model)
}

/// Batch-of-one `(input_ids, token_type_ids, attention_mask)` tensors.
fn input_tensors(encoding: &Encoding, device: &Device) -> Result<(Tensor, Tensor, Tensor)> {
    if encoding.get_ids().is_empty() {
        return Err(Error::inference("tokenizer produced no tokens"));
    }
    let input_ids = Tensor::new(encoding.get_ids(), device)?.unsqueeze(0)?;
    let token_type_ids = Tensor::new(encoding.get_type_ids(), device)?.unsqueeze(0)?;
    let attention_mask = Tensor::new(encoding.get_attention_mask(), device)?.unsqueeze(0)?;
    Ok((input_ids, token_type_ids, attention_mask))
}

/// BERT backbone with the pooler + linear head of a fine-tuned
/// `BertForSequenceClassification` checkpoint.
pub struct BertSequenceClassifier {
    bert: BertModel,
    pooler: Linear,
    classifier: Linear,
    device: Device,
}

impl BertSequenceClassifier {
    /// Builds the model from a var builder rooted at the checkpoint's top level.
    ///
    /// The backbone is looked up under `bert.` first, then at the root.
    pub fn load(vb: VarBuilder, config: &BertConfig, num_labels: usize) -> Result<Self> {
        let hidden_size = config.hidden_size;

        let (bert, pooler) = match BertModel::load(vb.pp("bert"), config) {
            Ok(bert) => {
                tracing::debug!("loaded BERT backbone from 'bert'");
                let pooler =
                    candle_nn::linear(hidden_size, hidden_size, vb.pp("bert.pooler.dense"))?;
                (bert, pooler)
            }
            Err(prefixed) => {
                let bert = BertModel::load(vb.clone(), config).map_err(|root| {
                    Error::inference(format!(
                        "no BERT backbone found (bert: {prefixed} | <root>: {root})"
                    ))
                })?;
                tracing::debug!("loaded BERT backbone from <root>");
                let pooler = candle_nn::linear(hidden_size, hidden_size, vb.pp("pooler.dense"))?;
                (bert, pooler)
            }
        };
        let classifier = candle_nn::linear(hidden_size, num_labels, vb.pp("classifier"))?;

        Ok(Self {
            bert,
            pooler,
            classifier,
            device: vb.device().clone(),
        })
    }
}

impl SequenceClassifier for BertSequenceClassifier {
    fn forward(&self, encoding: &Encoding) -> Result<Tensor> {
        let (input_ids, token_type_ids, attention_mask) = input_tensors(encoding, &self.device)?;

        let hidden_states = self
            .bert
            .forward(&input_ids, &token_type_ids, Some(&attention_mask))?;
        // [CLS] state, shape (1, hidden)
        let cls = hidden_states.i((.., 0))?;
        let pooled = self.pooler.forward(&cls)?.tanh()?;
        let logits = self.classifier.forward(&pooled)?;
        Ok(logits.squeeze(0)?)
    }
}

/// RoBERTa-family checkpoint (`roberta.*` backbone, `classifier.dense` /
/// `classifier.out_proj` head).
pub struct XlmRobertaSequenceClassifier {
    model: XLMRobertaForSequenceClassification,
    device: Device,
}

impl XlmRobertaSequenceClassifier {
    /// Looks for the model at the root, then under `model.`.
    pub fn load(vb: VarBuilder, config: &XlmRobertaConfig, num_labels: usize) -> Result<Self> {
        let model = match XLMRobertaForSequenceClassification::new(num_labels, config, vb.clone()) {
            Ok(model) => {
                tracing::debug!("loaded RoBERTa classifier from <root>");
                model
            }
            Err(root) => XLMRobertaForSequenceClassification::new(
                num_labels,
                config,
                vb.pp("model"),
            )
            .map_err(|prefixed| {
                Error::inference(format!(
                    "no RoBERTa classifier found (<root>: {root} | model: {prefixed})"
                ))
            })?,
        };

        Ok(Self {
            model,
            device: vb.device().clone(),
        })
    }
}

impl SequenceClassifier for XlmRobertaSequenceClassifier {
    fn forward(&self, encoding: &Encoding) -> Result<Tensor> {
        let (input_ids, token_type_ids, attention_mask) = input_tensors(encoding, &self.device)?;

        let logits = self
            .model
            .forward(&input_ids, &attention_mask, &token_type_ids)?;
        Ok(logits.squeeze(0)?)
    }
}
