use candle_transformers::models::bert::Config as BertConfig;
use candle_transformers::models::xlm_roberta::Config as XlmRobertaConfig;
use serde::Deserialize;
use std::collections::HashMap;

/// Number of classes the sentiment head must produce.
pub const NUM_LABELS: usize = 3;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid model config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported model_type '{0}' (expected bert, roberta or xlm-roberta)")]
    UnsupportedModelType(String),
}

/// Backbone hyper-parameters, selected by the checkpoint's `model_type`.
#[derive(Debug, Clone)]
pub enum Architecture {
    Bert(BertConfig),
    /// RoBERTa and XLM-RoBERTa share one layout.
    XlmRoberta(XlmRobertaConfig),
}

impl Architecture {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Bert(_) => "bert",
            Self::XlmRoberta(_) => "xlm-roberta",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub architecture: Architecture,
    pub classifier_config: ClassifierConfig,
}

#[derive(Debug, Deserialize)]
struct Header {
    #[serde(default)]
    model_type: Option<String>,
    #[serde(flatten)]
    classifier_config: ClassifierConfig,
}

impl Config {
    /// Parses a `config.json` value. A missing `model_type` is read as BERT.
    pub fn from_value(value: serde_json::Value) -> Result<Self, ConfigError> {
        let header: Header = serde_json::from_value(value.clone())?;
        let architecture = match header.model_type.as_deref() {
            None | Some("bert") => Architecture::Bert(serde_json::from_value(value)?),
            Some("roberta") | Some("xlm-roberta") => {
                Architecture::XlmRoberta(serde_json::from_value(value)?)
            }
            Some(other) => return Err(ConfigError::UnsupportedModelType(other.to_string())),
        };
        Ok(Self {
            architecture,
            classifier_config: header.classifier_config,
        })
    }

    pub fn from_reader<R: std::io::Read>(reader: R) -> Result<Self, ConfigError> {
        Self::from_value(serde_json::from_reader(reader)?)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
pub struct ClassifierConfig {
    #[serde(default)]
    pub id2label: HashMap<String, String>,
    #[serde(default)]
    pub num_labels: Option<usize>,
}

impl ClassifierConfig {
    /// Explicit `num_labels`, else the size of `id2label`, else three.
    pub fn num_labels(&self) -> usize {
        self.num_labels.unwrap_or(if self.id2label.is_empty() {
            NUM_LABELS
        } else {
            self.id2label.len()
        })
    }

    /// Labels ordered by class index, if `id2label` covers every index.
    pub fn ordered_labels(&self) -> Option<Vec<String>> {
        (0..self.num_labels())
            .map(|i| self.id2label.get(&i.to_string()).cloned())
            .collect()
    }
}
