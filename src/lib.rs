//! Sentiment inference shim
//!
//! Loads a BERT sequence classifier and its tokenizer from a model directory,
//! decodes `{"inputs": ...}` requests, scores the text over
//! negative/neutral/positive and encodes the result as JSON.

pub mod classifier;
pub mod codec;
pub mod config;
pub mod error;
pub mod model;
pub mod service;

pub use classifier::{allot, predict, softmax, Label, ModelHandle, PredictionResult};
pub use codec::{decode_request, encode_response, JSON_CONTENT_TYPE};
pub use config::{Device, LoadOptions, DEFAULT_MAX_LENGTH};
pub use error::{Error, Result};
pub use model::{
    load_classifier, BertSequenceClassifier, SequenceClassifier, XlmRobertaSequenceClassifier,
};
pub use service::InferenceService;
