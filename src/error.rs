//! Error types for the inference shim

use std::path::PathBuf;

/// Result type alias using the shim's Error type
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Model or tokenizer artifacts missing or unreadable
    #[error("failed to load model from {}: {reason}", path.display())]
    Load { path: PathBuf, reason: String },

    /// Request body could not be turned into input text
    #[error("decode error: {0}")]
    Decode(String),

    /// Tokenization or forward pass failed
    #[error("inference error: {0}")]
    Inference(String),

    /// Response serialization
    #[error("encode error: {0}")]
    Encode(#[from] serde_json::Error),
}

impl Error {
    pub fn load(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Load {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    pub fn inference(msg: impl Into<String>) -> Self {
        Self::Inference(msg.into())
    }
}

impl From<candle_core::Error> for Error {
    fn from(err: candle_core::Error) -> Self {
        Self::Inference(format!("candle error: {err}"))
    }
}

impl From<tokenizers::Error> for Error {
    fn from(err: tokenizers::Error) -> Self {
        Self::Inference(format!("tokenizer error: {err}"))
    }
}
