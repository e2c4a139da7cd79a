use crate::classifier::ModelHandle;
use crate::codec::{decode_request, encode_response};
use crate::error::Result;
use std::time::Instant;

/// Runs decode, predict and encode for one request against a loaded model.
pub struct InferenceService {
    handle: ModelHandle,
}

impl InferenceService {
    pub fn new(handle: ModelHandle) -> Self {
        Self { handle }
    }

    pub fn invoke(&self, body: &[u8], content_type: &str, accept: &str) -> Result<String> {
        let span = tracing::debug_span!("invoke", content_type, bytes = body.len());
        let _enter = span.enter();
        let start = Instant::now();

        let text = decode_request(body, content_type)?;
        let prediction = self.handle.predict(&text)?;
        let response = encode_response(&prediction, accept)?;

        tracing::debug!(
            label = %prediction.label,
            elapsed = ?start.elapsed(),
            "request served"
        );
        Ok(response)
    }
}
