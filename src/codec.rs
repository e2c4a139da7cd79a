//! Request decoding and response encoding for the hosting contract.

use crate::classifier::{Label, PredictionResult};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

pub const JSON_CONTENT_TYPE: &str = "application/json";

#[derive(Debug, Deserialize)]
struct InferenceRequest {
    inputs: String,
}

#[derive(Debug, Serialize)]
struct InferenceResponse<'a> {
    result: &'a Label,
    scores: Vec<f64>,
}

/// True when the media type of `content_type` is JSON, ignoring parameters and case.
pub fn is_json(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .map(str::trim)
        .is_some_and(|essence| essence.eq_ignore_ascii_case(JSON_CONTENT_TYPE))
}

/// Extracts the input text from a request body.
///
/// JSON bodies must look like `{"inputs": "<text>"}`. Any other content type
/// is taken verbatim as UTF-8 text.
pub fn decode_request(body: &[u8], content_type: &str) -> Result<String> {
    if is_json(content_type) {
        let request: InferenceRequest = serde_json::from_slice(body)
            .map_err(|e| Error::decode(format!("invalid JSON request: {e}")))?;
        Ok(request.inputs)
    } else {
        tracing::trace!(content_type, "passing raw body through as text");
        String::from_utf8(body.to_vec())
            .map_err(|e| Error::decode(format!("request body is not UTF-8: {e}")))
    }
}

/// Serializes a prediction as JSON. The output is JSON whatever `accept` asks for.
pub fn encode_response(prediction: &PredictionResult, accept: &str) -> Result<String> {
    if !is_json(accept) {
        tracing::debug!(accept, "only JSON responses are produced");
    }
    let response = InferenceResponse {
        result: &prediction.label,
        scores: prediction.scores.iter().map(|&s| f64::from(s)).collect(),
    };
    Ok(serde_json::to_string(&response)?)
}
