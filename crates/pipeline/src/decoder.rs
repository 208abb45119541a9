//! The Decoder collaborator (§6): `decode(container_bytes) -> wav_bytes`,
//! converting the browser's streaming container into 16 kHz mono PCM WAV.

use crate::error::{PipelineError, Result};
use async_trait::async_trait;
use std::time::Duration;

#[async_trait]
pub trait Decoder: Send + Sync + 'static {
    async fn decode(&self, container_bytes: &[u8]) -> Result<Vec<u8>>;
}

/// Posts the container bytes to an external conversion service (an ffmpeg
/// sidecar in the reference deployment) and reads back raw WAV bytes.
pub struct HttpDecoder {
    client: reqwest::Client,
    url: String,
}

impl HttpDecoder {
    pub fn new(url: impl Into<String>, timeout_ms: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .expect("reqwest client configuration is always valid here");
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl Decoder for HttpDecoder {
    async fn decode(&self, container_bytes: &[u8]) -> Result<Vec<u8>> {
        let endpoint = format!("{}/decode", self.url);
        let response = self
            .client
            .post(&endpoint)
            .header("content-type", "application/octet-stream")
            .body(container_bytes.to_vec())
            .send()
            .await
            .map_err(|e| PipelineError::DecodeFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(PipelineError::DecodeFailed(format!(
                "decoder returned {}",
                response.status()
            )));
        }

        response
            .bytes()
            .await
            .map(|b| b.to_vec())
            .map_err(|e| PipelineError::DecodeFailed(e.to_string()))
    }
}
