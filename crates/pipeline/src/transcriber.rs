//! The Transcriber collaborator (§6): `transcribe(wav_bytes) -> string`,
//! backed by whichever of the two HTTP services was selected at startup.

use crate::error::{PipelineError, Result};
use async_trait::async_trait;
use std::time::Duration;

/// A speech-to-text backend. Both concrete backends (cloud transcription
/// API, local acoustic model service) reduce to this one operation.
#[async_trait]
pub trait Transcriber: Send + Sync + 'static {
    async fn transcribe(&self, wav_bytes: &[u8]) -> Result<String>;

    fn backend_name(&self) -> &str;
}

#[derive(Debug, serde::Deserialize)]
struct TranscribeResponse {
    text: String,
}

/// Posts WAV bytes to an HTTP transcription service and reads back `{ "text": ... }`.
pub struct HttpTranscriber {
    client: reqwest::Client,
    url: String,
    backend_name: String,
}

impl HttpTranscriber {
    pub fn new(url: impl Into<String>, timeout_ms: u64, backend_name: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .expect("reqwest client configuration is always valid here");
        Self {
            client,
            url: url.into(),
            backend_name: backend_name.into(),
        }
    }
}

#[async_trait]
impl Transcriber for HttpTranscriber {
    async fn transcribe(&self, wav_bytes: &[u8]) -> Result<String> {
        let endpoint = format!("{}/transcribe", self.url);
        let response = self
            .client
            .post(&endpoint)
            .header("content-type", "audio/wav")
            .body(wav_bytes.to_vec())
            .send()
            .await
            .map_err(|e| PipelineError::TranscribeFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(PipelineError::TranscribeFailed(format!(
                "{} returned {}",
                self.backend_name,
                response.status()
            )));
        }

        let parsed: TranscribeResponse = response
            .json()
            .await
            .map_err(|e| PipelineError::TranscribeFailed(e.to_string()))?;
        Ok(parsed.text)
    }

    fn backend_name(&self) -> &str {
        &self.backend_name
    }
}

/// Build the configured transcriber backend (§9: selected once at startup).
pub fn build_transcriber(asr: &quran_track_config::AsrConfig) -> Box<dyn Transcriber> {
    use quran_track_config::AsrBackend;
    match asr.backend {
        AsrBackend::Whisper => Box::new(HttpTranscriber::new(
            asr.whisper_url.clone(),
            asr.timeout_ms,
            "whisper",
        )),
        AsrBackend::Nemo => Box::new(HttpTranscriber::new(
            asr.nemo_url.clone(),
            asr.timeout_ms,
            "nemo",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeTranscriber {
        response: String,
    }

    #[async_trait]
    impl Transcriber for FakeTranscriber {
        async fn transcribe(&self, _wav_bytes: &[u8]) -> Result<String> {
            Ok(self.response.clone())
        }

        fn backend_name(&self) -> &str {
            "fake"
        }
    }

    #[tokio::test]
    async fn fake_transcriber_roundtrips() {
        let t = FakeTranscriber {
            response: "بسم الله".to_string(),
        };
        let out = t.transcribe(b"ignored").await.unwrap();
        assert_eq!(out, "بسم الله");
    }

    #[test]
    fn build_transcriber_picks_configured_backend() {
        let mut asr = quran_track_config::AsrConfig::default();
        asr.backend = quran_track_config::AsrBackend::Nemo;
        let t = build_transcriber(&asr);
        assert_eq!(t.backend_name(), "nemo");
    }
}
