use thiserror::Error;

/// Per-chunk failure kinds (§7). Each is localized to the chunk it
/// originated from; session state is left untouched on any of these.
#[derive(Error, Debug, Clone)]
pub enum PipelineError {
    #[error("audio conversion failed: {0}")]
    DecodeFailed(String),

    #[error("transcription failed: {0}")]
    TranscribeFailed(String),

    #[error("no speech detected in chunk")]
    NoSpeech,

    #[error("http request failed: {0}")]
    Http(String),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
