use thiserror::Error;

/// Errors raised by the alignment core itself (not the surrounding I/O).
///
/// Per-chunk failures that originate outside the core (decode, transcribe) are
/// modeled by the pipeline crate; this enum only covers conditions the core
/// can detect on its own inputs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("reference index is empty")]
    EmptyReference,

    #[error("page {0} has no known range")]
    UnknownPage(u32),

    #[error("spoken word sequence is empty")]
    EmptySpokenWords,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
