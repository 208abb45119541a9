//! Centralized constants: generic infrastructure defaults that don't belong
//! in the per-request `Settings` tree and aren't alignment knobs (those live
//! in `quran-track-core::AlignmentConfig`).

/// Service endpoints, resolved from env vars with fallback defaults.
pub mod endpoints {
    use once_cell::sync::Lazy;

    /// Whisper-backed transcriber endpoint (env: ASR_WHISPER_URL).
    pub static ASR_WHISPER_DEFAULT: Lazy<String> = Lazy::new(|| {
        std::env::var("ASR_WHISPER_URL").unwrap_or_else(|_| "http://localhost:9000".to_string())
    });

    /// NeMo-backed transcriber endpoint (env: ASR_NEMO_URL).
    pub static ASR_NEMO_DEFAULT: Lazy<String> = Lazy::new(|| {
        std::env::var("ASR_NEMO_URL").unwrap_or_else(|_| "http://localhost:9001".to_string())
    });

    /// Audio container decoder endpoint (env: DECODER_URL).
    pub static DECODER_DEFAULT: Lazy<String> = Lazy::new(|| {
        std::env::var("DECODER_URL").unwrap_or_else(|_| "http://localhost:9002".to_string())
    });
}

/// Timeouts, in milliseconds unless noted.
pub mod timeouts {
    pub const ASR_REQUEST_MS: u64 = 10_000;
    pub const DECODER_REQUEST_MS: u64 = 5_000;
    pub const SESSION_IDLE_SECS: u64 = 600;
    pub const CLEANUP_INTERVAL_SECS: u64 = 60;
}
