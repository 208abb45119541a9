//! Typed configuration for the recitation tracking service: defaults, an
//! optional TOML file, and environment variable overrides, assembled once at
//! startup (§4.9).

pub mod constants;
pub mod error;
pub mod settings;

pub use error::ConfigError;
pub use settings::{
    load_settings, AlignmentSection, AsrBackend, AsrConfig, DecoderConfig, ObservabilityConfig,
    ReferenceConfig, RuntimeEnvironment, ServerConfig, Settings,
};

impl From<&AlignmentSection> for quran_track_core::AlignmentConfig {
    fn from(s: &AlignmentSection) -> Self {
        Self {
            word_threshold: s.word_threshold,
            segment_threshold: s.segment_threshold,
            alpha: s.alpha,
            beta: s.beta,
            delete_cost: s.delete_cost,
            insert_cost: s.insert_cost,
            window_size: s.window_size,
            backward_margin: s.backward_margin,
            min_segment_words: s.min_segment_words,
            max_segment_words: s.max_segment_words,
            segment_stride: s.segment_stride,
            confidence_threshold: s.confidence_threshold,
            max_low_confidence: s.max_low_confidence,
            max_buffer_seconds: s.max_buffer_seconds,
            codec_header_bytes: s.codec_header_bytes,
            chunk_duration_secs: s.chunk_duration_secs,
        }
    }
}
