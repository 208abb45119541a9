//! Main settings module.

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::constants::{endpoints, timeouts};
use crate::ConfigError;

/// Runtime environment: loosens or tightens validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    #[default]
    Development,
    Staging,
    Production,
}

impl RuntimeEnvironment {
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    pub fn is_strict(&self) -> bool {
        matches!(self, Self::Production | Self::Staging)
    }
}

/// Top-level settings assembled at startup: defaults, then an optional TOML
/// file, then `QURAN_TRACK__`-prefixed environment variables, each layer
/// overriding the previous (§4.9).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: RuntimeEnvironment,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub asr: AsrConfig,

    #[serde(default)]
    pub decoder: DecoderConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,

    #[serde(default)]
    pub reference: ReferenceConfig,

    #[serde(default)]
    pub alignment: AlignmentSection,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_alignment()?;
        Ok(())
    }

    fn validate_server(&self) -> Result<(), ConfigError> {
        if self.server.max_sessions == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.max_sessions".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    fn validate_alignment(&self) -> Result<(), ConfigError> {
        let a = &self.alignment;
        if (a.alpha + a.beta - 1.0).abs() > 1e-3 {
            return Err(ConfigError::InvalidValue {
                field: "alignment.alpha/beta".to_string(),
                message: format!("alpha + beta must equal 1.0, got {} + {}", a.alpha, a.beta),
            });
        }
        if !(0.0..=1.0).contains(&a.word_threshold) {
            return Err(ConfigError::InvalidValue {
                field: "alignment.word_threshold".to_string(),
                message: "must be in [0,1]".to_string(),
            });
        }
        Ok(())
    }
}

/// HTTP/WebSocket transport configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_ws_path")]
    pub ws_path: String,
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
    #[serde(default = "default_session_idle_secs")]
    pub session_idle_secs: u64,
    #[serde(default = "default_cleanup_interval_secs")]
    pub cleanup_interval_secs: u64,
}

fn default_host() -> String {
    std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string())
}
fn default_port() -> u16 {
    std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080)
}
fn default_ws_path() -> String {
    "/ws/:session_id".to_string()
}
fn default_max_sessions() -> usize {
    1000
}
fn default_session_idle_secs() -> u64 {
    timeouts::SESSION_IDLE_SECS
}
fn default_cleanup_interval_secs() -> u64 {
    timeouts::CLEANUP_INTERVAL_SECS
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            ws_path: default_ws_path(),
            max_sessions: default_max_sessions(),
            session_idle_secs: default_session_idle_secs(),
            cleanup_interval_secs: default_cleanup_interval_secs(),
        }
    }
}

/// Which transcriber backend to dial, selected once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AsrBackend {
    Whisper,
    Nemo,
}

impl Default for AsrBackend {
    fn default() -> Self {
        Self::Whisper
    }
}

impl std::str::FromStr for AsrBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "whisper" => Ok(Self::Whisper),
            "nemo" => Ok(Self::Nemo),
            other => Err(ConfigError::InvalidValue {
                field: "asr.backend".to_string(),
                message: format!("unknown backend '{other}', expected 'whisper' or 'nemo'"),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AsrConfig {
    #[serde(default)]
    pub backend: AsrBackend,
    #[serde(default = "default_whisper_url")]
    pub whisper_url: String,
    #[serde(default = "default_nemo_url")]
    pub nemo_url: String,
    #[serde(default = "default_asr_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_whisper_url() -> String {
    endpoints::ASR_WHISPER_DEFAULT.clone()
}
fn default_nemo_url() -> String {
    endpoints::ASR_NEMO_DEFAULT.clone()
}
fn default_asr_timeout_ms() -> u64 {
    timeouts::ASR_REQUEST_MS
}

impl Default for AsrConfig {
    fn default() -> Self {
        Self {
            backend: AsrBackend::default(),
            whisper_url: default_whisper_url(),
            nemo_url: default_nemo_url(),
            timeout_ms: default_asr_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecoderConfig {
    #[serde(default = "default_decoder_url")]
    pub url: String,
    #[serde(default = "default_decoder_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_decoder_url() -> String {
    endpoints::DECODER_DEFAULT.clone()
}
fn default_decoder_timeout_ms() -> u64 {
    timeouts::DECODER_REQUEST_MS
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            url: default_decoder_url(),
            timeout_ms: default_decoder_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_json: bool,
}

fn default_log_level() -> String {
    std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string())
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceConfig {
    #[serde(default = "default_reference_path")]
    pub corpus_path: String,
}

fn default_reference_path() -> String {
    "config/quran.json".to_string()
}

impl Default for ReferenceConfig {
    fn default() -> Self {
        Self {
            corpus_path: default_reference_path(),
        }
    }
}

/// Mirrors `quran_track_core::AlignmentConfig`, field for field, so settings
/// loading doesn't need the core crate to implement `serde::Deserialize`
/// directly on its tuning knobs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AlignmentSection {
    #[serde(default = "default_word_threshold")]
    pub word_threshold: f32,
    #[serde(default = "default_segment_threshold")]
    pub segment_threshold: f32,
    #[serde(default = "default_alpha")]
    pub alpha: f32,
    #[serde(default = "default_beta")]
    pub beta: f32,
    #[serde(default = "default_delete_cost")]
    pub delete_cost: f32,
    #[serde(default = "default_insert_cost")]
    pub insert_cost: f32,
    #[serde(default = "default_window_size")]
    pub window_size: usize,
    #[serde(default = "default_backward_margin")]
    pub backward_margin: usize,
    #[serde(default = "default_min_segment_words")]
    pub min_segment_words: usize,
    #[serde(default = "default_max_segment_words")]
    pub max_segment_words: usize,
    #[serde(default = "default_segment_stride")]
    pub segment_stride: usize,
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f32,
    #[serde(default = "default_max_low_confidence")]
    pub max_low_confidence: u16,
    #[serde(default = "default_max_buffer_seconds")]
    pub max_buffer_seconds: f32,
    #[serde(default = "default_codec_header_bytes")]
    pub codec_header_bytes: usize,
    #[serde(default = "default_chunk_duration_secs")]
    pub chunk_duration_secs: f32,
}

fn default_word_threshold() -> f32 {
    0.45
}
fn default_segment_threshold() -> f32 {
    0.55
}
fn default_alpha() -> f32 {
    0.7
}
fn default_beta() -> f32 {
    0.3
}
fn default_delete_cost() -> f32 {
    1.0
}
fn default_insert_cost() -> f32 {
    1.0
}
fn default_window_size() -> usize {
    15
}
fn default_backward_margin() -> usize {
    5
}
fn default_min_segment_words() -> usize {
    1
}
fn default_max_segment_words() -> usize {
    20
}
fn default_segment_stride() -> usize {
    1
}
fn default_confidence_threshold() -> f32 {
    0.5
}
fn default_max_low_confidence() -> u16 {
    3
}
fn default_max_buffer_seconds() -> f32 {
    8.0
}
fn default_codec_header_bytes() -> usize {
    500
}
fn default_chunk_duration_secs() -> f32 {
    2.0
}

impl Default for AlignmentSection {
    fn default() -> Self {
        Self {
            word_threshold: default_word_threshold(),
            segment_threshold: default_segment_threshold(),
            alpha: default_alpha(),
            beta: default_beta(),
            delete_cost: default_delete_cost(),
            insert_cost: default_insert_cost(),
            window_size: default_window_size(),
            backward_margin: default_backward_margin(),
            min_segment_words: default_min_segment_words(),
            max_segment_words: default_max_segment_words(),
            segment_stride: default_segment_stride(),
            confidence_threshold: default_confidence_threshold(),
            max_low_confidence: default_max_low_confidence(),
            max_buffer_seconds: default_max_buffer_seconds(),
            codec_header_bytes: default_codec_header_bytes(),
            chunk_duration_secs: default_chunk_duration_secs(),
        }
    }
}

/// Load settings from defaults, an optional `config/{env}.toml` file, then
/// `QURAN_TRACK__`-prefixed environment variables (highest priority).
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    builder = builder.add_source(File::with_name("config/default").required(false));
    if let Some(env_name) = env {
        builder =
            builder.add_source(File::with_name(&format!("config/{}", env_name)).required(false));
    }
    builder = builder.add_source(
        Environment::with_prefix("QURAN_TRACK")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;
    settings.validate()?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_validate() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.asr.backend, AsrBackend::Whisper);
    }

    #[test]
    fn rejects_zero_max_sessions() {
        let mut settings = Settings::default();
        settings.server.max_sessions = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn rejects_unbalanced_alignment_weights() {
        let mut settings = Settings::default();
        settings.alignment.alpha = 0.9;
        settings.alignment.beta = 0.3;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn asr_backend_parses_from_str() {
        use std::str::FromStr;
        assert_eq!(AsrBackend::from_str("whisper").unwrap(), AsrBackend::Whisper);
        assert_eq!(AsrBackend::from_str("NEMO").unwrap(), AsrBackend::Nemo);
        assert!(AsrBackend::from_str("bogus").is_err());
    }
}
