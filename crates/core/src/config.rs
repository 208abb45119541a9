//! Alignment knobs. Defined here (not in `quran-track-config`) so the core
//! crate has no dependency on the service-level settings crate; the service
//! crate maps its own `AlignmentSection` onto this struct at startup.

/// Tunables for the alignment engine, fixed for the lifetime of a session.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignmentConfig {
    /// Minimum per-word similarity to call a word correct.
    pub word_threshold: f32,
    /// Minimum segment score to accept a candidate as the alignment.
    pub segment_threshold: f32,
    /// Weight on the edit-distance term of the segment score.
    pub alpha: f32,
    /// Weight on the length-penalty term of the segment score. `alpha + beta == 1`.
    pub beta: f32,
    /// Cost of an extra (unmatched) spoken word.
    pub delete_cost: f32,
    /// Cost of a reference word with no spoken counterpart.
    pub insert_cost: f32,
    /// Forward reach of the tracking window, in reference words.
    pub window_size: usize,
    /// Backward reach of the tracking window from the anchor, in reference words.
    pub backward_margin: usize,
    pub min_segment_words: usize,
    pub max_segment_words: usize,
    pub segment_stride: usize,
    /// Confidence below which a chunk counts toward the low-confidence streak.
    pub confidence_threshold: f32,
    /// Consecutive low-confidence chunks before switching to search mode.
    pub max_low_confidence: u16,
    /// Cap, in seconds, on the audio ring's total buffered duration.
    pub max_buffer_seconds: f32,
    /// Size in bytes of the cached container init segment.
    pub codec_header_bytes: usize,
    /// Assumed duration of a single chunk, used for ring accounting.
    pub chunk_duration_secs: f32,
}

impl Default for AlignmentConfig {
    fn default() -> Self {
        Self {
            word_threshold: 0.45,
            segment_threshold: 0.55,
            alpha: 0.7,
            beta: 0.3,
            delete_cost: 1.0,
            insert_cost: 1.0,
            window_size: 15,
            backward_margin: 5,
            min_segment_words: 1,
            max_segment_words: 20,
            segment_stride: 1,
            confidence_threshold: 0.5,
            max_low_confidence: 3,
            max_buffer_seconds: 8.0,
            codec_header_bytes: 500,
            chunk_duration_secs: 2.0,
        }
    }
}

impl AlignmentConfig {
    pub fn validate(&self) -> Result<(), String> {
        if (self.alpha + self.beta - 1.0).abs() > 1e-3 {
            return Err(format!(
                "alpha + beta must equal 1.0, got {} + {}",
                self.alpha, self.beta
            ));
        }
        if !(0.0..=1.0).contains(&self.word_threshold) {
            return Err("word_threshold must be in [0,1]".into());
        }
        if !(0.0..=1.0).contains(&self.segment_threshold) {
            return Err("segment_threshold must be in [0,1]".into());
        }
        if self.min_segment_words == 0 {
            return Err("min_segment_words must be >= 1".into());
        }
        if self.max_segment_words < self.min_segment_words {
            return Err("max_segment_words must be >= min_segment_words".into());
        }
        if self.segment_stride == 0 {
            return Err("segment_stride must be >= 1".into());
        }
        Ok(())
    }
}
