//! Session State & Controller (C6): per-session anchor, mode, and confidence
//! streak. Pure data plus transition logic; the keyed, lock-guarded registry
//! that owns many of these lives in the server crate (§4.11, A5).

use crate::align::{AlignmentResult, Mode};
use crate::audio_ring::AudioRing;
use crate::config::AlignmentConfig;

#[derive(Debug, Clone)]
pub struct SessionState {
    pub global_word_pos: u32,
    pub last_confidence: f32,
    pub mode: Mode,
    pub low_conf_streak: u16,
    pub codec_header: Option<Vec<u8>>,
    pub audio_ring: AudioRing,
}

impl SessionState {
    pub fn new(max_buffer_seconds: f32) -> Self {
        Self {
            global_word_pos: 0,
            last_confidence: 0.0,
            mode: Mode::Tracking,
            low_conf_streak: 0,
            codec_header: None,
            audio_ring: AudioRing::new(max_buffer_seconds),
        }
    }

    /// Fold the outcome of one alignment pass into session state: advance
    /// the anchor monotonically and run the tracking/search mode machine
    /// (§4.6).
    pub fn apply_alignment_result(&mut self, result: &AlignmentResult, config: &AlignmentConfig) {
        self.global_word_pos = self.global_word_pos.max(result.furthest_global_index);
        self.last_confidence = result.confidence;

        if result.confidence >= config.confidence_threshold {
            self.low_conf_streak = 0;
            self.mode = Mode::Tracking;
        } else {
            self.low_conf_streak = self.low_conf_streak.saturating_add(1);
            if self.low_conf_streak >= config.max_low_confidence && self.mode != Mode::Search {
                tracing::debug!(
                    streak = self.low_conf_streak,
                    pos = self.global_word_pos,
                    "switching to search mode"
                );
                self.mode = Mode::Search;
            }
        }
    }

    /// Explicit reset signal (§6 `reset_progress`), sent on a page change:
    /// anchor and streak clear, mode returns to tracking, and the buffered
    /// audio and cached codec header are dropped so the next chunk isn't
    /// concatenated against the previous page's recitation.
    pub fn reset_progress(&mut self) {
        self.global_word_pos = 0;
        self.last_confidence = 0.0;
        self.low_conf_streak = 0;
        self.mode = Mode::Tracking;
        self.codec_header = None;
        self.audio_ring.clear();
    }
}
