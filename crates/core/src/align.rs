//! Alignment Engine (C5): generates candidate reference segments around the
//! session's anchor, scores them, and picks the best.

use crate::config::AlignmentConfig;
use crate::reference::ReferenceIndex;
use crate::scorer::{score_segment, Match};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Tracking,
    Search,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlignmentResult {
    pub matches: Vec<Match>,
    pub segment_score: f32,
    pub confidence: f32,
    pub furthest_global_index: u32,
}

struct Candidate {
    start: u32,
    len: usize,
    score: f32,
    matches: Vec<Match>,
}

/// Run one alignment pass. `anchor` is the session's current global word
/// position; `page` bounds the search window when known (§4.3); the window
/// is further narrowed to a neighborhood of `anchor` in `Mode::Tracking`.
pub fn align(
    spoken_words: &[String],
    reference_index: &ReferenceIndex,
    anchor: u32,
    mode: Mode,
    page: Option<u32>,
    config: &AlignmentConfig,
) -> AlignmentResult {
    if spoken_words.is_empty() {
        return AlignmentResult {
            matches: Vec::new(),
            segment_score: 0.0,
            confidence: 0.0,
            furthest_global_index: anchor,
        };
    }

    let (lo, hi) = reference_index.search_window(
        anchor,
        mode,
        page,
        config.window_size,
        config.backward_margin,
    );

    let m = spoken_words.len();
    let min_len = if m < config.min_segment_words {
        m
    } else {
        config.min_segment_words.max(m.saturating_sub(2))
    };

    let mut best: Option<Candidate> = None;

    let mut k = lo;
    while k < hi {
        let max_possible_len = (hi - k) as usize;
        if max_possible_len == 0 {
            break;
        }
        let len_hi = config
            .max_segment_words
            .min(m + 2)
            .min(max_possible_len);
        let len_lo = min_len.min(len_hi).max(1);

        let mut l = len_lo;
        while l <= len_hi {
            let segment = reference_index.words_in_range(k, k + l as u32);
            if !segment.is_empty() {
                let scored = score_segment(spoken_words, segment, config);
                let candidate = Candidate {
                    start: k,
                    len: l,
                    score: scored.score,
                    matches: scored.matches,
                };
                best = Some(pick_better(best, candidate, m));
            }
            l += 1;
        }
        k += config.segment_stride as u32;
    }

    match best {
        None => AlignmentResult {
            matches: Vec::new(),
            segment_score: 0.0,
            confidence: 0.0,
            furthest_global_index: anchor,
        },
        Some(winner) => {
            let accepted = winner.score >= config.segment_threshold;
            let furthest = if accepted {
                winner.start + winner.len as u32
            } else {
                anchor
            };
            AlignmentResult {
                confidence: winner.score,
                segment_score: winner.score,
                matches: winner.matches,
                furthest_global_index: furthest.max(anchor),
            }
        }
    }
}

/// Tie-break per §4.5: highest score; then smaller `|len - m|`; then smaller start.
fn pick_better(current: Option<Candidate>, next: Candidate, m: usize) -> Candidate {
    match current {
        None => next,
        Some(cur) => {
            let cur_len_gap = (cur.len as i64 - m as i64).abs();
            let next_len_gap = (next.len as i64 - m as i64).abs();
            let better = if next.score > cur.score {
                true
            } else if next.score < cur.score {
                false
            } else if next_len_gap < cur_len_gap {
                true
            } else if next_len_gap > cur_len_gap {
                false
            } else {
                next.start < cur.start
            };
            if better {
                next
            } else {
                cur
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::VerseInput;

    fn idx() -> ReferenceIndex {
        ReferenceIndex::build(&[
            VerseInput {
                id: 1,
                sura_no: 1,
                page: 1,
                jozz: Some(1),
                words: vec!["بسم".into(), "الله".into(), "الرحمن".into(), "الرحيم".into()],
            },
            VerseInput {
                id: 2,
                sura_no: 1,
                page: 1,
                jozz: Some(1),
                words: vec!["الحمد".into(), "لله".into(), "رب".into(), "العالمين".into()],
            },
        ])
        .unwrap()
    }

    #[test]
    fn exact_recitation_advances_anchor() {
        let idx = idx();
        let config = AlignmentConfig::default();
        let spoken = vec!["بسم".to_string(), "الله".to_string(), "الرحمن".to_string(), "الرحيم".to_string()];
        let result = align(&spoken, &idx, 0, Mode::Tracking, Some(1), &config);
        assert_eq!(result.furthest_global_index, 4);
        assert!(result.confidence >= config.segment_threshold);
        assert_eq!(result.matches.len(), 4);
    }

    #[test]
    fn furthest_never_goes_backward() {
        let idx = idx();
        let config = AlignmentConfig::default();
        let garbage = vec!["foo".to_string(), "bar".to_string(), "baz".to_string()];
        let result = align(&garbage, &idx, 4, Mode::Tracking, Some(1), &config);
        assert!(result.furthest_global_index >= 4);
        assert!(result.confidence < config.confidence_threshold);
    }

    #[test]
    fn low_confidence_does_not_advance_anchor() {
        let idx = idx();
        let config = AlignmentConfig::default();
        let garbage = vec!["zzz".to_string(), "qqq".to_string()];
        let result = align(&garbage, &idx, 2, Mode::Tracking, Some(1), &config);
        assert_eq!(result.furthest_global_index, 2);
    }

    #[test]
    fn search_mode_covers_whole_page() {
        let idx = idx();
        let config = AlignmentConfig::default();
        let spoken = vec!["الحمد".to_string(), "لله".to_string(), "رب".to_string(), "العالمين".to_string()];
        // anchor still at 0, but search mode should find the second verse anyway.
        let result = align(&spoken, &idx, 0, Mode::Search, Some(1), &config);
        assert_eq!(result.furthest_global_index, 8);
    }

    #[test]
    fn empty_spoken_words_is_a_no_op() {
        let idx = idx();
        let config = AlignmentConfig::default();
        let result = align(&[], &idx, 3, Mode::Tracking, Some(1), &config);
        assert_eq!(result.furthest_global_index, 3);
        assert_eq!(result.confidence, 0.0);
        assert!(result.matches.is_empty());
    }

    #[test]
    fn match_exhaustiveness_preserves_spoken_order() {
        let idx = idx();
        let config = AlignmentConfig::default();
        let spoken = vec!["بسم".to_string(), "يا".to_string(), "الله".to_string()];
        let result = align(&spoken, &idx, 0, Mode::Tracking, Some(1), &config);
        let spoken_back: Vec<&str> = result
            .matches
            .iter()
            .filter(|m| m.alignment_type != crate::scorer::AlignmentType::Deletion)
            .map(|m| m.spoken_word.as_str())
            .collect();
        assert_eq!(spoken_back, vec!["بسم", "يا", "الله"]);
    }
}
