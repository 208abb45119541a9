//! Segment Scorer (C4): scores a candidate reference segment against a
//! spoken-word vector and back-traces the winning alignment.

use crate::config::AlignmentConfig;
use crate::reference::ReferenceWord;
use crate::text::sim;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlignmentType {
    Match,
    Substitution,
    Insertion,
    Deletion,
}

/// The reference word underlying a `Match`, when one is present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchedReference {
    pub global_index: u32,
    pub verse_id: u32,
    pub word_index_in_verse: u16,
    pub text_raw: String,
}

impl From<&ReferenceWord> for MatchedReference {
    fn from(w: &ReferenceWord) -> Self {
        Self {
            global_index: w.global_index,
            verse_id: w.verse_id,
            word_index_in_verse: w.word_index_in_verse,
            text_raw: w.text_raw.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub spoken_word: String,
    pub quran_word: Option<MatchedReference>,
    pub similarity: f32,
    pub is_correct: bool,
    pub alignment_type: AlignmentType,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SegmentScore {
    pub score: f32,
    pub matches: Vec<Match>,
}

/// Op priority for DP tie-breaking: lower wins. Diagonal moves resolve to
/// Match or Substitution depending on whether the words are identical.
fn op_priority(ty: AlignmentType) -> u8 {
    match ty {
        AlignmentType::Match => 0,
        AlignmentType::Substitution => 1,
        AlignmentType::Insertion => 2,
        AlignmentType::Deletion => 3,
    }
}

/// Score `spoken` against `reference` per §4.4: word-level edit distance with
/// asymmetric insertion/deletion costs, combined with a length penalty.
///
/// Returns a score in `[0, 1]` and the back-traced per-word matches in
/// spoken-word order. Empty inputs score 0 with no matches.
pub fn score_segment(
    spoken: &[String],
    reference: &[ReferenceWord],
    config: &AlignmentConfig,
) -> SegmentScore {
    let m = spoken.len();
    let n = reference.len();
    if m == 0 || n == 0 {
        return SegmentScore {
            score: 0.0,
            matches: Vec::new(),
        };
    }

    // dp[i][j] = min cost aligning spoken[0..i] with reference[0..j].
    let mut dp = vec![vec![0f32; n + 1]; m + 1];
    // back[i][j] = which op produced dp[i][j].
    let mut back = vec![vec![AlignmentType::Insertion; n + 1]; m + 1];

    for i in 1..=m {
        dp[i][0] = i as f32 * config.delete_cost;
        back[i][0] = AlignmentType::Insertion;
    }
    for j in 1..=n {
        dp[0][j] = j as f32 * config.insert_cost;
        back[0][j] = AlignmentType::Deletion;
    }

    for i in 1..=m {
        for j in 1..=n {
            let similarity = sim(&spoken[i - 1], &reference[j - 1].text_norm);
            let diag_type = if similarity >= 1.0 {
                AlignmentType::Match
            } else {
                AlignmentType::Substitution
            };
            let diag_cost = dp[i - 1][j - 1] + (1.0 - similarity);
            let up_cost = dp[i - 1][j] + config.delete_cost; // insertion: consume spoken only
            let left_cost = dp[i][j - 1] + config.insert_cost; // deletion: consume reference only

            let mut candidates = [
                (diag_cost, diag_type),
                (up_cost, AlignmentType::Insertion),
                (left_cost, AlignmentType::Deletion),
            ];
            candidates.sort_by(|a, b| {
                a.0.partial_cmp(&b.0)
                    .unwrap()
                    .then(op_priority(a.1).cmp(&op_priority(b.1)))
            });
            dp[i][j] = candidates[0].0;
            back[i][j] = candidates[0].1;
        }
    }

    let total_cost = dp[m][n];
    let max_len = m.max(n) as f32;
    let dist_score = (1.0 - total_cost / max_len).clamp(0.0, 1.0);
    let length_penalty = (1.0 - (m as f32 - n as f32).abs() / max_len).clamp(0.0, 1.0);
    let score = (config.alpha * dist_score + config.beta * length_penalty).clamp(0.0, 1.0);

    let matches = backtrace(spoken, reference, &back, config);

    SegmentScore { score, matches }
}

fn backtrace(
    spoken: &[String],
    reference: &[ReferenceWord],
    back: &[Vec<AlignmentType>],
    config: &AlignmentConfig,
) -> Vec<Match> {
    let mut i = spoken.len();
    let mut j = reference.len();
    let mut steps: Vec<Match> = Vec::new();

    while i > 0 || j > 0 {
        let op = if i == 0 {
            AlignmentType::Deletion
        } else if j == 0 {
            AlignmentType::Insertion
        } else {
            back[i][j]
        };

        match op {
            AlignmentType::Match | AlignmentType::Substitution => {
                let s = &spoken[i - 1];
                let r = &reference[j - 1];
                let similarity = sim(s, &r.text_norm);
                steps.push(Match {
                    spoken_word: s.clone(),
                    quran_word: Some(MatchedReference::from(r)),
                    similarity,
                    is_correct: similarity >= config.word_threshold,
                    alignment_type: op,
                });
                i -= 1;
                j -= 1;
            }
            AlignmentType::Insertion => {
                steps.push(Match {
                    spoken_word: spoken[i - 1].clone(),
                    quran_word: None,
                    similarity: 0.0,
                    is_correct: false,
                    alignment_type: AlignmentType::Insertion,
                });
                i -= 1;
            }
            AlignmentType::Deletion => {
                steps.push(Match {
                    spoken_word: String::new(),
                    quran_word: Some(MatchedReference::from(&reference[j - 1])),
                    similarity: 0.0,
                    is_correct: false,
                    alignment_type: AlignmentType::Deletion,
                });
                j -= 1;
            }
        }
    }

    steps.reverse();
    // Deletions (no spoken word) carry no position in the spoken sequence;
    // §8's exhaustiveness property is about the non-deletion matches only.
    steps
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::VerseInput;
    use crate::reference::ReferenceIndex;

    fn idx() -> ReferenceIndex {
        ReferenceIndex::build(&[VerseInput {
            id: 1,
            sura_no: 1,
            page: 1,
            jozz: Some(1),
            words: vec![
                "بسم".into(),
                "الله".into(),
                "الرحمن".into(),
                "الرحيم".into(),
            ],
        }])
        .unwrap()
    }

    #[test]
    fn exact_recitation_scores_near_one() {
        let idx = idx();
        let reference = idx.words_in_range(0, 4);
        let spoken: Vec<String> = reference.iter().map(|w| w.text_norm.clone()).collect();
        let result = score_segment(&spoken, reference, &AlignmentConfig::default());
        assert!(result.score > 0.95, "score was {}", result.score);
        assert_eq!(result.matches.len(), 4);
        assert!(result.matches.iter().all(|m| m.is_correct));
        assert!(result
            .matches
            .iter()
            .all(|m| m.alignment_type == AlignmentType::Match));
    }

    #[test]
    fn substitution_is_flagged() {
        let idx = idx();
        let reference = idx.words_in_range(0, 4);
        let spoken = vec![
            "بسم".to_string(),
            "الله".to_string(),
            "الرحمون".to_string(),
            "الرحيم".to_string(),
        ];
        let result = score_segment(&spoken, reference, &AlignmentConfig::default());
        assert_eq!(result.matches.len(), 4);
        assert_eq!(result.matches[2].alignment_type, AlignmentType::Substitution);
        assert!(!result.matches[2].is_correct || result.matches[2].similarity < 1.0);
    }

    #[test]
    fn extra_spoken_word_is_insertion() {
        let idx = idx();
        let reference = idx.words_in_range(0, 4);
        let spoken = vec![
            "بسم".to_string(),
            "يا".to_string(),
            "الله".to_string(),
            "الرحمن".to_string(),
            "الرحيم".to_string(),
        ];
        let result = score_segment(&spoken, reference, &AlignmentConfig::default());
        let insertions: Vec<_> = result
            .matches
            .iter()
            .filter(|m| m.alignment_type == AlignmentType::Insertion)
            .collect();
        assert_eq!(insertions.len(), 1);
        assert_eq!(insertions[0].spoken_word, "يا");
    }

    #[test]
    fn missing_spoken_word_is_deletion() {
        let idx = idx();
        let reference = idx.words_in_range(0, 4);
        let spoken = vec!["بسم".to_string(), "الله".to_string(), "الرحيم".to_string()];
        let result = score_segment(&spoken, reference, &AlignmentConfig::default());
        let deletions: Vec<_> = result
            .matches
            .iter()
            .filter(|m| m.alignment_type == AlignmentType::Deletion)
            .collect();
        assert_eq!(deletions.len(), 1);
        assert_eq!(
            deletions[0].quran_word.as_ref().unwrap().text_raw,
            "الرحمن"
        );
    }

    #[test]
    fn empty_inputs_score_zero() {
        let idx = idx();
        let reference = idx.words_in_range(0, 4);
        let result = score_segment(&[], reference, &AlignmentConfig::default());
        assert_eq!(result.score, 0.0);
        assert!(result.matches.is_empty());

        let spoken = vec!["بسم".to_string()];
        let result = score_segment(&spoken, &[], &AlignmentConfig::default());
        assert_eq!(result.score, 0.0);
        assert!(result.matches.is_empty());
    }

    #[test]
    fn deterministic_across_repeated_calls() {
        let idx = idx();
        let reference = idx.words_in_range(0, 4);
        let spoken = vec!["بسم".to_string(), "الله".to_string()];
        let a = score_segment(&spoken, reference, &AlignmentConfig::default());
        let b = score_segment(&spoken, reference, &AlignmentConfig::default());
        assert_eq!(a, b);
    }
}
