//! Reference Index (C3): the flattened, globally-addressable Qur'an word
//! sequence the alignment engine searches over.

use crate::error::{CoreError, Result};
use crate::text::normalize;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One word of the canonical text, addressable by a dense global index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReferenceWord {
    pub global_index: u32,
    pub verse_id: u32,
    pub word_index_in_verse: u16,
    pub text_raw: String,
    pub text_norm: String,
}

/// One verse as loaded from the corpus file, before flattening.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerseInput {
    pub id: u32,
    pub sura_no: u32,
    pub page: u32,
    #[serde(default)]
    pub jozz: Option<u32>,
    pub words: Vec<String>,
}

/// Immutable, shared-without-locking index over the flattened corpus.
#[derive(Debug)]
pub struct ReferenceIndex {
    words: Vec<ReferenceWord>,
    page_ranges: HashMap<u32, (u32, u32)>,
}

impl ReferenceIndex {
    /// Build from the verse list exactly as loaded from the corpus file.
    /// Verses are flattened in input order; global indices are assigned
    /// densely over that order.
    pub fn build(verses: &[VerseInput]) -> Result<Self> {
        let mut words = Vec::new();
        let mut page_ranges: HashMap<u32, (u32, u32)> = HashMap::new();
        let mut global_index: u32 = 0;

        for verse in verses {
            let lo = global_index;
            for (word_index, raw) in verse.words.iter().enumerate() {
                let norm = normalize(raw);
                if norm.is_empty() {
                    continue;
                }
                words.push(ReferenceWord {
                    global_index,
                    verse_id: verse.id,
                    word_index_in_verse: word_index as u16,
                    text_raw: raw.clone(),
                    text_norm: norm,
                });
                global_index += 1;
            }
            let hi = global_index;
            if hi > lo {
                page_ranges
                    .entry(verse.page)
                    .and_modify(|(plo, phi)| {
                        *plo = (*plo).min(lo);
                        *phi = (*phi).max(hi);
                    })
                    .or_insert((lo, hi));
            }
        }

        if words.is_empty() {
            return Err(CoreError::EmptyReference);
        }
        tracing::info!(
            words = words.len(),
            pages = page_ranges.len(),
            "reference index built"
        );
        Ok(Self { words, page_ranges })
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Reference words in `[lo, hi)`, clipped to the index bounds.
    pub fn words_in_range(&self, lo: u32, hi: u32) -> &[ReferenceWord] {
        let len = self.words.len() as u32;
        let lo = lo.min(len) as usize;
        let hi = hi.min(len) as usize;
        if lo >= hi {
            &[]
        } else {
            &self.words[lo..hi]
        }
    }

    /// Global index range covered by `page`, if known.
    pub fn range_for_page(&self, page: u32) -> Option<(u32, u32)> {
        self.page_ranges.get(&page).copied()
    }

    /// Full-index range, used when no page is known or when falling back.
    pub fn full_range(&self) -> (u32, u32) {
        (0, self.words.len() as u32)
    }

    /// Window to search, per §4.3: clipped forward/backward reach around the
    /// anchor in tracking mode, or the whole page in search mode. Falls back
    /// to the full index if `page` is unknown (§7 `page_out_of_range`).
    pub fn search_window(
        &self,
        anchor: u32,
        mode: super::align::Mode,
        page: Option<u32>,
        window_size: usize,
        backward_margin: usize,
    ) -> (u32, u32) {
        let (page_lo, page_hi) = page
            .and_then(|p| self.range_for_page(p))
            .unwrap_or_else(|| self.full_range());

        match mode {
            super::align::Mode::Search => (page_lo, page_hi),
            super::align::Mode::Tracking => {
                let lo = page_lo.max(anchor.saturating_sub(backward_margin as u32));
                let hi = page_hi.min(anchor + window_size as u32);
                (lo, hi.max(lo))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_verses() -> Vec<VerseInput> {
        vec![
            VerseInput {
                id: 1,
                sura_no: 1,
                page: 1,
                jozz: Some(1),
                words: vec!["بِسْمِ".into(), "اللَّهِ".into()],
            },
            VerseInput {
                id: 2,
                sura_no: 1,
                page: 1,
                jozz: Some(1),
                words: vec!["الرَّحْمَٰنِ".into(), "الرَّحِيمِ".into()],
            },
            VerseInput {
                id: 3,
                sura_no: 1,
                page: 2,
                jozz: Some(1),
                words: vec!["مَالِكِ".into(), "يَوْمِ".into(), "الدِّينِ".into()],
            },
        ]
    }

    #[test]
    fn build_assigns_dense_global_indices() {
        let idx = ReferenceIndex::build(&sample_verses()).unwrap();
        assert_eq!(idx.len(), 7);
        let all = idx.words_in_range(0, 7);
        for (i, w) in all.iter().enumerate() {
            assert_eq!(w.global_index, i as u32);
        }
    }

    #[test]
    fn page_ranges_cover_their_verses() {
        let idx = ReferenceIndex::build(&sample_verses()).unwrap();
        assert_eq!(idx.range_for_page(1), Some((0, 4)));
        assert_eq!(idx.range_for_page(2), Some((4, 7)));
        assert_eq!(idx.range_for_page(99), None);
    }

    #[test]
    fn empty_corpus_is_an_error() {
        assert!(ReferenceIndex::build(&[]).is_err());
    }

    #[test]
    fn words_in_range_clips_to_bounds() {
        let idx = ReferenceIndex::build(&sample_verses()).unwrap();
        assert_eq!(idx.words_in_range(5, 100).len(), 2);
        assert_eq!(idx.words_in_range(10, 20).len(), 0);
    }

    #[test]
    fn search_window_tracking_is_clipped_to_page() {
        let idx = ReferenceIndex::build(&sample_verses()).unwrap();
        let (lo, hi) = idx.search_window(1, super::super::align::Mode::Tracking, Some(1), 3, 1);
        assert_eq!((lo, hi), (0, 4));
    }

    #[test]
    fn search_window_search_mode_is_whole_page() {
        let idx = ReferenceIndex::build(&sample_verses()).unwrap();
        let (lo, hi) = idx.search_window(1, super::super::align::Mode::Search, Some(2), 3, 1);
        assert_eq!((lo, hi), (4, 7));
    }
}
