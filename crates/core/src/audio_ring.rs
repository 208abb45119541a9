//! Audio Ring (C7): a bounded sliding buffer of decoded WAV chunks.

/// Size of a canonical RIFF/WAVE header, stripped from every chunk after the
/// first when concatenating (§4.7). Assumes all chunks share one PCM format.
const WAV_HEADER_BYTES: usize = 44;

#[derive(Debug, Clone)]
struct Chunk {
    wav: Vec<u8>,
    duration_secs: f32,
}

#[derive(Debug, Clone)]
pub struct AudioRing {
    chunks: Vec<Chunk>,
    total_duration: f32,
    max_duration: f32,
}

impl AudioRing {
    pub fn new(max_duration_secs: f32) -> Self {
        Self {
            chunks: Vec::new(),
            total_duration: 0.0,
            max_duration: max_duration_secs,
        }
    }

    /// Append a decoded chunk, then evict from the front until the ring is
    /// back under the cap — but never evict the sole remaining chunk.
    pub fn push(&mut self, wav: Vec<u8>, duration_secs: f32) {
        self.chunks.push(Chunk { wav, duration_secs });
        self.total_duration += duration_secs;

        while self.total_duration > self.max_duration && self.chunks.len() > 1 {
            let evicted = self.chunks.remove(0);
            self.total_duration -= evicted.duration_secs;
        }
    }

    pub fn total_duration(&self) -> f32 {
        self.total_duration
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn clear(&mut self) {
        self.chunks.clear();
        self.total_duration = 0.0;
    }

    /// Concatenate the ring into one WAV byte stream: the first chunk in
    /// full, subsequent chunks with their header stripped (§4.7).
    pub fn concatenate(&self) -> Vec<u8> {
        match self.chunks.split_first() {
            None => Vec::new(),
            Some((first, rest)) => {
                let mut out = first.wav.clone();
                for chunk in rest {
                    if chunk.wav.len() > WAV_HEADER_BYTES {
                        out.extend_from_slice(&chunk.wav[WAV_HEADER_BYTES..]);
                    }
                }
                out
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fake_wav(sample_bytes: usize) -> Vec<u8> {
        let mut v = vec![0u8; WAV_HEADER_BYTES];
        v.extend(vec![1u8; sample_bytes]);
        v
    }

    #[test]
    fn single_chunk_is_never_evicted() {
        let mut ring = AudioRing::new(1.0);
        ring.push(fake_wav(10), 5.0);
        assert_eq!(ring.chunk_count(), 1);
        assert_eq!(ring.total_duration(), 5.0);
    }

    #[test]
    fn evicts_oldest_chunks_over_cap() {
        let mut ring = AudioRing::new(4.0);
        ring.push(fake_wav(10), 2.0);
        ring.push(fake_wav(10), 2.0);
        ring.push(fake_wav(10), 2.0);
        assert!(ring.total_duration() <= 4.0);
        assert_eq!(ring.chunk_count(), 2);
    }

    #[test]
    fn concatenate_strips_headers_after_first() {
        let mut ring = AudioRing::new(100.0);
        ring.push(fake_wav(4), 2.0);
        ring.push(fake_wav(6), 2.0);
        let combined = ring.concatenate();
        // first chunk (44 + 4) + second chunk's data only (6)
        assert_eq!(combined.len(), WAV_HEADER_BYTES + 4 + 6);
    }

    #[test]
    fn concatenate_empty_ring_is_empty() {
        let ring = AudioRing::new(8.0);
        assert!(ring.concatenate().is_empty());
    }

    #[test]
    fn clear_resets_duration_and_chunks() {
        let mut ring = AudioRing::new(8.0);
        ring.push(fake_wav(10), 3.0);
        ring.clear();
        assert_eq!(ring.chunk_count(), 0);
        assert_eq!(ring.total_duration(), 0.0);
    }
}
