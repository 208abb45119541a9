//! Chunk Pipeline (C8): header-patch -> decode -> append -> transcribe ->
//! align -> update session, in that order, for one incoming audio chunk.

use crate::decoder::Decoder;
use crate::error::{PipelineError, Result};
use crate::transcriber::Transcriber;
use quran_track_core::{align, normalize, tokenize, AlignmentConfig, AlignmentResult, ReferenceIndex, SessionState};
use std::time::Instant;

/// Everything the transport layer needs to emit `word_result`/`chunk_done`
/// for one processed chunk (§6).
#[derive(Debug, Clone)]
pub struct ChunkOutcome {
    pub alignment: AlignmentResult,
    pub mode: quran_track_core::Mode,
    pub global_progress: u32,
    pub audio_processing_ms: u64,
    pub transcription_ms: u64,
}

/// Run one chunk through the full pipeline against `session`, mutating its
/// state in place per §4.6/§4.8. Returns the per-chunk outcome, or the
/// per-chunk failure kind (§7) that leaves `session` untouched.
pub async fn process_chunk(
    session: &mut SessionState,
    container_bytes: &[u8],
    page: Option<u32>,
    reference_index: &ReferenceIndex,
    config: &AlignmentConfig,
    decoder: &dyn Decoder,
    transcriber: &dyn Transcriber,
) -> Result<ChunkOutcome> {
    let to_decode = match &session.codec_header {
        None => {
            let header_len = config.codec_header_bytes.min(container_bytes.len());
            session.codec_header = Some(container_bytes[..header_len].to_vec());
            container_bytes.to_vec()
        }
        Some(header) => {
            let mut patched = header.clone();
            patched.extend_from_slice(container_bytes);
            patched
        }
    };

    let decode_start = Instant::now();
    let wav = decoder
        .decode(&to_decode)
        .await
        .map_err(|e| PipelineError::DecodeFailed(e.to_string()))?;
    let audio_processing_ms = decode_start.elapsed().as_millis() as u64;

    session.audio_ring.push(wav, config.chunk_duration_secs);
    let cumulative_wav = session.audio_ring.concatenate();

    let transcribe_start = Instant::now();
    let transcript = transcriber
        .transcribe(&cumulative_wav)
        .await
        .map_err(|e| PipelineError::TranscribeFailed(e.to_string()))?;
    let transcription_ms = transcribe_start.elapsed().as_millis() as u64;

    let normalized = normalize(&transcript);
    let spoken_words = tokenize(&normalized);
    if spoken_words.is_empty() {
        return Err(PipelineError::NoSpeech);
    }

    let result = align(
        &spoken_words,
        reference_index,
        session.global_word_pos,
        session.mode,
        page,
        config,
    );
    session.apply_alignment_result(&result, config);

    Ok(ChunkOutcome {
        global_progress: session.global_word_pos,
        mode: session.mode,
        alignment: result,
        audio_processing_ms,
        transcription_ms,
    })
}
