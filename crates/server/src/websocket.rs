//! WebSocket transport (A4): binds the inbound/outbound events of §6 onto
//! the chunk pipeline.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    response::Response,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};

use crate::state::AppState;
use quran_track_pipeline::process_chunk;

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundEvent {
    AudioChunk {
        data: String,
        #[serde(default)]
        current_page: Option<u32>,
    },
    ResetProgress,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundEvent {
    SessionInfo {
        session_id: String,
    },
    WordResult {
        aya_id: u32,
        word_index: u16,
        is_correct: bool,
        similarity: f32,
        alignment_type: quran_track_core::AlignmentType,
        spoken_word: String,
        expected_word: Option<String>,
    },
    ChunkDone {
        global_progress: u32,
        confidence: f32,
        mode: quran_track_core::Mode,
        segment_score: f32,
        matches_count: usize,
        processing_time: u64,
    },
    Error {
        error: String,
        message: String,
    },
}

pub struct WebSocketHandler;

impl WebSocketHandler {
    pub async fn handle(
        ws: WebSocketUpgrade,
        State(state): State<AppState>,
        Path(session_id): Path<String>,
    ) -> Response {
        ws.on_upgrade(move |socket| Self::handle_socket(socket, state, session_id))
    }

    async fn handle_socket(socket: WebSocket, state: AppState, session_id: String) {
        let (mut sender, mut receiver) = socket.split();

        let _ = sender
            .send(Message::Text(
                serde_json::to_string(&OutboundEvent::SessionInfo {
                    session_id: session_id.clone(),
                })
                .expect("OutboundEvent always serializes"),
            ))
            .await;

        tracing::info!(session_id = %session_id, "websocket session open");

        // §7 session_missing: unknown ids are created lazily on first use.
        let session = state.sessions.get_or_create(&session_id);

        while let Some(Ok(msg)) = receiver.next().await {
            let text = match msg {
                Message::Text(t) => t,
                Message::Close(_) => break,
                Message::Ping(_) | Message::Pong(_) | Message::Binary(_) => continue,
            };

            let event: InboundEvent = match serde_json::from_str(&text) {
                Ok(e) => e,
                Err(e) => {
                    let _ = send_error(&mut sender, "invalid_request", &e.to_string()).await;
                    continue;
                }
            };

            match event {
                InboundEvent::ResetProgress => {
                    session.touch();
                    session.state.lock().await.reset_progress();
                }
                InboundEvent::AudioChunk { data, current_page } => {
                    session.touch();
                    let container_bytes = match BASE64.decode(data.as_bytes()) {
                        Ok(b) => b,
                        Err(e) => {
                            let _ =
                                send_error(&mut sender, "invalid_request", &e.to_string()).await;
                            continue;
                        }
                    };

                    let config = state.alignment_config();
                    let mut session_state = session.state.lock().await;
                    let outcome = process_chunk(
                        &mut session_state,
                        &container_bytes,
                        current_page,
                        &state.reference_index,
                        &config,
                        state.decoder.as_ref(),
                        state.transcriber.as_ref(),
                    )
                    .await;
                    drop(session_state);

                    match outcome {
                        Ok(outcome) => {
                            for m in &outcome.alignment.matches {
                                if let Some(expected) = &m.quran_word {
                                    let event = OutboundEvent::WordResult {
                                        aya_id: expected.verse_id,
                                        word_index: expected.word_index_in_verse,
                                        is_correct: m.is_correct,
                                        similarity: m.similarity,
                                        alignment_type: m.alignment_type,
                                        spoken_word: m.spoken_word.clone(),
                                        expected_word: Some(expected.text_raw.clone()),
                                    };
                                    let _ = send(&mut sender, &event).await;
                                }
                            }
                            let done = OutboundEvent::ChunkDone {
                                global_progress: outcome.global_progress,
                                confidence: outcome.alignment.confidence,
                                mode: outcome.mode,
                                segment_score: outcome.alignment.segment_score,
                                matches_count: outcome.alignment.matches.len(),
                                processing_time: outcome.audio_processing_ms
                                    + outcome.transcription_ms,
                            };
                            let _ = send(&mut sender, &done).await;
                        }
                        Err(err) => {
                            let (kind, message) = classify_pipeline_error(&err);
                            tracing::warn!(session_id = %session_id, error = %err, "chunk processing failed");
                            let _ = send_error(&mut sender, kind, &message).await;
                        }
                    }
                }
            }
        }

        state.sessions.remove(&session_id);
        tracing::info!(session_id = %session_id, "websocket session closed");
    }
}

fn classify_pipeline_error(err: &quran_track_pipeline::PipelineError) -> (&'static str, String) {
    use quran_track_pipeline::PipelineError;
    match err {
        PipelineError::DecodeFailed(m) => ("audio_conversion_failed", m.clone()),
        PipelineError::TranscribeFailed(m) => ("transcription_failed", m.clone()),
        PipelineError::NoSpeech => ("no_speech", "no speech detected in chunk".to_string()),
        PipelineError::Http(m) => ("asr_error", m.clone()),
    }
}

async fn send(
    sender: &mut futures::stream::SplitSink<WebSocket, Message>,
    event: &OutboundEvent,
) -> Result<(), axum::Error> {
    sender
        .send(Message::Text(
            serde_json::to_string(event).expect("OutboundEvent always serializes"),
        ))
        .await
}

async fn send_error(
    sender: &mut futures::stream::SplitSink<WebSocket, Message>,
    error: &str,
    message: &str,
) -> Result<(), axum::Error> {
    send(
        sender,
        &OutboundEvent::Error {
            error: error.to_string(),
            message: message.to_string(),
        },
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audio_chunk_event_parses() {
        let json = r#"{"type":"audio_chunk","data":"AAAA","current_page":3}"#;
        let event: InboundEvent = serde_json::from_str(json).unwrap();
        match event {
            InboundEvent::AudioChunk { data, current_page } => {
                assert_eq!(data, "AAAA");
                assert_eq!(current_page, Some(3));
            }
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn reset_progress_event_parses() {
        let json = r#"{"type":"reset_progress"}"#;
        let event: InboundEvent = serde_json::from_str(json).unwrap();
        assert!(matches!(event, InboundEvent::ResetProgress));
    }

    #[test]
    fn outbound_events_serialize_with_snake_case_tag() {
        let event = OutboundEvent::ChunkDone {
            global_progress: 4,
            confidence: 0.9,
            mode: quran_track_core::Mode::Tracking,
            segment_score: 0.9,
            matches_count: 4,
            processing_time: 120,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""type":"chunk_done""#));
    }
}
