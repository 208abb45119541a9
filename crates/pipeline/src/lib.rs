//! Orchestration around the alignment core: the external Transcriber and
//! Decoder collaborators (§6) and the per-chunk pipeline that strings them
//! together with the core's alignment engine (§4.8).

pub mod chunk_pipeline;
pub mod decoder;
pub mod error;
pub mod transcriber;

pub use chunk_pipeline::{process_chunk, ChunkOutcome};
pub use decoder::{Decoder, HttpDecoder};
pub use error::PipelineError;
pub use transcriber::{build_transcriber, HttpTranscriber, Transcriber};
