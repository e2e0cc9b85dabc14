//! Lecture Scribe - turn recorded lectures into typeset lecture notes
//!
//! The library fetches a video's captions, rewrites them into clean prose,
//! classifies the lecture's subject, generates subject-specific LaTeX with a
//! generative text service and compiles it into a PDF.

pub mod cli;
pub mod compile;
pub mod config;
pub mod llm;
pub mod notes;
pub mod output;
pub mod pipeline;
pub mod transcript;
pub mod utils;

pub use cli::{Cli, Commands};
pub use config::Config;
pub use llm::{GenerationRequest, LlmError, TextGenerator};
pub use notes::SubjectCategory;
pub use pipeline::{NotesPipeline, PipelineError, RunOptions, RunSummary};
pub use transcript::{extract_video_id, CaptionRecord, CaptionSource, FetchError, Transcript};

/// Result type used for application glue
pub type Result<T> = anyhow::Result<T>;
