use anyhow::Context;
use indicatif::{ProgressBar, ProgressStyle};
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::compile::{CompileOutcome, DocumentCompiler};
use crate::config::Config;
use crate::llm::{GeminiClient, TextGenerator};
use crate::notes::{GenerationError, NotesGenerator, ProseRefiner, SubjectCategory, SubjectClassifier};
use crate::output::{OutputLayout, BASE_NAME};
use crate::transcript::{CaptionSource, FetchError, Transcript, TranscriptFetcher, YtDlpCaptionSource};

/// Process exit status for a fatal pipeline error
pub const EXIT_FATAL: u8 = 2;

/// Process exit status after Ctrl-C
pub const EXIT_INTERRUPTED: u8 = 130;

/// Errors that end a run
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("Could not fetch transcript: {0}")]
    Transcript(#[from] FetchError),

    #[error("Transcript is too short or empty ({length} chars, need at least {min})")]
    TranscriptTooShort { length: usize, min: usize },

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error("Failed to write output: {0}")]
    Io(#[from] std::io::Error),
}

/// Whether compilation ran
#[derive(Debug, Clone, PartialEq)]
pub enum CompileStatus {
    Skipped,
    Attempted(CompileOutcome),
}

/// Per-run options
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Compile the document source into a PDF
    pub compile: bool,

    /// Skip classification and use this subject
    pub subject: Option<SubjectCategory>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            compile: true,
            subject: None,
        }
    }
}

/// What a successful run produced
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub layout: OutputLayout,
    pub subject: SubjectCategory,
    pub transcript_chars: usize,
    pub compile: CompileStatus,
    /// Present only when this run's compilation produced the PDF
    pub artifact: Option<PathBuf>,
    pub elapsed: Duration,
}

/// Lecture URL to notes pipeline: fetch, refine, generate, compile
pub struct NotesPipeline {
    config: Config,
    fetcher: TranscriptFetcher,
    refiner: ProseRefiner,
    generator: NotesGenerator,
    compiler: DocumentCompiler,
}

impl NotesPipeline {
    /// Create a pipeline backed by yt-dlp and the Gemini API
    pub fn new(config: Config, api_key: &str) -> anyhow::Result<Self> {
        let llm = GeminiClient::new(&config.llm, api_key)
            .context("Failed to create generation client")?;
        let source = YtDlpCaptionSource::new(&config.transcript);

        Ok(Self::with_services(config, Box::new(source), Arc::new(llm)))
    }

    /// Create a pipeline with explicit collaborators
    pub fn with_services(
        config: Config,
        source: Box<dyn CaptionSource>,
        llm: Arc<dyn TextGenerator>,
    ) -> Self {
        let classifier = SubjectClassifier::new(
            llm.clone(),
            config.llm.classify_temperature,
            config.transcript.classify_prefix_chars,
        );

        Self {
            fetcher: TranscriptFetcher::new(source),
            refiner: ProseRefiner::new(llm.clone(), config.llm.refine_temperature),
            generator: NotesGenerator::new(llm, classifier, config.llm.notes_temperature),
            compiler: DocumentCompiler::new(&config.compiler),
            config,
        }
    }

    /// Run every stage in order, writing results into `layout`
    pub async fn run(
        &self,
        url: &str,
        layout: &OutputLayout,
        options: &RunOptions,
    ) -> Result<RunSummary, PipelineError> {
        let started = Instant::now();
        fs_err::create_dir_all(&layout.dir)?;

        tracing::info!("Fetching transcript...");
        let transcript = self
            .with_spinner("Fetching captions...", self.fetcher.fetch(url))
            .await?;

        let length = transcript.char_len();
        let min = self.config.transcript.min_chars;
        tracing::debug!("Transcript length: {} chars", length);

        if !transcript.is_usable(min) {
            fs_err::write(&layout.transcript, transcript.text())?;
            return Err(PipelineError::TranscriptTooShort { length, min });
        }

        tracing::info!("Refining transcript...");
        let video_id = transcript.video_id().to_string();
        let raw = transcript.into_text();
        let refined = self
            .with_spinner("Refining transcript...", self.refiner.refine(raw.clone()))
            .await;

        // Generation input must meet the same floor as the captions
        let refined = Transcript::new(video_id, refined);
        let refined = if refined.is_usable(min) {
            refined.into_text()
        } else {
            tracing::warn!(
                "Refined transcript is too short ({} chars), using the raw captions",
                refined.char_len()
            );
            raw
        };
        let length = refined.trim().chars().count();

        fs_err::write(&layout.transcript, &refined)?;
        tracing::info!("Saved transcript → {}", layout.transcript.display());

        tracing::info!("Generating formatted lecture notes...");
        let notes = self
            .with_spinner("Generating LaTeX notes...", self.generator.generate(&refined, options.subject))
            .await?;

        fs_err::write(&layout.source, notes.source.as_str())?;
        tracing::info!("LaTeX file created → {}", layout.source.display());

        let compile = if options.compile {
            if layout.artifact.exists() {
                fs_err::remove_file(&layout.artifact)?;
            }

            tracing::info!(
                "Compiling PDF with {} (this may take a few seconds)...",
                self.compiler.command()
            );
            let outcome = self
                .with_spinner(
                    "Compiling PDF...",
                    self.compiler.compile(notes.source.as_str(), BASE_NAME, &layout.dir),
                )
                .await;
            outcome.report();
            CompileStatus::Attempted(outcome)
        } else {
            tracing::info!("Skipping PDF compilation");
            CompileStatus::Skipped
        };

        let artifact = match compile {
            CompileStatus::Attempted(_) if layout.artifact.is_file() => Some(layout.artifact.clone()),
            CompileStatus::Attempted(_) => {
                tracing::warn!("PDF compilation finished but output file not found");
                None
            }
            CompileStatus::Skipped => None,
        };

        Ok(RunSummary {
            layout: layout.clone(),
            subject: notes.subject,
            transcript_chars: length,
            compile,
            artifact,
            elapsed: started.elapsed(),
        })
    }

    /// Await `future` behind a spinner unless progress output is disabled
    async fn with_spinner<F: Future>(&self, message: &'static str, future: F) -> F::Output {
        let progress = if self.config.app.show_progress {
            let progress = ProgressBar::new_spinner();
            progress.set_style(
                ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            progress.enable_steady_tick(Duration::from_millis(120));
            progress
        } else {
            ProgressBar::hidden()
        };

        progress.set_message(message);
        let output = future.await;
        progress.finish_and_clear();
        output
    }
}
