//! End-to-end pipeline runs against stub caption and generation services.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use lecture_scribe::compile::CompileOutcome;
use lecture_scribe::config::Config;
use lecture_scribe::llm::{GenerationRequest, LlmError, TextGenerator};
use lecture_scribe::notes::{GenerationError, SubjectCategory};
use lecture_scribe::output::OutputLayout;
use lecture_scribe::pipeline::{CompileStatus, NotesPipeline, PipelineError, RunOptions};
use lecture_scribe::transcript::{CaptionRecord, CaptionSource, FetchError};

const URL: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";

const DOCUMENT: &str = "\\documentclass{article}\n\\usepackage{siunitx}\n\\begin{document}\n\\section{Kinematics}\nA car moves at \\SI{20}{\\metre\\per\\second}.\n\\end{document}";

struct StubCaptions {
    records: Vec<CaptionRecord>,
}

impl StubCaptions {
    fn from_texts(texts: &[&str]) -> Box<Self> {
        let records = texts
            .iter()
            .enumerate()
            .map(|(i, text)| CaptionRecord {
                text: text.to_string(),
                start: i as f64 * 2.0,
                duration: 2.0,
            })
            .collect();
        Box::new(Self { records })
    }
}

#[async_trait]
impl CaptionSource for StubCaptions {
    async fn captions(&self, _video_id: &str) -> Result<Vec<CaptionRecord>, FetchError> {
        Ok(self.records.clone())
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

/// Answers each pipeline request by recognising its prompt.
struct ScriptedGenerator {
    subject: &'static str,
    refine_fails: bool,
    refine_refuses: bool,
    notes_fail: bool,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedGenerator {
    fn new(subject: &'static str) -> Arc<Self> {
        Arc::new(Self {
            subject,
            refine_fails: false,
            refine_refuses: false,
            notes_fail: false,
            requests: Mutex::new(Vec::new()),
        })
    }

    fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, LlmError> {
        self.requests.lock().unwrap().push(request.clone());

        if request.prompt.starts_with("You are an expert academic editor") {
            if self.refine_fails {
                return Err(LlmError::RequestFailed("HTTP 503".into()));
            }
            if self.refine_refuses {
                return Ok("I cannot help with that.".to_string());
            }
            let raw = request.prompt.rsplit("Raw transcript:\n").next().unwrap_or_default();
            return Ok(format!("Refined. {}", raw));
        }

        if request.prompt.starts_with("Classify the main subject") {
            return Ok(self.subject.to_string());
        }

        if self.notes_fail {
            return Err(LlmError::RequestFailed("HTTP 500".into()));
        }
        Ok(format!("```latex\n{}\n```", DOCUMENT))
    }
}

fn test_config() -> Config {
    let mut config = Config::default();
    config.app.show_progress = false;
    config
}

fn long_lecture() -> Box<StubCaptions> {
    let sentence = "lecture content about velocity, acceleration and forces";
    StubCaptions::from_texts(&[sentence; 6])
}

#[tokio::test]
async fn physics_lecture_produces_physics_notes() {
    let dir = tempfile::tempdir().unwrap();
    let layout = OutputLayout::new(dir.path().join("out"));
    let llm = ScriptedGenerator::new("Physics");

    let pipeline = NotesPipeline::with_services(test_config(), long_lecture(), llm.clone());
    let options = RunOptions {
        compile: false,
        subject: None,
    };
    let summary = pipeline.run(URL, &layout, &options).await.unwrap();

    assert_eq!(summary.subject, SubjectCategory::Physics);
    assert_eq!(summary.compile, CompileStatus::Skipped);
    assert!(summary.artifact.is_none());

    let requests = llm.requests();
    assert_eq!(requests.len(), 3);
    assert_eq!(requests[0].temperature, 0.3);
    assert_eq!(requests[1].temperature, 0.0);
    assert!(requests[2].prompt.contains("siunitx"));
    assert_eq!(requests[2].temperature, 1.0);

    let source = std::fs::read_to_string(&layout.source).unwrap();
    assert!(source.starts_with("\\documentclass"));
    assert!(source.ends_with("\\end{document}"));
    assert!(!source.contains("```"));

    let transcript = std::fs::read_to_string(&layout.transcript).unwrap();
    assert!(transcript.starts_with("Refined. lecture content"));
}

#[tokio::test]
async fn short_transcript_fails_fast() {
    let dir = tempfile::tempdir().unwrap();
    let layout = OutputLayout::new(dir.path());
    let llm = ScriptedGenerator::new("Physics");
    let captions = StubCaptions::from_texts(&["a".repeat(24).as_str(), "b".repeat(25).as_str()]);

    let pipeline = NotesPipeline::with_services(test_config(), captions, llm.clone());
    let err = pipeline
        .run(URL, &layout, &RunOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PipelineError::TranscriptTooShort { length: 50, min: 200 }
    ));
    assert!(llm.requests().is_empty());
    assert!(!layout.source.exists());
    assert!(!layout.artifact.exists());
    assert!(layout.transcript.is_file());
}

#[tokio::test]
async fn malformed_url_is_reported_by_kind() {
    let dir = tempfile::tempdir().unwrap();
    let layout = OutputLayout::new(dir.path());
    let llm = ScriptedGenerator::new("Physics");

    let pipeline = NotesPipeline::with_services(test_config(), long_lecture(), llm.clone());
    let err = pipeline
        .run("https://example.com/not-a-video", &layout, &RunOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Transcript(FetchError::InvalidUrl(_))));
    assert!(llm.requests().is_empty());
    assert!(!layout.transcript.exists());
}

#[tokio::test]
async fn refinement_failure_keeps_raw_transcript() {
    let dir = tempfile::tempdir().unwrap();
    let layout = OutputLayout::new(dir.path());
    let llm = Arc::new(ScriptedGenerator {
        subject: "General",
        refine_fails: true,
        refine_refuses: false,
        notes_fail: false,
        requests: Mutex::new(Vec::new()),
    });

    let pipeline = NotesPipeline::with_services(test_config(), long_lecture(), llm.clone());
    let options = RunOptions {
        compile: false,
        subject: None,
    };
    let summary = pipeline.run(URL, &layout, &options).await.unwrap();

    let transcript = std::fs::read_to_string(&layout.transcript).unwrap();
    assert!(transcript.starts_with("lecture content about velocity"));
    assert_eq!(summary.subject, SubjectCategory::General);
    assert!(layout.source.is_file());
}

#[tokio::test]
async fn short_refinement_falls_back_to_raw_transcript() {
    let dir = tempfile::tempdir().unwrap();
    let layout = OutputLayout::new(dir.path());
    let llm = Arc::new(ScriptedGenerator {
        subject: "Physics",
        refine_fails: false,
        refine_refuses: true,
        notes_fail: false,
        requests: Mutex::new(Vec::new()),
    });

    let pipeline = NotesPipeline::with_services(test_config(), long_lecture(), llm.clone());
    let options = RunOptions {
        compile: false,
        subject: None,
    };
    let summary = pipeline.run(URL, &layout, &options).await.unwrap();

    let transcript = std::fs::read_to_string(&layout.transcript).unwrap();
    assert!(transcript.starts_with("lecture content about velocity"));
    assert!(!transcript.contains("I cannot help"));
    assert!(summary.transcript_chars >= 200);

    let requests = llm.requests();
    assert_eq!(requests.len(), 3);
    assert!(requests[1].prompt.contains("lecture content about velocity"));
    assert!(requests[2].prompt.ends_with(transcript.as_str()));
}

#[tokio::test]
async fn generation_failure_is_fatal_but_transcript_is_kept() {
    let dir = tempfile::tempdir().unwrap();
    let layout = OutputLayout::new(dir.path());
    let llm = Arc::new(ScriptedGenerator {
        subject: "Math",
        refine_fails: false,
        refine_refuses: false,
        notes_fail: true,
        requests: Mutex::new(Vec::new()),
    });

    let pipeline = NotesPipeline::with_services(test_config(), long_lecture(), llm);
    let err = pipeline
        .run(URL, &layout, &RunOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Generation(GenerationError::Service(_))));
    assert!(layout.transcript.is_file());
    assert!(!layout.source.exists());
}

#[tokio::test]
async fn subject_override_skips_classification() {
    let dir = tempfile::tempdir().unwrap();
    let layout = OutputLayout::new(dir.path());
    let llm = ScriptedGenerator::new("Physics");

    let pipeline = NotesPipeline::with_services(test_config(), long_lecture(), llm.clone());
    let options = RunOptions {
        compile: false,
        subject: Some(SubjectCategory::Chemistry),
    };
    let summary = pipeline.run(URL, &layout, &options).await.unwrap();

    assert_eq!(summary.subject, SubjectCategory::Chemistry);
    let requests = llm.requests();
    assert_eq!(requests.len(), 2);
    assert!(requests[1].prompt.contains("mhchem"));
}

#[tokio::test]
async fn missing_compiler_leaves_no_stale_pdf() {
    let dir = tempfile::tempdir().unwrap();
    let layout = OutputLayout::new(dir.path());
    std::fs::write(&layout.artifact, b"%PDF old run").unwrap();

    let mut config = test_config();
    config.compiler.command = "no-such-latex-compiler".to_string();

    let pipeline = NotesPipeline::with_services(config, long_lecture(), ScriptedGenerator::new("Physics"));
    let summary = pipeline
        .run(URL, &layout, &RunOptions::default())
        .await
        .unwrap();

    assert!(matches!(
        summary.compile,
        CompileStatus::Attempted(CompileOutcome::ToolMissing { .. })
    ));
    assert!(summary.artifact.is_none());
    assert!(!layout.artifact.exists());
    assert!(layout.source.is_file());
}

#[cfg(unix)]
#[tokio::test]
async fn compiled_artifact_is_reported() {
    use std::os::unix::fs::PermissionsExt;

    let tools = tempfile::tempdir().unwrap();
    let script = tools.path().join("fake-pdflatex");
    std::fs::write(
        &script,
        "#!/bin/sh\nfor arg in \"$@\"; do file=\"$arg\"; done\nbase=\"${file%.tex}\"\ntouch \"$base.aux\" \"$base.log\"\nprintf '%%PDF-1.4 fake' > \"$base.pdf\"\n",
    )
    .unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let layout = OutputLayout::new(dir.path());
    let mut config = test_config();
    config.compiler.command = script.to_string_lossy().into_owned();

    let pipeline = NotesPipeline::with_services(config, long_lecture(), ScriptedGenerator::new("Physics"));
    let summary = pipeline
        .run(URL, &layout, &RunOptions::default())
        .await
        .unwrap();

    assert_eq!(summary.artifact.as_deref(), Some(layout.artifact.as_path()));
    assert!(std::fs::metadata(&layout.artifact).unwrap().len() > 0);
    assert!(!dir.path().join("lecture_notes.aux").exists());
    assert!(!dir.path().join("lecture_notes.log").exists());
}
