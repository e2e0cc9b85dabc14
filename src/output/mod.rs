use anyhow::Context;
use console::style;
use std::path::{Path, PathBuf};

use crate::pipeline::{CompileStatus, RunSummary};
use crate::transcript::extract_video_id;
use crate::utils::{format_duration, format_file_size};
use crate::Result;

/// File stem shared by the document source and the compiled PDF
pub const BASE_NAME: &str = "lecture_notes";

/// On-disk locations written by one run
#[derive(Debug, Clone, PartialEq)]
pub struct OutputLayout {
    pub dir: PathBuf,
    pub transcript: PathBuf,
    pub source: PathBuf,
    pub artifact: PathBuf,
}

impl OutputLayout {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            transcript: dir.join("transcript.txt"),
            source: dir.join(format!("{}.tex", BASE_NAME)),
            artifact: dir.join(format!("{}.pdf", BASE_NAME)),
            dir,
        }
    }

    /// Create the output directory if needed
    pub fn prepare(&self) -> Result<()> {
        fs_err::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create output directory {}", self.dir.display()))
    }
}

/// Pick the output directory: the requested one, else `lecture_<id>` under `base`
pub fn resolve_output_dir(requested: Option<PathBuf>, url: &str, base: &Path) -> PathBuf {
    if let Some(dir) = requested {
        return dir;
    }

    let folder = match extract_video_id(url) {
        Some(id) => format!("lecture_{}", id),
        None => format!(
            "lecture_{}_{}",
            chrono::Local::now().format("%Y%m%d_%H%M%S"),
            &uuid::Uuid::new_v4().simple().to_string()[..8]
        ),
    };

    base.join(folder)
}

/// Print the end-of-run summary
pub fn print_summary(summary: &RunSummary) {
    let rule = "═".repeat(72);
    println!();
    println!("{}", rule);
    println!("{:^72}", style("FINISHED SUCCESSFULLY").green().bold());
    println!("{}", rule);
    println!("  Folder:       {}", summary.layout.dir.display());
    println!("  Subject:      {}", summary.subject);
    println!("  Transcript:   {}", file_name(&summary.layout.transcript));
    println!("  LaTeX source: {}", file_name(&summary.layout.source));

    match (&summary.artifact, &summary.compile) {
        (Some(artifact), _) => {
            let size = fs_err::metadata(artifact).map(|m| m.len()).unwrap_or(0);
            println!("  Final PDF:    {} ({})", file_name(artifact), format_file_size(size));
        }
        (None, CompileStatus::Skipped) => {
            println!("  Final PDF:    {}", style("skipped (--no-pdf)").dim());
        }
        (None, CompileStatus::Attempted(_)) => {
            println!("  Final PDF:    {}", style("not produced, see log above").yellow());
        }
    }

    println!("  Elapsed:      {}", format_duration(summary.elapsed.as_secs_f64()));
    println!("{}", rule);
    println!();
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
