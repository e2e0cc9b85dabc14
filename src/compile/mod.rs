use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

use crate::config::CompilerConfig;
use crate::utils::tail_lines;

/// Number of output lines kept from a failed compiler run
const DIAGNOSTIC_LINES: usize = 20;

/// Result of a compilation attempt. Compilation never returns an error;
/// every outcome is reported through this type.
#[derive(Debug, Clone, PartialEq)]
pub enum CompileOutcome {
    /// The source file could not be written
    SourceNotWritten { reason: String },

    /// The compiler executable is not installed
    ToolMissing { tool: String },

    /// The compiler exited with a failure status
    Failed { pass: u32, diagnostic: String },

    /// The compiler succeeded but produced no PDF
    NotCreated,

    /// The PDF exists; listed byproducts were removed
    Created { artifact: PathBuf, removed: Vec<PathBuf> },
}

impl CompileOutcome {
    pub fn artifact(&self) -> Option<&Path> {
        match self {
            CompileOutcome::Created { artifact, .. } => Some(artifact),
            _ => None,
        }
    }

    /// Log the outcome with actionable detail
    pub fn report(&self) {
        match self {
            CompileOutcome::SourceNotWritten { reason } => {
                tracing::error!("Could not write LaTeX source: {}", reason);
            }
            CompileOutcome::ToolMissing { tool } => {
                tracing::error!(
                    "{} not found. Please install LaTeX (TeX Live / MiKTeX / MacTeX): \
                     https://www.tug.org/texlive/ or https://miktex.org/",
                    tool
                );
            }
            CompileOutcome::Failed { pass, diagnostic } => {
                tracing::error!("LaTeX compilation failed on pass {}. Last output:\n{}", pass, diagnostic);
            }
            CompileOutcome::NotCreated => {
                tracing::warn!("Compilation finished but the PDF was not created");
            }
            CompileOutcome::Created { artifact, removed } => {
                tracing::info!("PDF saved as: {}", artifact.display());
                tracing::debug!("Removed {} build byproducts", removed.len());
            }
        }
    }
}

/// Runs a LaTeX compiler a fixed number of passes over a document
pub struct DocumentCompiler {
    command: String,
    passes: u32,
    byproduct_extensions: Vec<String>,
}

impl DocumentCompiler {
    pub fn new(config: &CompilerConfig) -> Self {
        Self {
            command: config.command.clone(),
            passes: config.passes,
            byproduct_extensions: config.byproduct_extensions.clone(),
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    /// Write `source` to `<dir>/<name>.tex` and compile it into `<dir>/<name>.pdf`
    pub async fn compile(&self, source: &str, name: &str, dir: &Path) -> CompileOutcome {
        let tex_name = format!("{}.tex", name);

        if let Err(e) = fs_err::create_dir_all(dir).and_then(|_| fs_err::write(dir.join(&tex_name), source)) {
            return CompileOutcome::SourceNotWritten {
                reason: e.to_string(),
            };
        }

        for pass in 1..=self.passes {
            tracing::debug!("Running {} pass {}/{}", self.command, pass, self.passes);

            let output = Command::new(&self.command)
                .arg("-interaction=nonstopmode")
                .arg(&tex_name)
                .current_dir(dir)
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .output()
                .await;

            let output = match output {
                Ok(output) => output,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    return CompileOutcome::ToolMissing {
                        tool: self.command.clone(),
                    };
                }
                Err(e) => {
                    return CompileOutcome::Failed {
                        pass,
                        diagnostic: e.to_string(),
                    };
                }
            };

            if !output.status.success() {
                let combined = format!(
                    "{}{}",
                    String::from_utf8_lossy(&output.stdout),
                    String::from_utf8_lossy(&output.stderr)
                );
                return CompileOutcome::Failed {
                    pass,
                    diagnostic: tail_lines(&combined, DIAGNOSTIC_LINES),
                };
            }
        }

        let artifact = dir.join(format!("{}.pdf", name));
        if !artifact.is_file() {
            return CompileOutcome::NotCreated;
        }

        let removed = self.remove_byproducts(name, dir);
        CompileOutcome::Created { artifact, removed }
    }

    fn remove_byproducts(&self, name: &str, dir: &Path) -> Vec<PathBuf> {
        self.byproduct_extensions
            .iter()
            .map(|ext| dir.join(format!("{}.{}", name, ext.trim_start_matches('.'))))
            .filter(|path| path.exists())
            .filter(|path| match fs_err::remove_file(path) {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!("Could not remove build file: {}", e);
                    false
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compiler(command: &str) -> DocumentCompiler {
        DocumentCompiler::new(&CompilerConfig {
            command: command.to_string(),
            ..CompilerConfig::default()
        })
    }

    #[cfg(unix)]
    fn write_script(dir: &Path, body: &str) -> String {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("fake-latex.sh");
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[tokio::test]
    async fn test_missing_tool() {
        let dir = tempfile::tempdir().unwrap();
        let outcome = compiler("definitely-not-a-latex-binary")
            .compile("\\documentclass{article}", "notes", dir.path())
            .await;

        assert_eq!(
            outcome,
            CompileOutcome::ToolMissing {
                tool: "definitely-not-a-latex-binary".to_string()
            }
        );
        assert!(dir.path().join("notes.tex").is_file());
        assert!(outcome.artifact().is_none());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_two_passes_and_byproduct_cleanup() {
        let tools = tempfile::tempdir().unwrap();
        let script = write_script(
            tools.path(),
            r#"for arg in "$@"; do file="$arg"; done
base="${file%.tex}"
echo pass >> passes.count
touch "$base.aux" "$base.log" "$base.toc"
printf '%%PDF-1.4\n' > "$base.pdf""#,
        );

        let dir = tempfile::tempdir().unwrap();
        let outcome = compiler(&script).compile("source", "lecture_notes", dir.path()).await;

        let artifact = dir.path().join("lecture_notes.pdf");
        assert_eq!(outcome.artifact(), Some(artifact.as_path()));
        assert!(artifact.is_file());
        for ext in ["aux", "log", "toc"] {
            assert!(!dir.path().join(format!("lecture_notes.{}", ext)).exists());
        }

        let passes = std::fs::read_to_string(dir.path().join("passes.count")).unwrap();
        assert_eq!(passes.lines().count(), 2);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failure_reports_output_tail() {
        let tools = tempfile::tempdir().unwrap();
        let script = write_script(
            tools.path(),
            "echo 'This is pdfTeX'\necho '! Undefined control sequence.'\nexit 1",
        );

        let dir = tempfile::tempdir().unwrap();
        let outcome = compiler(&script).compile("source", "notes", dir.path()).await;

        match outcome {
            CompileOutcome::Failed { pass, diagnostic } => {
                assert_eq!(pass, 1);
                assert!(diagnostic.contains("Undefined control sequence"));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert!(!dir.path().join("notes.pdf").exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_success_without_pdf() {
        let tools = tempfile::tempdir().unwrap();
        let script = write_script(tools.path(), "touch notes.log\nexit 0");

        let dir = tempfile::tempdir().unwrap();
        let outcome = compiler(&script).compile("source", "notes", dir.path()).await;

        assert_eq!(outcome, CompileOutcome::NotCreated);
        assert!(dir.path().join("notes.log").exists());
    }

    #[tokio::test]
    async fn test_real_pdflatex_when_installed() {
        if !crate::utils::check_command_available("pdflatex").await {
            eprintln!("pdflatex not installed, skipping");
            return;
        }

        let dir = tempfile::tempdir().unwrap();
        let source = "\\documentclass{article}\n\\begin{document}\n\\tableofcontents\n\\section{Intro}\nHello.\n\\end{document}\n";
        let outcome = compiler("pdflatex").compile(source, "lecture_notes", dir.path()).await;

        assert!(outcome.artifact().is_some(), "outcome: {:?}", outcome);
        let mut names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, vec!["lecture_notes.pdf", "lecture_notes.tex"]);
        assert!(std::fs::metadata(dir.path().join("lecture_notes.pdf")).unwrap().len() > 0);
    }
}
