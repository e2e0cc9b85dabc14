use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::notes::SubjectCategory;

#[derive(Parser)]
#[command(
    name = "lecture-notes",
    about = "Lecture Scribe - Generate LaTeX + PDF lecture notes from YouTube lectures",
    version,
    long_about = "Fetches the captions of a YouTube lecture, rewrites them into clean prose, detects the subject and generates subject-tailored LaTeX notes, compiled to PDF with pdflatex."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Show only errors and the final summary
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file (default: ./config.yaml or the user config directory)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate lecture notes from a YouTube URL
    Generate {
        /// YouTube video URL
        #[arg(value_name = "URL")]
        url: String,

        /// Gemini API key
        #[arg(short = 'k', long, env = "GEMINI_API_KEY", hide_env_values = true)]
        api_key: Option<String>,

        /// Where to save files (default: ./lecture_<video id>)
        #[arg(short, long, value_name = "DIR")]
        output_dir: Option<PathBuf>,

        /// Generate only the .tex file (skip PDF compilation)
        #[arg(long)]
        no_pdf: bool,

        /// Use this subject instead of detecting it
        #[arg(short, long, value_enum)]
        subject: Option<SubjectCategory>,
    },

    /// Show or locate the configuration
    Config {
        /// Show current configuration
        #[arg(short, long)]
        show: bool,
    },

    /// List subject categories and the LaTeX packages each one uses
    Subjects,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_generate() {
        let cli = Cli::try_parse_from([
            "lecture-notes",
            "generate",
            "https://youtu.be/dQw4w9WgXcQ",
            "-k",
            "key",
            "--no-pdf",
            "--subject",
            "machine-learning",
            "-o",
            "out",
        ])
        .unwrap();

        match cli.command {
            Commands::Generate {
                url,
                api_key,
                output_dir,
                no_pdf,
                subject,
            } => {
                assert_eq!(url, "https://youtu.be/dQw4w9WgXcQ");
                assert_eq!(api_key.as_deref(), Some("key"));
                assert_eq!(output_dir, Some(PathBuf::from("out")));
                assert!(no_pdf);
                assert_eq!(subject, Some(SubjectCategory::MachineLearning));
            }
            _ => panic!("expected generate command"),
        }
    }

    #[test]
    fn test_generate_requires_url() {
        assert!(Cli::try_parse_from(["lecture-notes", "generate"]).is_err());
    }
}
