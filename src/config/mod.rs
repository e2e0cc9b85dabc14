use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Generative text service settings
    pub llm: LlmConfig,

    /// Transcript retrieval settings
    pub transcript: TranscriptConfig,

    /// Document compiler settings
    pub compiler: CompilerConfig,

    /// Application settings
    pub app: AppConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL of the generateContent API
    pub base_url: String,

    /// Model used for every request
    pub model: String,

    /// Environment variable consulted when no key is passed on the command line
    pub api_key_env: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// Sampling temperature for transcript refinement
    pub refine_temperature: f32,

    /// Sampling temperature for subject classification
    pub classify_temperature: f32,

    /// Sampling temperature for notes generation
    pub notes_temperature: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptConfig {
    /// yt-dlp executable
    pub yt_dlp_path: String,

    /// Preferred caption languages, most preferred first
    pub languages: Vec<String>,

    /// Transcripts shorter than this (in characters) are rejected
    pub min_chars: usize,

    /// Number of leading characters sent to the classifier
    pub classify_prefix_chars: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// LaTeX compiler executable
    pub command: String,

    /// Number of compiler passes, always run in full
    pub passes: u32,

    /// Extensions of build byproducts removed after a successful build
    pub byproduct_extensions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Show spinners while waiting on services
    pub show_progress: bool,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-2.5-flash".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            timeout_secs: 300,
            refine_temperature: 0.3,
            classify_temperature: 0.0,
            notes_temperature: 1.0,
        }
    }
}

impl Default for TranscriptConfig {
    fn default() -> Self {
        Self {
            yt_dlp_path: "yt-dlp".to_string(),
            languages: vec!["en".to_string()],
            min_chars: 200,
            classify_prefix_chars: 3500,
        }
    }
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            command: "pdflatex".to_string(),
            passes: 2,
            byproduct_extensions: ["aux", "log", "out", "toc", "fls", "fdb_latexmk"]
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self { show_progress: true }
    }
}

impl Config {
    /// Load configuration from `path`, the default location, or create a default file
    pub async fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::config_path()?,
        };

        if config_path.exists() {
            let content = fs_err::read_to_string(&config_path)
                .context("Failed to read config file")?;

            let config: Config = serde_yaml::from_str(&content)
                .context("Failed to parse config file")?;

            config.validate()?;
            Ok(config)
        } else {
            let config = Self::default();
            config.save_to(&config_path).await?;
            tracing::debug!("Wrote default configuration to {}", config_path.display());
            Ok(config)
        }
    }

    /// Save configuration to `path`
    pub async fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs_err::create_dir_all(parent)?;
            }
        }

        let content = serde_yaml::to_string(self)
            .context("Failed to serialize config")?;

        fs_err::write(path, content)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Get configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let local_config = PathBuf::from("config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?;

        Ok(config_dir.join("lecture-scribe").join("config.yaml"))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.llm.model.trim().is_empty() {
            anyhow::bail!("llm.model must be configured");
        }

        for (name, value) in [
            ("refine_temperature", self.llm.refine_temperature),
            ("classify_temperature", self.llm.classify_temperature),
            ("notes_temperature", self.llm.notes_temperature),
        ] {
            if !(0.0..=2.0).contains(&value) {
                anyhow::bail!("llm.{} must be between 0.0 and 2.0, got {}", name, value);
            }
        }

        if self.compiler.passes == 0 {
            anyhow::bail!("compiler.passes must be at least 1");
        }

        if self.transcript.min_chars == 0 {
            anyhow::bail!("transcript.min_chars must be greater than zero");
        }

        Ok(())
    }

    /// Resolve the service credential: explicit key first, then the configured env var
    pub fn resolve_api_key(&self, explicit: Option<String>) -> Result<String> {
        if let Some(key) = explicit.filter(|k| !k.trim().is_empty()) {
            return Ok(key);
        }

        std::env::var(&self.llm.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .with_context(|| {
                format!(
                    "No API key provided. Pass --api-key or set {}",
                    self.llm.api_key_env
                )
            })
    }

    /// Display current configuration
    pub fn display(&self) {
        println!("Current Configuration:");
        println!("  Model: {} ({})", self.llm.model, self.llm.base_url);
        println!("  API key variable: {}", self.llm.api_key_env);
        println!(
            "  Temperatures: refine={} classify={} notes={}",
            self.llm.refine_temperature, self.llm.classify_temperature, self.llm.notes_temperature
        );
        println!("  Caption languages: {}", self.transcript.languages.join(", "));
        println!("  Minimum transcript length: {} chars", self.transcript.min_chars);
        println!(
            "  Compiler: {} ({} passes)",
            self.compiler.command, self.compiler.passes
        );
    }
}
