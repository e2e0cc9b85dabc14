use std::sync::Arc;

use super::{select_template, SubjectCategory, SubjectClassifier};
use crate::llm::{GenerationRequest, LlmError, TextGenerator};

const DOCUMENT_CLASS: &str = "\\documentclass";
const DOCUMENT_END: &str = "\\end{document}";

/// Errors raised while generating the document source
#[derive(thiserror::Error, Debug)]
pub enum GenerationError {
    #[error("No response from the generation service")]
    EmptyResponse,

    #[error("Error during LaTeX generation: {0}")]
    Service(#[from] LlmError),
}

/// Sanitized LaTeX document source
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentSource(String);

impl DocumentSource {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Starts with a document-class directive and ends with the document end
    pub fn is_well_formed(&self) -> bool {
        self.0.starts_with(DOCUMENT_CLASS) && self.0.ends_with(DOCUMENT_END)
    }
}

/// Output of [`NotesGenerator::generate`]
#[derive(Debug, Clone)]
pub struct GeneratedNotes {
    pub subject: SubjectCategory,
    pub source: DocumentSource,
}

/// Classifies a transcript, picks its template and generates LaTeX notes
pub struct NotesGenerator {
    llm: Arc<dyn TextGenerator>,
    classifier: SubjectClassifier,
    temperature: f32,
}

impl NotesGenerator {
    pub fn new(llm: Arc<dyn TextGenerator>, classifier: SubjectClassifier, temperature: f32) -> Self {
        Self {
            llm,
            classifier,
            temperature,
        }
    }

    /// Generate notes; `subject` skips classification when given
    pub async fn generate(
        &self,
        transcript: &str,
        subject: Option<SubjectCategory>,
    ) -> Result<GeneratedNotes, GenerationError> {
        let subject = match subject {
            Some(subject) => {
                tracing::info!("Using requested subject: {}", subject);
                subject
            }
            None => self.classifier.classify(transcript).await,
        };

        let template = select_template(subject);
        tracing::debug!("Template packages: {}", template.packages().join(", "));

        let prompt = format!("{}{}", template.instructions(), transcript);
        let response = self
            .llm
            .generate(&GenerationRequest::new(prompt, self.temperature))
            .await?;

        if response.trim().is_empty() {
            return Err(GenerationError::EmptyResponse);
        }

        let source = sanitize_document(&response);
        if !source.is_well_formed() {
            tracing::warn!("Generated source is missing \\documentclass or \\end{{document}}");
        }

        Ok(GeneratedNotes { subject, source })
    }
}

/// Remove code-fence lines and any chatter around the document body
pub fn sanitize_document(raw: &str) -> DocumentSource {
    let mut text = raw.trim().to_string();

    if text.contains("```") {
        text = text
            .lines()
            .filter(|line| !line.trim_start().starts_with("```"))
            .collect::<Vec<_>>()
            .join("\n")
            .trim()
            .to_string();
    }

    if let (Some(start), Some(end)) = (text.find(DOCUMENT_CLASS), text.rfind(DOCUMENT_END)) {
        if start < end {
            text = text[start..end + DOCUMENT_END.len()].to_string();
        }
    }

    DocumentSource(text)
}
