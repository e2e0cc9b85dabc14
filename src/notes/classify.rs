use std::sync::Arc;

use super::SubjectCategory;
use crate::llm::{GenerationRequest, TextGenerator};
use crate::utils::truncate_chars;

/// Maps transcript text onto one of the fixed subject categories.
///
/// Classification is total: service failures and unparseable answers
/// resolve to [`SubjectCategory::General`].
pub struct SubjectClassifier {
    llm: Arc<dyn TextGenerator>,
    temperature: f32,
    prefix_chars: usize,
}

impl SubjectClassifier {
    pub fn new(llm: Arc<dyn TextGenerator>, temperature: f32, prefix_chars: usize) -> Self {
        Self {
            llm,
            temperature,
            prefix_chars,
        }
    }

    pub fn build_prompt(&self, transcript: &str) -> String {
        let names = SubjectCategory::ALL
            .iter()
            .map(SubjectCategory::as_str)
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "Classify the main subject of this lecture into exactly one of these categories.\n\
             Return ONLY the category name, nothing else, no explanation, no quotes, no prefix.\n\n\
             Categories: {}\n\n\
             Lecture transcript (beginning):\n{}\n\n\
             Your answer must look exactly like this example:\nPhysics",
            names,
            truncate_chars(transcript, self.prefix_chars)
        )
    }

    pub async fn classify(&self, transcript: &str) -> SubjectCategory {
        let request = GenerationRequest::new(self.build_prompt(transcript), self.temperature)
            .with_mime_type("text/plain");

        match self.llm.generate(&request).await {
            Ok(answer) => match parse_subject(&answer) {
                Some(subject) => {
                    tracing::info!("Detected subject: {}", subject);
                    subject
                }
                None => {
                    tracing::warn!("Unexpected classifier output {:?}, using General", answer.trim());
                    SubjectCategory::General
                }
            },
            Err(e) => {
                tracing::warn!("Classification failed: {}. Using General", e);
                SubjectCategory::General
            }
        }
    }
}

/// Parse a free-form classifier answer.
///
/// An exact case-insensitive match (ignoring spacing and surrounding
/// punctuation) wins; otherwise the first category, in declaration order,
/// whose name occurs anywhere in the answer.
pub fn parse_subject(answer: &str) -> Option<SubjectCategory> {
    let normalized: String = answer
        .trim()
        .trim_matches(|c: char| !c.is_alphanumeric())
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect::<String>()
        .to_lowercase();

    if let Some(exact) = SubjectCategory::ALL
        .into_iter()
        .find(|subject| subject.as_str().to_lowercase() == normalized)
    {
        return Some(exact);
    }

    let lowered = answer.to_lowercase();
    SubjectCategory::ALL
        .into_iter()
        .find(|subject| lowered.contains(&subject.as_str().to_lowercase()))
}
