//! Transcript-to-notes transformations: refinement, classification,
//! template selection and document generation.

use serde::{Deserialize, Serialize};

pub mod classify;
pub mod generator;
pub mod refine;
pub mod templates;

pub use classify::{parse_subject, SubjectClassifier};
pub use generator::{sanitize_document, DocumentSource, GeneratedNotes, GenerationError, NotesGenerator};
pub use refine::ProseRefiner;
pub use templates::{select_template, Template};

/// Subject categories a lecture can be classified into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
pub enum SubjectCategory {
    Math,
    Programming,
    Chemistry,
    Physics,
    MachineLearning,
    General,
}

impl SubjectCategory {
    /// All categories in declaration order; classification precedence follows this order
    pub const ALL: [SubjectCategory; 6] = [
        SubjectCategory::Math,
        SubjectCategory::Programming,
        SubjectCategory::Chemistry,
        SubjectCategory::Physics,
        SubjectCategory::MachineLearning,
        SubjectCategory::General,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SubjectCategory::Math => "Math",
            SubjectCategory::Programming => "Programming",
            SubjectCategory::Chemistry => "Chemistry",
            SubjectCategory::Physics => "Physics",
            SubjectCategory::MachineLearning => "MachineLearning",
            SubjectCategory::General => "General",
        }
    }
}

impl Default for SubjectCategory {
    fn default() -> Self {
        SubjectCategory::General
    }
}

impl std::fmt::Display for SubjectCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
