use std::sync::Arc;

use crate::llm::{GenerationRequest, TextGenerator};

const REFINE_INSTRUCTIONS: &str = "\
You are an expert academic editor. Your task is to take a raw transcript of a spoken lecture \
(from YouTube subtitles) and rewrite it into clean, concise, well-structured written prose \
suitable for creating high-quality lecture notes.

Follow these rules strictly:
- Remove all filler words (um, uh, you know, like, basically, right?, okay, so yeah, etc.)
- Eliminate repetitions and false starts (e.g., \"let's let's begin\" -> \"let's begin\")
- Fix incomplete or run-on sentences into proper grammar
- Improve flow and logical structure: group related ideas, create natural paragraphs
- Keep all technical content, equations, examples, and explanations 100% accurate and intact
- Convert informal spoken style into clear academic written style
- Do NOT add new information or explanations; only rephrase and organize what is already said
- Do NOT summarize or shorten drastically; preserve detail and length, just make it read smoothly
- If code is mentioned, preserve it accurately
- If math is spoken (e.g., \"x squared plus two x plus one\"), write it symbolically (e.g., \"x^2 + 2x + 1\")

Output ONLY the refined transcript text. No introductions, no explanations, no markdown.

Raw transcript:
";

/// Rewrites raw caption text into readable prose.
///
/// Refinement never fails: any service error or empty response yields the
/// raw transcript unchanged.
pub struct ProseRefiner {
    llm: Arc<dyn TextGenerator>,
    temperature: f32,
}

impl ProseRefiner {
    pub fn new(llm: Arc<dyn TextGenerator>, temperature: f32) -> Self {
        Self { llm, temperature }
    }

    pub fn build_prompt(raw: &str) -> String {
        format!("{}{}", REFINE_INSTRUCTIONS, raw)
    }

    pub async fn refine(&self, raw: String) -> String {
        let request = GenerationRequest::new(Self::build_prompt(&raw), self.temperature);

        match self.llm.generate(&request).await {
            Ok(text) => {
                let refined = text.replace("```", "");
                let refined = refined.trim();
                if refined.is_empty() {
                    tracing::warn!("Empty refinement response, falling back to raw transcript");
                    raw
                } else {
                    tracing::debug!("Refined transcript: {} -> {} chars", raw.len(), refined.len());
                    refined.to_string()
                }
            }
            Err(e) => {
                tracing::warn!("Refinement failed: {}. Falling back to raw transcript", e);
                raw
            }
        }
    }
}
