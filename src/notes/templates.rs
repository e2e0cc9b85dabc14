use super::SubjectCategory;

/// Packages every generated document loads
pub const BASE_PACKAGES: &[&str] = &["amsmath", "amssymb", "enumitem", "hyperref", "geometry"];

/// Static per-subject generation ruleset
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    pub subject: SubjectCategory,
    /// Opening sentence of the request
    pub intro: &'static str,
    /// Packages required on top of [`BASE_PACKAGES`]
    pub extra_packages: &'static [&'static str],
    /// Subject-specific formatting rules
    pub rules: &'static [&'static str],
}

static TEMPLATES: [Template; 6] = [
    Template {
        subject: SubjectCategory::Math,
        intro: "Convert the following lecture transcript into clean, professional LaTeX lecture notes focused on mathematics.",
        extra_packages: &["mathtools", "amsthm", "cancel", "tikz"],
        rules: &[
            "Use display math (\\[ \\]) for important equations and align environments for multi-line derivations",
            "Use theorem-like environments (definition, theorem, lemma, proof) via amsthm where useful",
            "Number equations when they are referenced later",
            "Make heavy use of proper math mode",
        ],
    },
    Template {
        subject: SubjectCategory::Programming,
        intro: "Convert the following programming lecture transcript into clean LaTeX notes.",
        extra_packages: &["listings", "xcolor"],
        rules: &[
            "Configure \\lstset for code styling (language if detectable, basicstyle=\\ttfamily\\small)",
            "Put every code snippet in an lstlisting environment",
            "Explain concepts clearly with itemize/enumerate",
            "Keep spoken remarks about code as explanations next to the listing",
        ],
    },
    Template {
        subject: SubjectCategory::Chemistry,
        intro: "Convert the following chemistry lecture transcript into professional LaTeX notes.",
        extra_packages: &["mhchem", "chemfig"],
        rules: &[
            "Use \\ce{} for all chemical formulas and reaction equations",
            "Draw structures with chemfig when molecules are described",
            "Use tables for periodic trends and tabulated data",
        ],
    },
    Template {
        subject: SubjectCategory::Physics,
        intro: "Convert the following physics lecture transcript into clean LaTeX notes.",
        extra_packages: &["siunitx", "physics", "tikz"],
        rules: &[
            "Use \\SI{}{} and \\si{} for quantities and units, with proper vector notation",
            "Put key equations in display math",
            "Include diagrams with tikz when the lecturer describes one",
        ],
    },
    Template {
        subject: SubjectCategory::MachineLearning,
        intro: "Convert the following machine learning/AI lecture transcript into LaTeX notes.",
        extra_packages: &["algorithm", "algpseudocode", "listings", "tikz"],
        rules: &[
            "Use math mode extensively for loss functions, gradients and update rules",
            "Put explained procedures in algorithm environments with algpseudocode",
            "Use tikz for neural network diagrams when described",
        ],
    },
    Template {
        subject: SubjectCategory::General,
        intro: "Convert the following lecture transcript into clean, structured LaTeX notes.",
        extra_packages: &[],
        rules: &[
            "Use sections/subsections, itemize/enumerate, bold and italic for emphasis",
            "Use math mode when equations appear ($...$ or \\[ \\])",
            "Be concise and well organized",
        ],
    },
];

/// Template for `subject`
pub fn select_template(subject: SubjectCategory) -> &'static Template {
    TEMPLATES
        .iter()
        .find(|template| template.subject == subject)
        .unwrap_or(&TEMPLATES[TEMPLATES.len() - 1])
}

impl Template {
    /// Base plus subject packages, in load order
    pub fn packages(&self) -> Vec<&'static str> {
        BASE_PACKAGES
            .iter()
            .chain(self.extra_packages.iter())
            .copied()
            .collect()
    }

    /// Instruction text placed in front of the transcript
    pub fn instructions(&self) -> String {
        let mut text = String::new();
        text.push_str(self.intro);
        text.push_str("\nRULES - FOLLOW EXACTLY:\n");

        let common = [
            "Output ONLY the LaTeX code".to_string(),
            "Do NOT use markdown or code blocks".to_string(),
            "Start directly with \\documentclass{article}".to_string(),
            "End with \\end{document}".to_string(),
            format!("Use packages: {}", self.packages().join(", ")),
        ];

        for rule in common.iter().map(String::as_str).chain(self.rules.iter().copied()) {
            text.push_str("- ");
            text.push_str(rule);
            text.push('\n');
        }

        text.push_str("Transcript:\n");
        text
    }
}
