use crate::domain::{SourceType, DEFAULT_SECTION};

type Rule = (&'static str, &'static [&'static str]);

const RESUME_RULES: &[Rule] = &[
    (
        "work_experience",
        &["experience", "work", "employment", "career", "job", "position"],
    ),
    (
        "education",
        &["education", "degree", "university", "college", "school", "academic"],
    ),
    (
        "skills",
        &["skill", "technology", "programming", "technical", "proficiency"],
    ),
    (
        "projects",
        &["project", "portfolio", "development", "built", "created"],
    ),
    (
        "certifications",
        &["certification", "certificate", "license", "credential"],
    ),
];

const LINKEDIN_RULES: &[Rule] = &[
    ("work_experience", &["experience", "work", "employment", "career"]),
    ("education", &["education", "degree", "university", "college"]),
    ("skills", &["skill", "endorsement", "expertise", "competency"]),
    ("certifications", &["certification", "license", "credential"]),
    ("honors_awards", &["award", "honor", "achievement", "recognition"]),
];

const GITHUB_RULES: &[Rule] = &[
    ("repositories", &["repository", "repo", "project", "code"]),
    (
        "languages",
        &["language", "programming", "framework", "technology"],
    ),
    (
        "descriptions",
        &["description", "readme", "documentation", "about"],
    ),
];

/// Keyword priority list labelling chunks with a semantic section.
///
/// The first rule with any keyword contained in the text wins; declaration
/// order breaks ties.
#[derive(Debug, Clone, Copy, Default)]
pub struct SectionTagger;

impl SectionTagger {
    pub fn new() -> Self {
        Self
    }

    pub fn tag(&self, text: &str, source_type: SourceType) -> &'static str {
        let text = text.to_lowercase();

        rules_for(source_type)
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| text.contains(k)))
            .map(|(label, _)| *label)
            .unwrap_or(DEFAULT_SECTION)
    }
}

fn rules_for(source_type: SourceType) -> &'static [Rule] {
    match source_type {
        SourceType::Resume => RESUME_RULES,
        SourceType::Linkedin => LINKEDIN_RULES,
        SourceType::Github => GITHUB_RULES,
    }
}
