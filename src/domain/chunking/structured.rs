//! One chunk per profile record, plus an enumerating summary chunk per
//! non-empty record list.
//!
//! Summary chunks let "list all projects" style questions hit a single
//! chunk instead of depending on K separate hits. Text is never split here;
//! each chunk is exactly one formatted record or list.

use serde::Serialize;
use serde_json::{json, Value};
use std::collections::BTreeSet;

use super::tokens::TokenCounter;
use super::{Chunker, ChunkingStrategy};
use crate::domain::{
    Award, Certification, Chunk, Education, GithubProfile, LinkedinProfile, ProfileDocument,
    Project, Repository, ResumeProfile, SourceType, WorkExperience,
};

const MAX_SUMMARY_REPOSITORIES: usize = 10;

#[derive(Debug, Clone)]
pub struct StructuredChunker {
    counter: TokenCounter,
    include_summaries: bool,
}

impl StructuredChunker {
    pub fn new(counter: TokenCounter, include_summaries: bool) -> Self {
        Self {
            counter,
            include_summaries,
        }
    }

    pub fn chunk_resume(&self, resume: &ResumeProfile) -> Vec<Chunk> {
        let mut out = Emitter::new(SourceType::Resume, &self.counter);

        if [&resume.full_name, &resume.email_address, &resume.linkedin_url]
            .iter()
            .any(|v| !v.is_empty())
        {
            out.single(
                "resume_basic_info",
                "basic_info",
                format_sentences(vec![
                    labeled("Name", &resume.full_name),
                    labeled("Email", &resume.email_address),
                    labeled("LinkedIn", &resume.linkedin_url),
                ]),
                json!({
                    "full_name": resume.full_name,
                    "email_address": resume.email_address,
                    "linkedin_url": resume.linkedin_url,
                }),
            );
        }

        out.records(
            "resume_work_experience",
            "work_experience",
            &resume.work_experience,
            format_work_experience,
        );
        if self.include_summaries && !resume.work_experience.is_empty() {
            out.single(
                "resume_work_experience_summary",
                "work_experience_summary",
                format_work_experience_summary(&resume.work_experience),
                json!({
                    "all_experiences": to_content(&resume.work_experience),
                    "total_experiences": resume.work_experience.len(),
                }),
            );
        }

        out.records("resume_project", "projects", &resume.projects, format_project);
        if self.include_summaries && !resume.projects.is_empty() {
            out.single(
                "resume_projects_summary",
                "projects_summary",
                format_projects_summary(&resume.projects),
                json!({
                    "all_projects": to_content(&resume.projects),
                    "total_projects": resume.projects.len(),
                }),
            );
        }

        if !resume.skills.is_empty() {
            out.single(
                "resume_skills",
                "skills",
                format_skills(&resume.skills),
                json!({ "skills": resume.skills }),
            );
        }

        if !resume.certifications.is_empty() {
            out.single(
                "resume_certifications",
                "certifications",
                format!("Certifications: {}.", resume.certifications.join(", ")),
                json!({ "certifications": resume.certifications }),
            );
        }

        out.finish()
    }

    pub fn chunk_linkedin(&self, profile: &LinkedinProfile) -> Vec<Chunk> {
        let mut out = Emitter::new(SourceType::Linkedin, &self.counter);

        if [&profile.full_name, &profile.headline, &profile.location]
            .iter()
            .any(|v| !v.is_empty())
        {
            out.single(
                "linkedin_basic_info",
                "basic_info",
                format_sentences(vec![
                    labeled("Name", &profile.full_name),
                    labeled("Headline", &profile.headline),
                    labeled("Location", &profile.location),
                ]),
                json!({
                    "full_name": profile.full_name,
                    "headline": profile.headline,
                    "location": profile.location,
                }),
            );
        }

        out.records(
            "linkedin_work_experience",
            "work_experience",
            &profile.work_experience,
            format_work_experience,
        );
        if self.include_summaries && !profile.work_experience.is_empty() {
            out.single(
                "linkedin_work_experience_summary",
                "work_experience_summary",
                format_work_experience_summary(&profile.work_experience),
                json!({
                    "all_experiences": to_content(&profile.work_experience),
                    "total_experiences": profile.work_experience.len(),
                }),
            );
        }

        out.records(
            "linkedin_education",
            "education",
            &profile.education,
            format_education,
        );
        if self.include_summaries && !profile.education.is_empty() {
            out.single(
                "linkedin_education_summary",
                "education_summary",
                format_education_summary(&profile.education),
                json!({
                    "all_education": to_content(&profile.education),
                    "total_degrees": profile.education.len(),
                }),
            );
        }

        if !profile.skills.is_empty() {
            out.single(
                "linkedin_skills",
                "skills",
                format_skills(&profile.skills),
                json!({ "skills": profile.skills }),
            );
        }

        out.records(
            "linkedin_certification",
            "certifications",
            &profile.certifications,
            format_certification,
        );
        if self.include_summaries && !profile.certifications.is_empty() {
            out.single(
                "linkedin_certifications_summary",
                "certifications_summary",
                format_certifications_summary(&profile.certifications),
                json!({
                    "all_certifications": to_content(&profile.certifications),
                    "total_certifications": profile.certifications.len(),
                }),
            );
        }

        out.records(
            "linkedin_honor_award",
            "honors_awards",
            &profile.honors_and_awards,
            format_award,
        );
        if self.include_summaries && !profile.honors_and_awards.is_empty() {
            out.single(
                "linkedin_honors_awards_summary",
                "honors_awards_summary",
                format_awards_summary(&profile.honors_and_awards),
                json!({
                    "all_awards": to_content(&profile.honors_and_awards),
                    "total_awards": profile.honors_and_awards.len(),
                }),
            );
        }

        out.finish()
    }

    pub fn chunk_github(&self, profile: &GithubProfile) -> Vec<Chunk> {
        let mut out = Emitter::new(SourceType::Github, &self.counter);

        out.records(
            "github_repository",
            "repositories",
            &profile.repositories,
            format_repository,
        );
        if self.include_summaries && !profile.repositories.is_empty() {
            out.single(
                "github_repositories_summary",
                "repositories_summary",
                format_repositories_summary(&profile.repositories),
                json!({
                    "all_repositories": to_content(&profile.repositories),
                    "total_repositories": profile.repositories.len(),
                }),
            );
        }

        out.finish()
    }
}

impl Chunker for StructuredChunker {
    fn strategy(&self) -> ChunkingStrategy {
        ChunkingStrategy::Structured
    }

    fn chunk(&self, document: &ProfileDocument) -> Vec<Chunk> {
        match document {
            ProfileDocument::Resume(r) => self.chunk_resume(r),
            ProfileDocument::Linkedin(l) => self.chunk_linkedin(l),
            ProfileDocument::Github(g) => self.chunk_github(g),
        }
    }
}

/// Collects chunks for one source document, numbering them in emission order.
struct Emitter<'a> {
    source_type: SourceType,
    counter: &'a TokenCounter,
    chunks: Vec<Chunk>,
}

impl<'a> Emitter<'a> {
    fn new(source_type: SourceType, counter: &'a TokenCounter) -> Self {
        Self {
            source_type,
            counter,
            chunks: Vec::new(),
        }
    }

    fn build(&self, chunk_type: &str, section: &str, text: String, content: Value) -> Chunk {
        let token_count = self.counter.count(&text);
        Chunk::new(self.source_type, text, self.chunks.len())
            .with_section(section)
            .with_chunk_type(chunk_type)
            .with_token_count(token_count)
            .with_content(content)
    }

    fn single(&mut self, chunk_type: &str, section: &str, text: String, content: Value) {
        let chunk = self.build(chunk_type, section, text, content);
        self.chunks.push(chunk);
    }

    fn records<T: Serialize>(
        &mut self,
        chunk_type: &str,
        section: &str,
        items: &[T],
        format: impl Fn(&T) -> String,
    ) {
        for (idx, item) in items.iter().enumerate() {
            let chunk = self
                .build(chunk_type, section, format(item), to_content(item))
                .with_item_index(idx);
            self.chunks.push(chunk);
        }
    }

    fn finish(self) -> Vec<Chunk> {
        self.chunks
    }
}

fn to_content<T: Serialize + ?Sized>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or_default()
}

fn labeled(label: &str, value: &str) -> String {
    if value.is_empty() {
        String::new()
    } else {
        format!("{label}: {value}")
    }
}

/// Joins non-empty parts with ". " and closes with a period unless the last
/// part already ends a sentence.
fn format_sentences(parts: Vec<String>) -> String {
    let joined = parts
        .into_iter()
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(". ");

    if joined.ends_with(['.', '!', '?']) {
        joined
    } else {
        format!("{joined}.")
    }
}

fn date_range(start: &str, end: &str) -> String {
    if start.is_empty() || end.is_empty() {
        String::new()
    } else {
        format!(" ({start} - {end})")
    }
}

fn format_work_experience(exp: &WorkExperience) -> String {
    format_sentences(vec![exp.title(), exp.description.clone()])
}

fn format_project(project: &Project) -> String {
    format_sentences(vec![
        labeled("Project", &project.project_name),
        project.description.clone(),
    ])
}

fn format_skills(skills: &[String]) -> String {
    format!("Technical Skills: {}.", skills.join(", "))
}

fn education_line(edu: &Education) -> String {
    let mut line = if edu.field_of_study.is_empty() {
        edu.degree.clone()
    } else {
        format!("{} in {}", edu.degree, edu.field_of_study)
    };
    if !edu.institution_name.is_empty() {
        line.push_str(&format!(" from {}", edu.institution_name));
    }
    line.push_str(&date_range(&edu.start_date, &edu.end_date));
    line
}

fn format_education(edu: &Education) -> String {
    format_sentences(vec![education_line(edu)])
}

fn certification_line(cert: &Certification) -> String {
    let mut line = cert.certification_name.clone();
    if !cert.issuing_organization.is_empty() {
        line.push_str(&format!(" from {}", cert.issuing_organization));
    }
    if !cert.issue_date.is_empty() {
        line.push_str(&format!(" (issued {})", cert.issue_date));
    }
    line
}

fn format_certification(cert: &Certification) -> String {
    format_sentences(vec![format!("Certification: {}", certification_line(cert))])
}

fn award_line(award: &Award) -> String {
    let mut line = award.award_name.clone();
    if !award.issuing_organization.is_empty() {
        line.push_str(&format!(" from {}", award.issuing_organization));
    }
    if !award.issue_date.is_empty() {
        line.push_str(&format!(" ({})", award.issue_date));
    }
    line
}

fn format_award(award: &Award) -> String {
    format_sentences(vec![format!("Award: {}", award_line(award))])
}

fn format_repository(repo: &Repository) -> String {
    let mut parts = vec![format!("GitHub Repository: {}", repo.name)];
    parts.push(labeled("Description", &repo.description));
    if !repo.languages_used.is_empty() {
        parts.push(format!("Technologies: {}", repo.languages_used.join(", ")));
    }
    parts.push(labeled("Created", &repo.creation_date));
    parts.push(labeled("Last Updated", &repo.last_updated));
    format_sentences(parts)
}

fn format_work_experience_summary(experiences: &[WorkExperience]) -> String {
    let mut parts = vec![format!(
        "Professional Work Experience Summary ({} positions):",
        experiences.len()
    )];
    for (i, exp) in experiences.iter().enumerate() {
        let mut line = format!("{}. {}", i + 1, exp.title());
        if !exp.description.is_empty() {
            line.push_str(&format!(": {}", exp.description));
        }
        parts.push(line);
    }
    parts.join(" ")
}

fn format_projects_summary(projects: &[Project]) -> String {
    let mut parts = vec![format!("Projects Portfolio ({} projects):", projects.len())];
    for (i, project) in projects.iter().enumerate() {
        let mut line = format!("{}. {}", i + 1, project.project_name);
        if !project.description.is_empty() {
            line.push_str(&format!(": {}", project.description));
        }
        parts.push(line);
    }
    parts.push(format!("Total: {} projects.", projects.len()));
    parts.join(" ")
}

fn format_education_summary(education: &[Education]) -> String {
    let mut parts = vec![format!(
        "Educational Background ({} degrees):",
        education.len()
    )];
    parts.extend(
        education
            .iter()
            .enumerate()
            .map(|(i, edu)| format!("{}. {}", i + 1, education_line(edu))),
    );
    parts.join(" ")
}

fn format_certifications_summary(certifications: &[Certification]) -> String {
    let mut parts = vec![format!(
        "Professional Certifications ({} certifications):",
        certifications.len()
    )];
    parts.extend(
        certifications
            .iter()
            .enumerate()
            .map(|(i, cert)| format!("{}. {}", i + 1, certification_line(cert))),
    );
    parts.join(" ")
}

fn format_awards_summary(awards: &[Award]) -> String {
    let mut parts = vec![format!("Honors and Awards ({} awards):", awards.len())];
    parts.extend(
        awards
            .iter()
            .enumerate()
            .map(|(i, award)| format!("{}. {}", i + 1, award_line(award))),
    );
    parts.join(" ")
}

fn format_repositories_summary(repositories: &[Repository]) -> String {
    let mut parts = vec![format!(
        "GitHub Portfolio Overview ({} repositories):",
        repositories.len()
    )];

    parts.push("Key Projects:".to_string());
    parts.extend(
        repositories
            .iter()
            .filter(|r| !r.description.is_empty())
            .take(MAX_SUMMARY_REPOSITORIES)
            .map(|r| format!("• {}: {}", r.name, r.description)),
    );

    let languages: BTreeSet<&str> = repositories
        .iter()
        .flat_map(|r| r.languages_used.iter().map(String::as_str))
        .collect();
    if !languages.is_empty() {
        parts.push(format!(
            "Technologies used across portfolio: {}.",
            languages.into_iter().collect::<Vec<_>>().join(", ")
        ));
    }

    parts.push(format!("Total: {} repositories.", repositories.len()));
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunker(include_summaries: bool) -> StructuredChunker {
        StructuredChunker::new(
            TokenCounter::for_model("gpt-3.5-turbo").unwrap(),
            include_summaries,
        )
    }

    fn experience(company: &str, designation: &str) -> WorkExperience {
        WorkExperience {
            company_name: company.into(),
            designation: designation.into(),
            description: format!("Shipped things at {company}"),
            start_date: "2020".into(),
            end_date: "2022".into(),
        }
    }

    fn resume() -> ResumeProfile {
        ResumeProfile {
            full_name: "Naisarg".into(),
            email_address: "naisarg@example.com".into(),
            work_experience: vec![
                experience("Acme", "Engineer"),
                experience("Globex", "Senior Engineer"),
                experience("Initech", "Staff Engineer"),
            ],
            projects: vec![Project {
                project_name: "Portfolio RAG".into(),
                description: "Answers questions about me".into(),
            }],
            skills: vec!["Python".into(), "Go".into()],
            certifications: vec!["AWS Solutions Architect".into()],
            ..Default::default()
        }
    }

    fn sections(chunks: &[Chunk], section: &str) -> Vec<Chunk> {
        chunks
            .iter()
            .filter(|c| c.section() == section)
            .cloned()
            .collect()
    }

    #[test]
    fn test_resume_individual_and_summary_work_chunks() {
        let chunks = chunker(true).chunk_resume(&resume());

        let work = sections(&chunks, "work_experience");
        assert_eq!(work.len(), 3);
        for (i, chunk) in work.iter().enumerate() {
            assert_eq!(chunk.item_index, Some(i));
            assert_eq!(chunk.source_type, SourceType::Resume);
            assert_eq!(
                chunk.metadata.chunk_type.as_deref(),
                Some("resume_work_experience")
            );
        }
        assert_eq!(
            work[0].text,
            "Engineer at Acme (2020 - 2022). Shipped things at Acme."
        );
        assert_eq!(work[0].content.as_ref().unwrap()["company_name"], "Acme");

        let summary = sections(&chunks, "work_experience_summary");
        assert_eq!(summary.len(), 1);
        assert!(summary[0].text.contains("(3 positions)"));
        assert!(summary[0]
            .text
            .contains("3. Staff Engineer at Initech (2020 - 2022): Shipped things at Initech"));
        assert!(summary[0].item_index.is_none());
        assert_eq!(
            summary[0].content.as_ref().unwrap()["total_experiences"],
            3
        );
    }

    #[test]
    fn test_resume_chunk_order_and_indices() {
        let chunks = chunker(true).chunk_resume(&resume());

        let order: Vec<&str> = chunks.iter().map(|c| c.section()).collect();
        assert_eq!(
            order,
            vec![
                "basic_info",
                "work_experience",
                "work_experience",
                "work_experience",
                "work_experience_summary",
                "projects",
                "projects_summary",
                "skills",
                "certifications",
            ]
        );
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.chunk_index, i);
            assert!(chunk.token_count > 0);
            assert!(!chunk.text.is_empty());
        }
        assert_eq!(chunks[0].text, "Name: Naisarg. Email: naisarg@example.com.");
        assert_eq!(chunks[7].text, "Technical Skills: Python, Go.");
        assert_eq!(chunks[8].text, "Certifications: AWS Solutions Architect.");
    }

    #[test]
    fn test_summaries_can_be_disabled() {
        let chunks = chunker(false).chunk_resume(&resume());
        assert!(chunks
            .iter()
            .all(|c| !c.section().ends_with("_summary")));
        assert_eq!(sections(&chunks, "work_experience").len(), 3);
    }

    #[test]
    fn test_empty_lists_emit_nothing() {
        let chunks = chunker(true).chunk_resume(&ResumeProfile::default());
        assert!(chunks.is_empty());
    }

    #[test]
    fn test_linkedin_sections() {
        let profile = LinkedinProfile {
            headline: "Backend engineer".into(),
            education: vec![Education {
                institution_name: "State University".into(),
                degree: "BSc".into(),
                field_of_study: "Computer Science".into(),
                start_date: "2016".into(),
                end_date: "2020".into(),
            }],
            certifications: vec![Certification {
                certification_name: "CKA".into(),
                issuing_organization: "CNCF".into(),
                issue_date: "2023".into(),
            }],
            honors_and_awards: vec![Award {
                award_name: "Hackathon winner".into(),
                issuing_organization: "MLH".into(),
                issue_date: String::new(),
            }],
            ..Default::default()
        };

        let chunks = chunker(true).chunk_linkedin(&profile);
        let order: Vec<&str> = chunks.iter().map(|c| c.section()).collect();
        assert_eq!(
            order,
            vec![
                "basic_info",
                "education",
                "education_summary",
                "certifications",
                "certifications_summary",
                "honors_awards",
                "honors_awards_summary",
            ]
        );
        assert_eq!(chunks[0].text, "Headline: Backend engineer.");
        assert_eq!(
            chunks[1].text,
            "BSc in Computer Science from State University (2016 - 2020)."
        );
        assert_eq!(chunks[3].text, "Certification: CKA from CNCF (issued 2023).");
        assert_eq!(chunks[5].text, "Award: Hackathon winner from MLH.");
        assert!(chunks[6].text.starts_with("Honors and Awards (1 awards):"));
    }

    #[test]
    fn test_github_summary_lists_languages_once() {
        let profile = GithubProfile {
            repositories: vec![
                Repository {
                    name: "fastcrawl".into(),
                    description: "Web crawler".into(),
                    languages_used: vec!["Rust".into(), "Python".into()],
                    creation_date: "2024-01-01".into(),
                    ..Default::default()
                },
                Repository {
                    name: "dotfiles".into(),
                    languages_used: vec!["Rust".into(), "Lua".into()],
                    ..Default::default()
                },
            ],
        };

        let chunks = chunker(true).chunk(&ProfileDocument::Github(profile));
        assert_eq!(chunks.len(), 3);
        assert_eq!(
            chunks[0].text,
            "GitHub Repository: fastcrawl. Description: Web crawler. Technologies: Rust, Python. Created: 2024-01-01."
        );
        assert_eq!(
            chunks[1].text,
            "GitHub Repository: dotfiles. Technologies: Rust, Lua."
        );

        let summary = &chunks[2].text;
        assert!(summary.starts_with("GitHub Portfolio Overview (2 repositories):"));
        assert!(summary.contains("• fastcrawl: Web crawler"));
        assert!(!summary.contains("• dotfiles"));
        assert!(summary.contains("Technologies used across portfolio: Lua, Python, Rust."));
        assert_eq!(summary.matches("Rust").count(), 1);
    }

    #[test]
    fn test_description_with_period_is_not_doubled() {
        let exp = WorkExperience {
            designation: "Engineer".into(),
            company_name: "Acme".into(),
            description: "Built the search stack.".into(),
            ..Default::default()
        };
        assert_eq!(
            format_work_experience(&exp),
            "Engineer at Acme. Built the search stack."
        );
    }
}
