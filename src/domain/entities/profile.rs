//! Structured profile records produced by the scraping/parsing stage.
//!
//! Every field is optional on the wire; missing and `null` strings both
//! deserialize to the empty string so formatters only check `is_empty`.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::SourceType;

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkExperience {
    #[serde(deserialize_with = "null_as_empty")]
    pub company_name: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub designation: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub description: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub start_date: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub end_date: String,
}

impl WorkExperience {
    /// `{designation} at {company}` plus the date range when both ends are known.
    pub fn title(&self) -> String {
        let mut title = format!("{} at {}", self.designation, self.company_name);
        if !self.start_date.is_empty() && !self.end_date.is_empty() {
            title.push_str(&format!(" ({} - {})", self.start_date, self.end_date));
        }
        title
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
    #[serde(deserialize_with = "null_as_empty")]
    pub project_name: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Education {
    #[serde(deserialize_with = "null_as_empty")]
    pub institution_name: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub degree: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub field_of_study: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub start_date: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub end_date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Certification {
    #[serde(deserialize_with = "null_as_empty")]
    pub certification_name: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub issuing_organization: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub issue_date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Award {
    #[serde(deserialize_with = "null_as_empty")]
    pub award_name: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub issuing_organization: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub issue_date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Repository {
    #[serde(deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub description: String,
    #[serde(deserialize_with = "null_as_vec")]
    pub languages_used: Vec<String>,
    #[serde(deserialize_with = "null_as_empty")]
    pub creation_date: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub last_updated: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResumeProfile {
    #[serde(deserialize_with = "null_as_empty")]
    pub full_name: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub email_address: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub linkedin_url: String,
    #[serde(deserialize_with = "null_as_vec")]
    pub work_experience: Vec<WorkExperience>,
    #[serde(deserialize_with = "null_as_vec")]
    pub projects: Vec<Project>,
    #[serde(deserialize_with = "null_as_vec")]
    pub skills: Vec<String>,
    #[serde(deserialize_with = "null_as_vec")]
    pub certifications: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkedinProfile {
    #[serde(deserialize_with = "null_as_empty")]
    pub full_name: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub headline: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub location: String,
    #[serde(deserialize_with = "null_as_vec")]
    pub work_experience: Vec<WorkExperience>,
    #[serde(deserialize_with = "null_as_vec")]
    pub education: Vec<Education>,
    #[serde(deserialize_with = "null_as_vec")]
    pub skills: Vec<String>,
    #[serde(deserialize_with = "null_as_vec")]
    pub certifications: Vec<Certification>,
    #[serde(deserialize_with = "null_as_vec")]
    pub honors_and_awards: Vec<Award>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GithubProfile {
    #[serde(deserialize_with = "null_as_vec")]
    pub repositories: Vec<Repository>,
}

/// One source document handed to a chunker.
#[derive(Debug, Clone, PartialEq)]
pub enum ProfileDocument {
    Resume(ResumeProfile),
    Linkedin(LinkedinProfile),
    Github(GithubProfile),
}

impl ProfileDocument {
    pub fn source_type(&self) -> SourceType {
        match self {
            Self::Resume(_) => SourceType::Resume,
            Self::Linkedin(_) => SourceType::Linkedin,
            Self::Github(_) => SourceType::Github,
        }
    }

    /// Top-level JSON keys of the underlying record that carry data, in
    /// declaration order. Empty strings and empty lists count as absent.
    pub fn top_level_keys(&self) -> Vec<String> {
        let value = match self {
            Self::Resume(r) => serde_json::to_value(r),
            Self::Linkedin(l) => serde_json::to_value(l),
            Self::Github(g) => serde_json::to_value(g),
        };

        let Ok(Value::Object(map)) = value else {
            return Vec::new();
        };
        map.into_iter()
            .filter(|(_, v)| !is_blank(v))
            .map(|(k, _)| k)
            .collect()
    }

    /// Readable rendering used when the document goes through free-text chunking.
    pub fn to_text(&self) -> String {
        match self {
            Self::Resume(r) => resume_text(r),
            Self::Linkedin(l) => linkedin_text(l),
            Self::Github(g) => github_text(g),
        }
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        _ => false,
    }
}

fn push_labeled(parts: &mut Vec<String>, label: &str, value: &str) {
    if !value.is_empty() {
        parts.push(format!("{label}: {value}"));
    }
}

fn work_line(exp: &WorkExperience) -> String {
    let mut line = format!("- {}", exp.title());
    if !exp.description.is_empty() {
        line.push_str(&format!(": {}", exp.description));
    }
    line
}

fn resume_text(resume: &ResumeProfile) -> String {
    let mut parts = Vec::new();
    push_labeled(&mut parts, "Name", &resume.full_name);
    push_labeled(&mut parts, "Email", &resume.email_address);
    push_labeled(&mut parts, "LinkedIn", &resume.linkedin_url);

    if !resume.work_experience.is_empty() {
        parts.push("\nWork Experience:".to_string());
        parts.extend(resume.work_experience.iter().map(work_line));
    }

    if !resume.skills.is_empty() {
        parts.push(format!("\nSkills: {}", resume.skills.join(", ")));
    }

    if !resume.projects.is_empty() {
        parts.push("\nProjects:".to_string());
        for project in &resume.projects {
            let mut line = format!("- {}", project.project_name);
            if !project.description.is_empty() {
                line.push_str(&format!(": {}", project.description));
            }
            parts.push(line);
        }
    }

    if !resume.certifications.is_empty() {
        parts.push(format!(
            "\nCertifications: {}",
            resume.certifications.join(", ")
        ));
    }

    parts.join("\n")
}

fn linkedin_text(profile: &LinkedinProfile) -> String {
    let mut parts = Vec::new();
    push_labeled(&mut parts, "Name", &profile.full_name);
    push_labeled(&mut parts, "Headline", &profile.headline);
    push_labeled(&mut parts, "Location", &profile.location);

    if !profile.work_experience.is_empty() {
        parts.push("\nWork Experience:".to_string());
        parts.extend(profile.work_experience.iter().map(work_line));
    }

    if !profile.education.is_empty() {
        parts.push("\nEducation:".to_string());
        for edu in &profile.education {
            let mut line = format!(
                "- {} in {} from {}",
                edu.degree, edu.field_of_study, edu.institution_name
            );
            if !edu.start_date.is_empty() && !edu.end_date.is_empty() {
                line.push_str(&format!(" ({} - {})", edu.start_date, edu.end_date));
            }
            parts.push(line);
        }
    }

    if !profile.skills.is_empty() {
        parts.push(format!("\nSkills: {}", profile.skills.join(", ")));
    }

    if !profile.certifications.is_empty() {
        parts.push("\nCertifications:".to_string());
        for cert in &profile.certifications {
            let mut line = format!(
                "- {} from {}",
                cert.certification_name, cert.issuing_organization
            );
            if !cert.issue_date.is_empty() {
                line.push_str(&format!(" ({})", cert.issue_date));
            }
            parts.push(line);
        }
    }

    if !profile.honors_and_awards.is_empty() {
        parts.push("\nHonors and Awards:".to_string());
        for award in &profile.honors_and_awards {
            let mut line = format!("- {} from {}", award.award_name, award.issuing_organization);
            if !award.issue_date.is_empty() {
                line.push_str(&format!(" ({})", award.issue_date));
            }
            parts.push(line);
        }
    }

    parts.join("\n")
}

fn github_text(profile: &GithubProfile) -> String {
    if profile.repositories.is_empty() {
        return String::new();
    }

    let mut parts = vec!["GitHub Repositories:".to_string()];
    for repo in &profile.repositories {
        let mut line = format!("- {}", repo.name);
        if !repo.description.is_empty() {
            line.push_str(&format!(": {}", repo.description));
        }
        if !repo.languages_used.is_empty() {
            line.push_str(&format!(" (Languages: {})", repo.languages_used.join(", ")));
        }
        if !repo.creation_date.is_empty() {
            line.push_str(&format!(" (Created: {})", repo.creation_date));
        }
        if !repo.last_updated.is_empty() {
            line.push_str(&format!(" (Updated: {})", repo.last_updated));
        }
        parts.push(line);
    }

    parts.join("\n")
}

/// Everything gathered about the subject in one ingestion run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileBundle {
    #[serde(alias = "Name", deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub email: String,
    #[serde(alias = "linkedinURL", deserialize_with = "null_as_empty")]
    pub linkedin_url: String,
    #[serde(alias = "githubURL", deserialize_with = "null_as_empty")]
    pub github_url: String,
    pub resume: Option<ResumeProfile>,
    pub linkedin: Option<LinkedinProfile>,
    pub github: Option<GithubProfile>,
}

impl ProfileBundle {
    pub fn documents(&self) -> Vec<ProfileDocument> {
        let mut documents = Vec::new();
        if let Some(resume) = &self.resume {
            documents.push(ProfileDocument::Resume(resume.clone()));
        }
        if let Some(linkedin) = &self.linkedin {
            documents.push(ProfileDocument::Linkedin(linkedin.clone()));
        }
        if let Some(github) = &self.github {
            documents.push(ProfileDocument::Github(github.clone()));
        }
        documents
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nulls_deserialize_as_empty() {
        let json = r#"{
            "full_name": null,
            "work_experience": [{"company_name": "Acme", "designation": null}],
            "skills": null
        }"#;
        let resume: ResumeProfile = serde_json::from_str(json).unwrap();

        assert!(resume.full_name.is_empty());
        assert_eq!(resume.work_experience[0].company_name, "Acme");
        assert!(resume.work_experience[0].designation.is_empty());
        assert!(resume.skills.is_empty());
    }

    #[test]
    fn test_bundle_accepts_scraper_key_names() {
        let json = r#"{
            "Name": "Naisarg",
            "linkedinURL": "https://linkedin.com/in/naisarg",
            "githubURL": "https://github.com/naisarg",
            "github": {"repositories": [{"name": "portfolio-rag"}]}
        }"#;
        let bundle: ProfileBundle = serde_json::from_str(json).unwrap();

        assert_eq!(bundle.name, "Naisarg");
        assert_eq!(bundle.github_url, "https://github.com/naisarg");
        let documents = bundle.documents();
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].source_type(), SourceType::Github);
    }

    #[test]
    fn test_resume_to_text() {
        let resume = ResumeProfile {
            full_name: "Naisarg".into(),
            work_experience: vec![WorkExperience {
                company_name: "Acme".into(),
                designation: "Engineer".into(),
                start_date: "2021".into(),
                end_date: "2023".into(),
                description: "Built search".into(),
            }],
            skills: vec!["Python".into(), "Go".into()],
            ..Default::default()
        };

        let text = ProfileDocument::Resume(resume).to_text();
        assert_eq!(
            text,
            "Name: Naisarg\n\nWork Experience:\n- Engineer at Acme (2021 - 2023): Built search\n\nSkills: Python, Go"
        );
    }

    #[test]
    fn test_top_level_keys_skip_absent_sections() {
        assert!(ProfileDocument::Github(GithubProfile::default())
            .top_level_keys()
            .is_empty());

        let resume: ResumeProfile = serde_json::from_str(
            r#"{"skills": ["Rust"], "full_name": "Naisarg", "projects": [], "email_address": null}"#,
        )
        .unwrap();
        assert_eq!(
            ProfileDocument::Resume(resume).top_level_keys(),
            vec!["full_name".to_string(), "skills".to_string()]
        );
    }
}
