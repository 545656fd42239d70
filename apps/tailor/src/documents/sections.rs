//! Heuristic section scraping over extracted résumé text.
//!
//! Best-effort only: matches labelled lines ("Skills: ...") and a leading
//! "First Last" name. Résumés without labels yield empty sections.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z][a-z]+ [A-Z][a-z]+").expect("valid name regex"));
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\w.\-]+@[\w.\-]+\.\w+").expect("valid email regex"));
static WORK_RE: Lazy<Regex> = Lazy::new(|| labelled_line(r"Job|Position|Role"));
static EDUCATION_RE: Lazy<Regex> = Lazy::new(|| labelled_line(r"Degree|University|College"));
static SKILLS_RE: Lazy<Regex> = Lazy::new(|| labelled_line(r"Skills?|Expertise"));
static CERT_RE: Lazy<Regex> = Lazy::new(|| labelled_line(r"Certification|Certificate"));

const MAX_WORK: usize = 5;
const MAX_EDUCATION: usize = 3;
const MAX_SKILLS: usize = 10;
const MAX_CERTIFICATIONS: usize = 5;

fn labelled_line(labels: &str) -> Regex {
    Regex::new(&format!(r"(?im)(?:{labels}):[ \t]*([^\r\n]+?)[ \t]*\r?$")).expect("valid section regex")
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumeSections {
    pub personal_info: String,
    pub work_experience: Vec<String>,
    pub education: Vec<String>,
    pub skills: Vec<String>,
    pub certifications: Vec<String>,
}

impl ResumeSections {
    pub fn scrape(raw_text: &str) -> Self {
        let trimmed = raw_text.trim_start();
        let name = NAME_RE.find(trimmed).map(|m| format!("Name: {}", m.as_str()));
        let contact = EMAIL_RE
            .find(raw_text)
            .map(|m| format!("Contact: {}", m.as_str()));

        Self {
            personal_info: name.into_iter().chain(contact).collect::<Vec<_>>().join("\n"),
            work_experience: captures(&WORK_RE, raw_text, MAX_WORK),
            education: captures(&EDUCATION_RE, raw_text, MAX_EDUCATION),
            skills: captures(&SKILLS_RE, raw_text, MAX_SKILLS),
            certifications: captures(&CERT_RE, raw_text, MAX_CERTIFICATIONS),
        }
    }
}

fn captures(re: &Regex, text: &str, limit: usize) -> Vec<String> {
    re.captures_iter(text)
        .filter_map(|c| c.get(1).map(|m| m.as_str().to_string()))
        .take(limit)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const LABELLED: &str = "Jane Doe\njane.doe@example.com\n\
        Position: Staff Engineer at Acme\n\
        Role: Tech Lead\n\
        University: State University\n\
        Skills: Rust, Go, SQL\n\
        Expertise: Distributed systems\n\
        Certificate: AWS Solutions Architect\n";

    #[test]
    fn test_scrape_labelled_resume() {
        let sections = ResumeSections::scrape(LABELLED);
        assert_eq!(
            sections,
            ResumeSections {
                personal_info: "Name: Jane Doe\nContact: jane.doe@example.com".to_string(),
                work_experience: vec![
                    "Staff Engineer at Acme".to_string(),
                    "Tech Lead".to_string()
                ],
                education: vec!["State University".to_string()],
                skills: vec!["Rust, Go, SQL".to_string(), "Distributed systems".to_string()],
                certifications: vec!["AWS Solutions Architect".to_string()],
            }
        );
    }

    #[test]
    fn test_scrape_caps_each_section() {
        let text = (0..8)
            .map(|i| format!("Job: Role number {i}"))
            .collect::<Vec<_>>()
            .join("\n");
        assert_eq!(ResumeSections::scrape(&text).work_experience.len(), MAX_WORK);
    }

    #[test]
    fn test_scrape_unlabelled_text_is_empty() {
        let sections = ResumeSections::scrape("built things\nshipped more things");
        assert!(sections.personal_info.is_empty());
        assert!(sections.work_experience.is_empty());
        assert!(sections.skills.is_empty());
    }

    #[test]
    fn test_scrape_crlf_text_has_no_trailing_carriage_return() {
        let sections = ResumeSections::scrape("Jane Doe\r\nSkills: Rust, Go \r\nDegree: B.Sc.\r\n");
        assert_eq!(sections.skills, vec!["Rust, Go".to_string()]);
        assert_eq!(sections.education, vec!["B.Sc.".to_string()]);
    }

    #[test]
    fn test_labels_are_case_insensitive() {
        let sections = ResumeSections::scrape("SKILLS: Kubernetes");
        assert_eq!(sections.skills, vec!["Kubernetes".to_string()]);
    }
}
