//! Maps a loosely-shaped LLM reply onto [`ResumeSchema`].
//!
//! The reply is read as a generic JSON map and every target field is resolved
//! from a prioritized alias list, since field names vary with the prompt
//! template (and model) that produced the reply. Values are type-checked
//! before use; anything unusable falls back to empty.

use serde_json::{Map, Value};
use thiserror::Error;

use super::schema::{Contact, Education, Experience, Project, ResumeSchema, Skills};

type Object = Map<String, Value>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NormalizationError {
    #[error("Missing required field: {0}")]
    MissingRequiredField(&'static str),
}

// ────────────────────────────────────────────────────────────────────────────
// Alias tables
// ────────────────────────────────────────────────────────────────────────────

const WRAPPER_KEYS: &[&str] = &["resume", "data"];
const CONTACT_OBJECTS: &[&str] = &["contact_info", "contact", "basics", "personal_info"];
const NAME_KEYS: &[&str] = &["name", "full_name", "fullName"];

const EMAIL_KEYS: &[&str] = &["email", "email_address", "mail"];
const PHONE_KEYS: &[&str] = &["phone", "phone_number", "telephone", "mobile"];
const LOCATION_KEYS: &[&str] = &["location", "address", "city"];
const LINKEDIN_KEYS: &[&str] = &["linkedin", "linkedin_url", "linkedIn"];
const GITHUB_KEYS: &[&str] = &["github", "github_url", "gitHub"];
const WEBSITE_KEYS: &[&str] = &["website", "portfolio", "homepage", "url"];

const EDUCATION_KEYS: &[&str] = &["education", "educations", "academic_background"];
const INSTITUTION_KEYS: &[&str] = &["institution", "university", "school", "college"];
const DEGREE_KEYS: &[&str] = &["degree", "studyType", "study_type"];
const FIELD_KEYS: &[&str] = &["field", "area", "major", "field_of_study"];
const GPA_KEYS: &[&str] = &["gpa", "score", "grade"];

const EXPERIENCE_KEYS: &[&str] = &[
    "experience",
    "work_experience",
    "work",
    "employment",
    "professional_experience",
];
const COMPANY_KEYS: &[&str] = &["company", "organization", "employer", "name"];
const TITLE_KEYS: &[&str] = &["title", "position", "role", "job_title"];
const ACHIEVEMENT_KEYS: &[&str] = &[
    "achievements",
    "highlights",
    "bullets",
    "responsibilities",
    "accomplishments",
];
const SUMMARY_KEYS: &[&str] = &["description", "summary"];

const PROJECT_KEYS: &[&str] = &["projects", "personal_projects"];
const PROJECT_NAME_KEYS: &[&str] = &["name", "title", "project_name"];
const PROJECT_DESCRIPTION_KEYS: &[&str] = &["description", "summary", "details"];
const TECHNOLOGY_KEYS: &[&str] = &["technologies", "tech_used", "tech_stack", "keywords"];

const SKILLS_KEYS: &[&str] = &["skills", "technical_skills"];
const LANGUAGE_KEYS: &[&str] = &["languages", "programming_languages"];
const FRAMEWORK_KEYS: &[&str] = &["frameworks", "libraries", "frameworks_libraries"];
const TOOL_KEYS: &[&str] = &["tools", "platforms", "developer_tools", "technologies"];

const AWARD_KEYS: &[&str] = &["awards", "honors", "certifications"];
const AWARD_TITLE_KEYS: &[&str] = &["title", "name"];
const AWARDER_KEYS: &[&str] = &["awarder", "issuer", "organization"];
const AWARD_DATE_KEYS: &[&str] = &["date", "year"];

const DATES_KEYS: &[&str] = &["dates", "date", "duration", "graduation_date", "graduationDate"];
const START_KEYS: &[&str] = &["start_date", "startDate", "start"];
const END_KEYS: &[&str] = &["end_date", "endDate", "end"];

// ────────────────────────────────────────────────────────────────────────────
// Entry point
// ────────────────────────────────────────────────────────────────────────────

/// Normalizes an arbitrary LLM reply. Only an unresolvable `name` is an error.
pub fn normalize(reply: &Value) -> Result<ResumeSchema, NormalizationError> {
    let empty = Object::new();
    let root = resolve_root(reply).unwrap_or(&empty);
    let contact_sources = contact_sources(root);

    let name = first_text(root, NAME_KEYS)
        .or_else(|| {
            contact_sources
                .iter()
                .find_map(|source| first_text(source, NAME_KEYS))
        })
        .ok_or(NormalizationError::MissingRequiredField("name"))?;

    Ok(ResumeSchema {
        name,
        contact: normalize_contact(&contact_sources),
        education: entries(root, EDUCATION_KEYS)
            .filter_map(normalize_education)
            .collect(),
        experience: entries(root, EXPERIENCE_KEYS)
            .filter_map(normalize_experience)
            .collect(),
        projects: entries(root, PROJECT_KEYS)
            .filter_map(normalize_project)
            .collect(),
        skills: first(root, SKILLS_KEYS)
            .map(normalize_skills)
            .unwrap_or_default(),
        awards: normalize_awards(root),
    })
}

fn resolve_root(reply: &Value) -> Option<&Object> {
    let object = reply.as_object()?;
    WRAPPER_KEYS
        .iter()
        .find_map(|key| object.get(*key).and_then(Value::as_object))
        .or(Some(object))
}

/// Objects that may carry contact details, most specific first; root last.
fn contact_sources(root: &Object) -> Vec<&Object> {
    CONTACT_OBJECTS
        .iter()
        .filter_map(|key| root.get(*key).and_then(Value::as_object))
        .chain(std::iter::once(root))
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Sections
// ────────────────────────────────────────────────────────────────────────────

fn normalize_contact(sources: &[&Object]) -> Contact {
    let lookup = |keys: &[&str]| sources.iter().find_map(|source| first_text(source, keys));

    let mut contact = Contact {
        email: lookup(EMAIL_KEYS),
        phone: lookup(PHONE_KEYS),
        location: lookup(LOCATION_KEYS).or_else(|| {
            sources
                .iter()
                .find_map(|source| source.get("location").and_then(location_object))
        }),
        linkedin: lookup(LINKEDIN_KEYS),
        github: lookup(GITHUB_KEYS),
        website: lookup(WEBSITE_KEYS),
    };

    // JSON-Resume style `profiles: [{network, url}]`.
    let profiles = sources
        .iter()
        .filter_map(|source| source.get("profiles").and_then(Value::as_array))
        .flatten()
        .filter_map(Value::as_object);
    for profile in profiles {
        let network = first_text(profile, &["network"])
            .unwrap_or_default()
            .to_lowercase();
        let Some(url) = first_text(profile, &["url"]) else {
            continue;
        };
        if network.contains("linkedin") || url.contains("linkedin.com") {
            if contact.linkedin.is_none() {
                contact.linkedin = Some(url);
            }
        } else if (network.contains("github") || url.contains("github.com"))
            && contact.github.is_none()
        {
            contact.github = Some(url);
        }
    }

    contact
}

fn normalize_education(value: &Value) -> Option<Education> {
    let education = match value {
        Value::Object(entry) => Education {
            institution: first_text(entry, INSTITUTION_KEYS).unwrap_or_default(),
            degree: first_text(entry, DEGREE_KEYS).unwrap_or_default(),
            field: first_text(entry, FIELD_KEYS),
            dates: dates(entry),
            gpa: first_text(entry, GPA_KEYS),
        },
        other => Education {
            institution: text(other)?,
            ..Education::default()
        },
    };

    (!education.institution.is_empty() || !education.degree.is_empty()).then_some(education)
}

fn normalize_experience(value: &Value) -> Option<Experience> {
    let entry = value.as_object()?;

    let mut achievements = string_list(first(entry, ACHIEVEMENT_KEYS));
    if achievements.is_empty() {
        achievements.extend(first_text(entry, SUMMARY_KEYS));
    }

    let experience = Experience {
        company: first_text(entry, COMPANY_KEYS).unwrap_or_default(),
        title: first_text(entry, TITLE_KEYS).unwrap_or_default(),
        location: first_text(entry, &["location"]),
        dates: dates(entry),
        achievements,
    };

    (!experience.company.is_empty() || !experience.title.is_empty()).then_some(experience)
}

fn normalize_project(value: &Value) -> Option<Project> {
    let project = match value {
        Value::Object(entry) => Project {
            name: first_text(entry, PROJECT_NAME_KEYS).unwrap_or_default(),
            description: match first(entry, PROJECT_DESCRIPTION_KEYS) {
                Some(list @ Value::Array(_)) => string_list(Some(list)).join(" "),
                Some(other) => text(other).unwrap_or_default(),
                None => String::new(),
            },
            technologies: string_list(first(entry, TECHNOLOGY_KEYS)),
        },
        other => Project {
            name: text(other)?,
            ..Project::default()
        },
    };

    (!project.name.is_empty() || !project.description.is_empty()).then_some(project)
}

fn normalize_skills(value: &Value) -> Skills {
    let mut skills = Skills::default();

    match value {
        Value::Object(groups) => {
            for (key, group) in groups {
                let bucket = if LANGUAGE_KEYS.contains(&key.as_str()) {
                    &mut skills.languages
                } else if FRAMEWORK_KEYS.contains(&key.as_str()) {
                    &mut skills.frameworks
                } else {
                    &mut skills.tools
                };
                extend_unique(bucket, string_list(Some(group)));
            }
            // `tools` collected extra categories in map order; keep the
            // canonical keys ahead of them.
            let canonical = string_list(first(groups, TOOL_KEYS));
            if !canonical.is_empty() {
                let rest: Vec<String> = skills
                    .tools
                    .drain(..)
                    .filter(|t| !canonical.contains(t))
                    .collect();
                skills.tools = canonical;
                extend_unique(&mut skills.tools, rest);
            }
        }
        Value::Array(items) => {
            for item in items {
                match item.as_object() {
                    Some(group) => {
                        let category = first_text(group, &["name", "category"]);
                        let keywords = string_list(first(group, &["keywords", "items", "skills"]));
                        if keywords.is_empty() {
                            extend_unique(&mut skills.tools, category);
                            continue;
                        }
                        let category = category.unwrap_or_default().to_lowercase();
                        let bucket = if category.contains("language") {
                            &mut skills.languages
                        } else if category.contains("framework") || category.contains("librar") {
                            &mut skills.frameworks
                        } else {
                            &mut skills.tools
                        };
                        extend_unique(bucket, keywords);
                    }
                    None => extend_unique(&mut skills.tools, text(item)),
                }
            }
        }
        other => extend_unique(&mut skills.tools, string_list(Some(other))),
    }

    skills
}

fn normalize_awards(root: &Object) -> Vec<String> {
    let mut awards = Vec::new();
    for key in AWARD_KEYS {
        let Some(value) = root.get(*key) else {
            continue;
        };
        let items = match value {
            Value::Array(items) => items.iter().collect(),
            other => vec![other],
        };
        let formatted = items.into_iter().filter_map(|item| match item {
            Value::Object(award) => format_award(award),
            other => text(other),
        });
        extend_unique(&mut awards, formatted);
    }
    awards
}

/// `Title, Awarder (Date)` with absent parts left out.
fn format_award(award: &Object) -> Option<String> {
    let title = first_text(award, AWARD_TITLE_KEYS)?;
    let mut formatted = match first_text(award, AWARDER_KEYS) {
        Some(awarder) => format!("{title}, {awarder}"),
        None => title,
    };
    if let Some(date) = first_text(award, AWARD_DATE_KEYS) {
        formatted.push_str(&format!(" ({date})"));
    }
    Some(formatted)
}

// ────────────────────────────────────────────────────────────────────────────
// Value helpers
// ────────────────────────────────────────────────────────────────────────────

/// Trimmed, non-empty text. Numbers are accepted (years, GPAs).
fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// First non-null value among `keys`.
fn first<'a>(object: &'a Object, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| object.get(*key))
        .find(|value| !value.is_null())
}

/// First alias that holds usable text.
fn first_text(object: &Object, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| object.get(*key).and_then(text))
}

/// Elements of the first list-ish value among `keys`; a lone object counts as
/// a one-element list.
fn entries<'a>(root: &'a Object, keys: &[&str]) -> impl Iterator<Item = &'a Value> {
    let items: Vec<&Value> = match first(root, keys) {
        Some(Value::Array(items)) => items.iter().collect(),
        Some(single @ Value::Object(_)) => vec![single],
        _ => Vec::new(),
    };
    items.into_iter()
}

/// Strings from an array (objects contribute their `name`/`text`), or a
/// comma-separated string.
fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::Object(object) => first_text(object, &["name", "text", "title", "description"]),
                other => text(other),
            })
            .collect(),
        Some(Value::String(s)) => s
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect(),
        Some(other) => text(other).into_iter().collect(),
        None => Vec::new(),
    }
}

fn dates(entry: &Object) -> String {
    if let Some(dates) = first_text(entry, DATES_KEYS) {
        return dates;
    }
    match (first_text(entry, START_KEYS), first_text(entry, END_KEYS)) {
        (Some(start), Some(end)) => format!("{start} – {end}"),
        (Some(start), None) => format!("{start} – Present"),
        (None, Some(end)) => end,
        (None, None) => String::new(),
    }
}

/// `{city, region, countryCode}` style location objects.
fn location_object(value: &Value) -> Option<String> {
    let object = value.as_object()?;
    let parts: Vec<String> = ["address", "city", "region", "countryCode", "country"]
        .iter()
        .filter_map(|key| object.get(*key).and_then(text))
        .collect();
    (!parts.is_empty()).then(|| parts.join(", "))
}

fn extend_unique(target: &mut Vec<String>, items: impl IntoIterator<Item = String>) {
    for item in items {
        if !target.contains(&item) {
            target.push(item);
        }
    }
}
