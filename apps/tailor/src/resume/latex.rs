//! LaTeX generation from a normalized [`ResumeSchema`].
//!
//! Pure string templating: no I/O, and identical input always yields
//! byte-identical output. Every user-controlled string goes through
//! [`escape_latex`] (or [`escape_url`] inside `\href`) before insertion.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use super::schema::{Contact, Education, Experience, Project, ResumeSchema, Skills};
use crate::templates::{skeletons, LatexLayout, Section, SWE_LAYOUT};

static USEPACKAGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\usepackage(?:\[[^\]]*\])?\{([^}]*)\}").expect("valid usepackage regex")
});

const CONTACT_SEPARATOR: &str = r" $|$ ";
const LINE_BREAK: &str = " \\\\\n    ";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedLatex {
    pub tex_source: String,
    pub required_packages: Vec<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Escaping
// ────────────────────────────────────────────────────────────────────────────

/// Escapes LaTeX special characters in a single pass, so the backslash
/// introduced by one escape is never re-escaped.
pub fn escape_latex(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + input.len() / 4);
    for c in input.chars() {
        match c {
            '\\' => out.push_str(r"\textbackslash{}"),
            '&' | '%' | '$' | '#' | '_' | '{' | '}' => {
                out.push('\\');
                out.push(c);
            }
            '~' => out.push_str(r"\textasciitilde{}"),
            '^' => out.push_str(r"\textasciicircum{}"),
            _ => out.push(c),
        }
    }
    out
}

/// Inverse of [`escape_latex`]. Sequences it never produces are left as-is.
#[cfg_attr(not(test), allow(dead_code))]
pub fn unescape_latex(input: &str) -> String {
    const WORDS: &[(&str, char)] = &[
        (r"\textbackslash{}", '\\'),
        (r"\textasciitilde{}", '~'),
        (r"\textasciicircum{}", '^'),
    ];

    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    'scan: while let Some(c) = rest.chars().next() {
        if c == '\\' {
            for (word, literal) in WORDS {
                if let Some(tail) = rest.strip_prefix(word) {
                    out.push(*literal);
                    rest = tail;
                    continue 'scan;
                }
            }
            if let Some(next) = rest[1..].chars().next() {
                if "&%$#_{}".contains(next) {
                    out.push(next);
                    rest = &rest[1 + next.len_utf8()..];
                    continue;
                }
            }
        }
        out.push(c);
        rest = &rest[c.len_utf8()..];
    }
    out
}

/// Prepares a URL for the first argument of `\href`. Bare hosts such as
/// `github.com/jane` get an `https://` scheme.
pub fn escape_url(url: &str) -> String {
    let url = url.trim();
    let url = if url.contains("://") || url.starts_with("mailto:") {
        url.to_string()
    } else {
        format!("https://{url}")
    };

    let mut out = String::with_capacity(url.len());
    for c in url.chars() {
        match c {
            '%' | '#' => {
                out.push('\\');
                out.push(c);
            }
            '\\' => out.push_str(r"\%5C"),
            '{' => out.push_str(r"\%7B"),
            '}' => out.push_str(r"\%7D"),
            _ => out.push(c),
        }
    }
    out
}

// ────────────────────────────────────────────────────────────────────────────
// Generation
// ────────────────────────────────────────────────────────────────────────────

/// Renders `resume` with the default software-engineering layout.
pub fn generate(resume: &ResumeSchema) -> GeneratedLatex {
    generate_with(resume, &SWE_LAYOUT)
}

/// Renders `resume` with any résumé layout from the catalog.
pub fn generate_with(resume: &ResumeSchema, layout: &LatexLayout) -> GeneratedLatex {
    let body = layout
        .sections
        .iter()
        .filter_map(|(section, heading)| {
            let content = match section {
                Section::Education => education_block(&resume.education),
                Section::Experience => experience_block(&resume.experience),
                Section::Projects => projects_block(&resume.projects),
                Section::Skills => skills_block(&resume.skills),
                Section::Awards => awards_block(&resume.awards),
            }?;
            Some(format!("{}{{{heading}}}\n{content}", layout.section_command))
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    let tex_source = layout
        .skeleton
        .replacen(skeletons::NAME, &escape_latex(&resume.name), 1)
        .replacen(skeletons::CONTACT, &contact_line(&resume.contact), 1)
        .replacen(skeletons::BODY, &body, 1);

    GeneratedLatex {
        tex_source,
        required_packages: required_packages(layout.skeleton),
    }
}

/// Package names from `\usepackage` lines, in order of first appearance.
pub fn required_packages(skeleton: &str) -> Vec<String> {
    let mut packages: Vec<String> = Vec::new();
    for caps in USEPACKAGE_RE.captures_iter(skeleton) {
        for name in caps[1].split(',').map(str::trim).filter(|n| !n.is_empty()) {
            if !packages.iter().any(|p| p == name) {
                packages.push(name.to_string());
            }
        }
    }
    packages
}

fn contact_line(contact: &Contact) -> String {
    let mut items = Vec::new();
    if let Some(phone) = &contact.phone {
        items.push(escape_latex(phone));
    }
    if let Some(email) = &contact.email {
        items.push(format!(
            r"\href{{{}}}{{\underline{{{}}}}}",
            escape_url(&format!("mailto:{email}")),
            escape_latex(email)
        ));
    }
    if let Some(location) = &contact.location {
        items.push(escape_latex(location));
    }
    for url in [&contact.linkedin, &contact.github, &contact.website]
        .into_iter()
        .flatten()
    {
        items.push(link(url));
    }
    items.join(CONTACT_SEPARATOR)
}

/// `\href` with the scheme and trailing slash dropped from the visible text.
fn link(url: &str) -> String {
    let display = url.trim();
    let display = display
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(display)
        .trim_end_matches('/');
    format!(
        r"\href{{{}}}{{\underline{{{}}}}}",
        escape_url(url),
        escape_latex(display)
    )
}

fn education_block(education: &[Education]) -> Option<String> {
    let items = education.iter().map(|entry| {
        let mut lines = vec![headline(&entry.institution, &entry.dates)];

        let mut degree = escape_latex(&entry.degree);
        if let Some(field) = &entry.field {
            if !degree.is_empty() {
                degree.push_str(" in ");
            }
            degree.push_str(&escape_latex(field));
        }
        let mut second = if degree.is_empty() {
            String::new()
        } else {
            format!(r"\textit{{{degree}}}")
        };
        if let Some(gpa) = &entry.gpa {
            second.push_str(&format!(r" \hfill GPA: {}", escape_latex(gpa)));
        }
        if !second.is_empty() {
            lines.push(second.trim_start().to_string());
        }

        format!("  \\item {}", lines.join(LINE_BREAK))
    });
    list(r"[leftmargin=0.15in, label={}]", items)
}

fn experience_block(experience: &[Experience]) -> Option<String> {
    let items = experience.iter().map(|entry| {
        let (heading, subheading) = if entry.title.is_empty() {
            (&entry.company, None)
        } else {
            (&entry.title, Some(&entry.company).filter(|c| !c.is_empty()))
        };
        let mut lines = vec![headline(heading, &entry.dates)];

        let mut second = subheading
            .map(|company| format!(r"\textit{{{}}}", escape_latex(company)))
            .unwrap_or_default();
        if let Some(location) = &entry.location {
            second.push_str(&format!(r" \hfill \textit{{{}}}", escape_latex(location)));
        }
        if !second.is_empty() {
            lines.push(second.trim_start().to_string());
        }

        let mut item = format!("  \\item {}", lines.join(LINE_BREAK));
        if !entry.achievements.is_empty() {
            item.push_str("\n  \\begin{itemize}[leftmargin=0.2in]\n");
            for achievement in &entry.achievements {
                item.push_str(&format!("    \\item {}\n", escape_latex(achievement)));
            }
            item.push_str("  \\end{itemize}");
        }
        item
    });
    list(r"[leftmargin=0.15in, label={}]", items)
}

fn projects_block(projects: &[Project]) -> Option<String> {
    let items = projects.iter().map(|project| {
        let mut first = format!(r"\textbf{{{}}}", escape_latex(&project.name));
        if !project.technologies.is_empty() {
            let technologies: Vec<String> =
                project.technologies.iter().map(|t| escape_latex(t)).collect();
            first.push_str(&format!(r" $|$ \emph{{{}}}", technologies.join(", ")));
        }
        let mut lines = vec![first];
        if !project.description.is_empty() {
            lines.push(escape_latex(&project.description));
        }
        format!("  \\item {}", lines.join(LINE_BREAK))
    });
    list(r"[leftmargin=0.15in, label={}]", items)
}

fn skills_block(skills: &Skills) -> Option<String> {
    let groups: Vec<String> = [
        ("Languages", &skills.languages),
        ("Frameworks", &skills.frameworks),
        ("Developer Tools", &skills.tools),
    ]
    .into_iter()
    .filter(|(_, items)| !items.is_empty())
    .map(|(label, items)| {
        let items: Vec<String> = items.iter().map(|s| escape_latex(s)).collect();
        format!(r"\textbf{{{label}}}{{: {}}}", items.join(", "))
    })
    .collect();

    if groups.is_empty() {
        return None;
    }
    list(
        r"[leftmargin=0.15in, label={}]",
        std::iter::once(format!("  \\item {}", groups.join(LINE_BREAK))),
    )
}

fn awards_block(awards: &[String]) -> Option<String> {
    list(
        r"[leftmargin=0.2in]",
        awards.iter().map(|a| format!("  \\item {}", escape_latex(a))),
    )
}

/// Bold heading with right-aligned dates when present.
fn headline(heading: &str, dates: &str) -> String {
    let mut line = format!(r"\textbf{{{}}}", escape_latex(heading));
    if !dates.is_empty() {
        line.push_str(&format!(r" \hfill {}", escape_latex(dates)));
    }
    line
}

/// Wraps items in an enumitem `itemize`; `None` when there are no items.
fn list(options: &str, items: impl Iterator<Item = String>) -> Option<String> {
    let items: Vec<String> = items.collect();
    if items.is_empty() {
        return None;
    }
    Some(format!(
        "\\begin{{itemize}}{options}\n{}\n\\end{{itemize}}",
        items.join("\n")
    ))
}
