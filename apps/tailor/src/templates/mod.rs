//! Prompt/template catalog: static pairings of an LLM system prompt and a
//! LaTeX layout, looked up by id. Built once, never mutated, so it is shared
//! freely across request handlers without locking.

pub mod prompts;
pub mod skeletons;

use once_cell::sync::Lazy;
use serde::Serialize;
use thiserror::Error;

pub const DEFAULT_RESUME_TEMPLATE: &str = "optimize";
pub const GAP_ANALYSIS_TEMPLATE: &str = "gap-analysis";
pub const JOB_EXTRACTION_TEMPLATE: &str = "job-extraction";

#[derive(Debug, Error)]
#[error("Unknown template: {0:?}")]
pub struct UnknownTemplateError(pub String);

/// Résumé sections the LaTeX generator knows how to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Education,
    Experience,
    Projects,
    Skills,
    Awards,
}

/// How a résumé-producing template is laid out in LaTeX.
#[derive(Debug)]
pub struct LatexLayout {
    /// Full document with `{{NAME}}`, `{{CONTACT}}` and `{{BODY}}` placeholders.
    pub skeleton: &'static str,
    /// `\section` or `\section*`.
    pub section_command: &'static str,
    /// Render order and heading text. Sections not listed are not rendered.
    pub sections: &'static [(Section, &'static str)],
}

#[derive(Debug)]
pub enum TemplateOutput {
    Resume(LatexLayout),
    GapAnalysis,
    JobListing,
}

#[derive(Debug)]
pub struct PromptTemplate {
    pub id: &'static str,
    pub title: &'static str,
    pub system_prompt: &'static str,
    pub output: TemplateOutput,
}

impl PromptTemplate {
    pub fn latex_layout(&self) -> Option<&LatexLayout> {
        match &self.output {
            TemplateOutput::Resume(layout) => Some(layout),
            TemplateOutput::GapAnalysis | TemplateOutput::JobListing => None,
        }
    }

    /// Instruction describing the JSON the model must return for this template.
    pub fn response_format(&self) -> &'static str {
        match self.output {
            TemplateOutput::Resume(_) => prompts::RESUME_RESPONSE_FORMAT,
            TemplateOutput::GapAnalysis => prompts::GAP_ANALYSIS_RESPONSE_FORMAT,
            TemplateOutput::JobListing => prompts::JOB_LISTING_RESPONSE_FORMAT,
        }
    }

    pub fn output_kind(&self) -> &'static str {
        match self.output {
            TemplateOutput::Resume(_) => "resume",
            TemplateOutput::GapAnalysis => "gap_analysis",
            TemplateOutput::JobListing => "job_listing",
        }
    }
}

/// Catalog listing entry.
#[derive(Debug, Serialize)]
pub struct TemplateSummary {
    pub id: &'static str,
    pub title: &'static str,
    pub output: &'static str,
}

pub struct TemplateCatalog {
    templates: Vec<PromptTemplate>,
}

/// The process-wide catalog.
pub static CATALOG: Lazy<TemplateCatalog> = Lazy::new(TemplateCatalog::builtin);

/// Software-engineering layout used by the default résumé template.
pub const SWE_LAYOUT: LatexLayout = LatexLayout {
    skeleton: skeletons::SWE,
    section_command: r"\section",
    sections: &[
        (Section::Education, "Education"),
        (Section::Experience, "Experience"),
        (Section::Projects, "Projects"),
        (Section::Skills, "Technical Skills"),
        (Section::Awards, "Awards"),
    ],
};

impl TemplateCatalog {
    pub fn builtin() -> Self {
        use Section::*;

        let templates = vec![
            PromptTemplate {
                id: DEFAULT_RESUME_TEMPLATE,
                title: "Software Engineer (optimized)",
                system_prompt: prompts::OPTIMIZE_SYSTEM,
                output: TemplateOutput::Resume(SWE_LAYOUT),
            },
            PromptTemplate {
                id: GAP_ANALYSIS_TEMPLATE,
                title: "Gap analysis",
                system_prompt: prompts::GAP_ANALYSIS_SYSTEM,
                output: TemplateOutput::GapAnalysis,
            },
            PromptTemplate {
                id: JOB_EXTRACTION_TEMPLATE,
                title: "Job listing extraction",
                system_prompt: prompts::JOB_EXTRACTION_SYSTEM,
                output: TemplateOutput::JobListing,
            },
            PromptTemplate {
                id: "classic",
                title: "Classic",
                system_prompt: prompts::CLASSIC_SYSTEM,
                output: TemplateOutput::Resume(LatexLayout {
                    skeleton: skeletons::CLASSIC,
                    section_command: r"\section*",
                    sections: &[
                        (Experience, "Work Experience"),
                        (Education, "Education"),
                        (Skills, "Skills"),
                        (Projects, "Projects"),
                        (Awards, "Awards"),
                    ],
                }),
            },
            PromptTemplate {
                id: "modern",
                title: "Modern",
                system_prompt: prompts::MODERN_SYSTEM,
                output: TemplateOutput::Resume(LatexLayout {
                    skeleton: skeletons::MODERN,
                    section_command: r"\section*",
                    sections: &[
                        (Experience, "Professional Experience"),
                        (Projects, "Selected Projects"),
                        (Skills, "Technical Skills"),
                        (Education, "Education"),
                    ],
                }),
            },
            PromptTemplate {
                id: "academic",
                title: "Academic CV",
                system_prompt: prompts::ACADEMIC_SYSTEM,
                output: TemplateOutput::Resume(LatexLayout {
                    skeleton: skeletons::ACADEMIC,
                    section_command: r"\section*",
                    sections: &[
                        (Education, "Academic Background"),
                        (Experience, "Research Experience"),
                        (Projects, "Research Projects"),
                        (Awards, "Honors and Publications"),
                        (Skills, "Skills"),
                    ],
                }),
            },
            PromptTemplate {
                id: "creative",
                title: "Creative",
                system_prompt: prompts::CREATIVE_SYSTEM,
                output: TemplateOutput::Resume(LatexLayout {
                    skeleton: skeletons::CREATIVE,
                    section_command: r"\section*",
                    sections: &[
                        (Experience, "Key Experiences"),
                        (Projects, "Things I Built"),
                        (Skills, "Skills Palette"),
                        (Education, "Education"),
                    ],
                }),
            },
            PromptTemplate {
                id: "executive",
                title: "Executive",
                system_prompt: prompts::EXECUTIVE_SYSTEM,
                output: TemplateOutput::Resume(LatexLayout {
                    skeleton: skeletons::EXECUTIVE,
                    section_command: r"\section*",
                    sections: &[
                        (Experience, "Leadership Experience"),
                        (Skills, "Strategic Skills"),
                        (Education, r"Education \& Credentials"),
                        (Awards, "Recognition"),
                    ],
                }),
            },
        ];

        Self { templates }
    }

    pub fn get(&self, id: &str) -> Result<&PromptTemplate, UnknownTemplateError> {
        self.templates
            .iter()
            .find(|t| t.id == id)
            .ok_or_else(|| UnknownTemplateError(id.to_string()))
    }

    /// Looks up `id`, falling back to the default résumé template when absent.
    pub fn get_or_default(&self, id: Option<&str>) -> Result<&PromptTemplate, UnknownTemplateError> {
        match id {
            Some(id) => self.get(id),
            None => Ok(self.default_resume()),
        }
    }

    pub fn default_resume(&self) -> &PromptTemplate {
        self.templates
            .iter()
            .find(|t| t.id == DEFAULT_RESUME_TEMPLATE)
            .unwrap_or(&self.templates[0])
    }

    pub fn list(&self) -> Vec<TemplateSummary> {
        self.templates
            .iter()
            .map(|t| TemplateSummary {
                id: t.id,
                title: t.title,
                output: t.output_kind(),
            })
            .collect()
    }
}
