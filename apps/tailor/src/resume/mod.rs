//! Résumé data: the canonical schema, the normalizer that maps LLM replies
//! onto it, and LaTeX generation.

pub mod handlers;
pub mod latex;
pub mod normalize;
pub mod schema;

pub use latex::{generate, generate_with, GeneratedLatex};
pub use normalize::{normalize, NormalizationError};
pub use schema::ResumeSchema;

use crate::errors::AppError;
use crate::templates::{LatexLayout, PromptTemplate, CATALOG};

/// Resolves a résumé-producing template and its layout (default: optimize).
pub fn resume_template(
    id: Option<&str>,
) -> Result<(&'static PromptTemplate, &'static LatexLayout), AppError> {
    let template = CATALOG.get_or_default(id)?;
    let layout = template.latex_layout().ok_or_else(|| {
        AppError::Validation(format!(
            "Template {:?} does not produce a résumé",
            template.id
        ))
    })?;
    Ok((template, layout))
}
