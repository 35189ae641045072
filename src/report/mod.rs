pub mod json;
pub mod md;
pub mod ranked;

use crate::error::MisrankError;
use crate::types::summary::RunSummary;

#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    Md,
    Json,
}

pub fn render_summary(
    summary: &RunSummary,
    format: OutputFormat,
) -> Result<String, MisrankError> {
    match format {
        OutputFormat::Json => json::to_json(summary).map_err(MisrankError::Json),
        OutputFormat::Md => Ok(md::to_markdown(summary)),
    }
}
