use anyhow::{Context, Result, bail};
use log::{info, warn};
use std::path::Path;

use crate::runtime::Runtime;

pub mod config;
mod pdf;
mod results;
mod services;
mod surveys;

pub use pdf::{pdf_answer, pdf_survey};
pub use results::{ExportOptions, default_results_path, results_export};
pub use services::build_survey_client;
pub use surveys::{surveys_info, surveys_list};

/// Rejects values that would change the shape of the request path.
pub(crate) fn validate_identifier(kind: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        bail!("{} must not be empty", kind);
    }
    if value.contains('/') || value.chars().any(char::is_whitespace) {
        bail!("invalid {} {:?}", kind, value);
    }
    Ok(())
}

/// Writes a downloaded document in one go once it is complete.
pub(crate) fn write_output<R: Runtime>(runtime: &R, path: &Path, data: &[u8], what: &str) -> Result<()> {
    if runtime.exists(path) {
        warn!("Overwriting existing file {:?}", path);
    }
    runtime
        .write(path, data)
        .with_context(|| format!("Failed to write {}", what))?;
    info!("{} saved to {:?} ({} bytes)", what, path, data.len());
    Ok(())
}
