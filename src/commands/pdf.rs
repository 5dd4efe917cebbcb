use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::poll::Clock;
use crate::runtime::Runtime;
use crate::survey::SurveyClient;

use super::config::Config;
use super::{validate_identifier, write_output};

/// Download the blank survey form as PDF
#[tracing::instrument(skip(runtime, config, client))]
pub async fn pdf_survey<R: Runtime, C: Clock>(
    runtime: &R,
    config: &Config,
    client: &SurveyClient<C>,
    alias: &str,
    output: Option<PathBuf>,
) -> Result<PathBuf> {
    validate_identifier("alias", alias)?;

    let data = client
        .survey_pdf(alias)
        .await
        .with_context(|| format!("Failed to download survey PDF for {}", alias))?;

    let output = output.unwrap_or_else(|| config.output_dir.join(format!("{}.pdf", alias)));
    write_output(runtime, &output, &data, "Survey PDF")?;
    Ok(output)
}

/// Download the PDF of one respondent's answers, generating it if needed
#[tracing::instrument(skip(runtime, config, client))]
pub async fn pdf_answer<R: Runtime, C: Clock>(
    runtime: &R,
    config: &Config,
    client: &SurveyClient<C>,
    code: &str,
    output_dir: Option<PathBuf>,
) -> Result<PathBuf> {
    validate_identifier("contribution code", code)?;

    let data = client
        .answer_pdf(code)
        .await
        .with_context(|| format!("Failed to get answer PDF for {}", code))?;

    let dir = output_dir.unwrap_or_else(|| config.output_dir.clone());
    let output = answer_pdf_file(&dir, code);
    runtime
        .create_dir_all(&dir)
        .with_context(|| format!("Failed to create output directory {:?}", dir))?;
    write_output(runtime, &output, &data, "Answer PDF")?;
    Ok(output)
}

pub(crate) fn answer_pdf_file(dir: &Path, code: &str) -> PathBuf {
    dir.join(format!("{}.pdf", code))
}
