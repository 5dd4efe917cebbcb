use anyhow::{Context, Result};
use log::debug;

use crate::poll::Clock;
use crate::survey::{Survey, SurveyClient, SurveyMetadata};

use super::validate_identifier;

/// List the surveys owned by the configured user
#[tracing::instrument(skip(client))]
pub async fn surveys_list<C: Clock>(client: &SurveyClient<C>, json: bool) -> Result<()> {
    let list = client
        .list_surveys()
        .await
        .context("Failed to list surveys")?;
    debug!("{} survey(s) for user {}", list.surveys.len(), list.user);

    if json {
        println!("{}", serde_json::to_string_pretty(&list.surveys)?);
    } else {
        print!("{}", render_survey_table(&list.surveys));
    }
    Ok(())
}

/// Show the metadata of one survey
#[tracing::instrument(skip(client))]
pub async fn surveys_info<C: Clock>(client: &SurveyClient<C>, alias: &str, json: bool) -> Result<()> {
    validate_identifier("alias", alias)?;
    let meta = client
        .survey_metadata(alias)
        .await
        .with_context(|| format!("Failed to get metadata for survey {}", alias))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&meta)?);
    } else {
        print!("{}", render_metadata(&meta));
    }
    Ok(())
}

pub(crate) fn render_survey_table(surveys: &[Survey]) -> String {
    let width = surveys
        .iter()
        .map(|s| s.alias.chars().count())
        .max()
        .unwrap_or(0)
        .max("ALIAS".len());

    let mut out = format!("{:<width$}  TITLE\n", "ALIAS", width = width);
    for survey in surveys {
        out.push_str(&format!(
            "{:<width$}  {}\n",
            survey.alias,
            survey.title,
            width = width
        ));
    }
    out
}

pub(crate) fn render_metadata(meta: &SurveyMetadata) -> String {
    let rows = [
        ("ID", meta.id.clone()),
        ("Alias", meta.alias.clone()),
        ("Title", meta.title.clone()),
        ("Type", meta.survey_type.clone()),
        ("Status", meta.status.clone()),
        ("Language", meta.language.clone()),
        ("Security", meta.security.clone()),
        ("Visibility", meta.visibility.clone()),
        ("Results", meta.results.to_string()),
        ("Contact", meta.contact.clone()),
        ("Start", meta.start.clone()),
        ("End", meta.end.clone()),
    ];

    rows.iter()
        .map(|(label, value)| format!("{:<12}{}\n", format!("{}:", label), value))
        .collect()
}
