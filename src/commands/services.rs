//! Service factory for building the survey client from configuration.

use anyhow::{Context, Result};
use log::debug;

use super::config::Config;
use crate::survey::SurveyClient;

/// Build a survey client from configuration
pub fn build_survey_client(config: &Config) -> Result<SurveyClient> {
    let client_config = config.client_config()?;
    debug!("Connecting to {}", client_config.base_url);
    SurveyClient::new(&client_config).context("Failed to set up HTTP client")
}
