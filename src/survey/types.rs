//! Records returned by the XML webservice.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

/// `/webservice/getMySurveys`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SurveyList {
    #[serde(rename(deserialize = "@user"), default)]
    pub user: String,
    #[serde(rename(deserialize = "Survey"), default)]
    pub surveys: Vec<Survey>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Survey {
    #[serde(rename(deserialize = "@uid"), default)]
    pub uid: String,
    #[serde(rename(deserialize = "@alias"), default)]
    pub alias: String,
    #[serde(rename(deserialize = "Title"), default)]
    pub title: String,
}

/// `/webservice/getSurveyMetadata/{alias}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurveyMetadata {
    #[serde(rename(deserialize = "@id"))]
    pub id: String,
    #[serde(rename(deserialize = "@alias"))]
    pub alias: String,
    #[serde(rename(deserialize = "SurveyType"))]
    pub survey_type: String,
    #[serde(rename(deserialize = "Title"))]
    pub title: String,
    #[serde(rename(deserialize = "PivotLanguage"))]
    pub language: String,
    #[serde(rename(deserialize = "Contact"))]
    pub contact: String,
    #[serde(rename(deserialize = "Status"))]
    pub status: String,
    #[serde(rename(deserialize = "Start"))]
    pub start: String,
    #[serde(rename(deserialize = "End"))]
    pub end: String,
    #[serde(rename(deserialize = "Results"), deserialize_with = "count")]
    pub results: u64,
    #[serde(rename(deserialize = "Security"))]
    pub security: String,
    #[serde(rename(deserialize = "Visibility"))]
    pub visibility: String,
}

// An empty count reads as zero; anything else must be a number.
fn count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let raw = String::deserialize(deserializer)?;
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(0);
    }
    raw.parse()
        .map_err(|_| D::Error::custom(format!("invalid results count {:?}", raw)))
}

/// Decodes a webservice XML body.
///
/// The server sometimes sends Latin-1 bytes inside documents declared as
/// UTF-8; such bytes become U+FFFD instead of failing the whole parse.
pub fn parse_xml<T: serde::de::DeserializeOwned>(body: &[u8]) -> Result<T, quick_xml::DeError> {
    let text = String::from_utf8_lossy(body);
    quick_xml::de::from_str(&text)
}
