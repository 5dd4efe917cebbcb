//! Knowledge about the server's login page and login response.

use std::sync::LazyLock;

use regex::Regex;
use reqwest::StatusCode;

/// Name of the form field (and meta tag) carrying the CSRF token.
pub const CSRF_FIELD: &str = "_csrf";

static CSRF_META_RE: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = r#"<meta\s+name="_csrf"\s+content="([^"]+)""#;
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid static regex '{pattern}': {e}"))
});

/// Parses what the session needs from the login handshake.
///
/// Kept narrow so that a change in the server's page layout only touches
/// an implementation of this trait.
pub trait LoginPage: Send + Sync {
    /// Extracts the anti-forgery token from the login page HTML.
    fn csrf_token(&self, html: &str) -> Option<String>;

    /// Whether the login POST status means the credentials were accepted.
    fn login_accepted(&self, status: StatusCode) -> bool;
}

/// The EUSurvey login page: token in `<meta name="_csrf" content="...">`,
/// success answered with a redirect (302) or a plain 200.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetaTagLoginPage;

impl LoginPage for MetaTagLoginPage {
    fn csrf_token(&self, html: &str) -> Option<String> {
        CSRF_META_RE
            .captures(html)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }

    fn login_accepted(&self, status: StatusCode) -> bool {
        status == StatusCode::FOUND || status == StatusCode::OK
    }
}
