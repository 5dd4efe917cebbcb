//! Cookie session for the endpoints that are not exposed through the
//! Basic-Auth webservice.
//!
//! The session logs in at most once per process: after the first successful
//! handshake the transport's cookie jar carries it for every later call.

mod login_page;

use log::{debug, info};
use tokio::sync::Mutex;

use crate::error::{AuthError, ClientResult};
use crate::http::{HttpClient, RawResponse};

pub use login_page::{CSRF_FIELD, LoginPage, MetaTagLoginPage};

pub const LOGIN_PAGE_PATH: &str = "/auth/login";
pub const LOGIN_PATH: &str = "/login";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Authenticated,
}

pub struct Session {
    http: HttpClient,
    username: String,
    password: String,
    page: Box<dyn LoginPage>,
    state: Mutex<SessionState>,
}

impl Session {
    pub fn new(http: HttpClient, username: &str, password: &str) -> Self {
        Self::with_login_page(http, username, password, Box::new(MetaTagLoginPage))
    }

    pub fn with_login_page(
        http: HttpClient,
        username: &str,
        password: &str,
        page: Box<dyn LoginPage>,
    ) -> Self {
        Self {
            http,
            username: username.to_string(),
            password: password.to_string(),
            page,
            state: Mutex::new(SessionState::Unauthenticated),
        }
    }

    pub async fn state(&self) -> SessionState {
        *self.state.lock().await
    }

    /// Performs the CSRF login handshake unless already logged in.
    ///
    /// Safe to call before every session-dependent request; once logged in it
    /// returns without touching the network. The state lock is held for the
    /// whole handshake so it can never run twice.
    #[tracing::instrument(skip(self))]
    pub async fn login(&self) -> ClientResult<()> {
        let mut state = self.state.lock().await;
        if *state == SessionState::Authenticated {
            return Ok(());
        }

        debug!("Fetching login page...");
        let page = self
            .http
            .execute(LOGIN_PAGE_PATH, self.http.get(LOGIN_PAGE_PATH))
            .await?;

        let csrf = self
            .page
            .csrf_token(&page.text())
            .ok_or(AuthError::CsrfNotFound)?;
        debug!("CSRF token found ({} chars)", csrf.len());

        let form = [
            ("username", self.username.as_str()),
            ("password", self.password.as_str()),
            (CSRF_FIELD, csrf.as_str()),
        ];
        let response = self
            .http
            .execute(LOGIN_PATH, self.http.post(LOGIN_PATH).form(&form))
            .await?;

        if !self.page.login_accepted(response.status) {
            return Err(AuthError::LoginFailed(response.status).into());
        }

        *state = SessionState::Authenticated;
        info!("Logged in to EUSurvey as {}", self.username);
        Ok(())
    }

    /// GET on a session-protected endpoint, logging in first if needed.
    /// The status is left for the caller to judge.
    pub async fn get(&self, path: &str) -> ClientResult<RawResponse> {
        self.login().await?;
        self.http.execute(path, self.http.get(path)).await
    }
}
