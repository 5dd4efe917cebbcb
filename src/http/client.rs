//! Transport: one configured reqwest client shared by every call of a run.
//!
//! The client keeps a cookie jar (the login session lives there), never
//! follows redirects and applies a single per-request timeout.

use std::fmt;
use std::time::Duration;

use log::debug;
use reqwest::{Client, RequestBuilder, StatusCode, header::HeaderMap, redirect::Policy};

use crate::error::{ClientError, ClientResult};

/// Default per-request timeout and poll deadline.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings for one client instance.
#[derive(Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub username: String,
    pub password: String,
    /// Skip TLS certificate verification. Explicit opt-in only.
    pub insecure_tls: bool,
    /// Per-request timeout.
    pub timeout: Duration,
    /// How long an asynchronous job may be polled before giving up.
    pub poll_timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: &str, username: &str, password: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            username: username.to_string(),
            password: password.to_string(),
            insecure_tls: false,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            poll_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &"***")
            .field("insecure_tls", &self.insecure_tls)
            .field("timeout", &self.timeout)
            .field("poll_timeout", &self.poll_timeout)
            .finish()
    }
}

/// Which statuses a caller accepts as success.
///
/// The server is not consistent across endpoints, so every call site picks
/// one explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuccessBand {
    Exactly200,
    Any2xx,
}

impl SuccessBand {
    pub fn accepts(self, status: StatusCode) -> bool {
        match self {
            SuccessBand::Exactly200 => status == StatusCode::OK,
            SuccessBand::Any2xx => status.is_success(),
        }
    }
}

/// A fully read response. Redirects arrive here untouched.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl RawResponse {
    /// Body as text, with invalid UTF-8 replaced.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Returns the response if its status is inside `band`, otherwise an
    /// `HttpStatus` error carrying the body as the server's message.
    pub fn require(self, endpoint: &str, band: SuccessBand) -> ClientResult<Self> {
        if band.accepts(self.status) {
            Ok(self)
        } else {
            Err(ClientError::HttpStatus {
                endpoint: endpoint.to_string(),
                status: self.status,
                body: self.text(),
            })
        }
    }
}

/// HTTP transport bound to one server.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
}

impl HttpClient {
    /// Wraps an already configured reqwest client.
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Builds the transport described by `config`.
    pub fn from_config(config: &ClientConfig) -> ClientResult<Self> {
        if config.insecure_tls {
            debug!("TLS certificate verification disabled");
        }

        let client = Client::builder()
            .user_agent("eusurveymgr-cli")
            .cookie_store(true)
            .danger_accept_invalid_certs(config.insecure_tls)
            .timeout(config.timeout)
            .redirect(Policy::none())
            .build()
            .map_err(|e| ClientError::transport("client setup", e))?;

        Ok(Self::new(client, &config.base_url))
    }

    /// Returns a reference to the underlying reqwest Client.
    pub fn inner(&self) -> &Client {
        &self.client
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn get(&self, path: &str) -> RequestBuilder {
        self.client.get(self.url(path))
    }

    pub fn post(&self, path: &str) -> RequestBuilder {
        self.client.post(self.url(path))
    }

    /// Sends `request` and reads the whole body.
    ///
    /// Only transport failures are errors here; every status, including
    /// redirects, is handed back for the caller to judge.
    pub async fn execute(&self, endpoint: &str, request: RequestBuilder) -> ClientResult<RawResponse> {
        let response = request
            .send()
            .await
            .map_err(|e| ClientError::transport(endpoint, e))?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| ClientError::transport(endpoint, e))?
            .to_vec();

        debug!(
            "{} -> HTTP {} ({} bytes)",
            endpoint,
            status.as_u16(),
            body.len()
        );

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}
