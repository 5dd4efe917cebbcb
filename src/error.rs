//! Error taxonomy for the survey client.
//!
//! Every component returns [`ClientError`]; only the poller recovers from any
//! of them locally, and only while a job is not ready yet.

use std::fmt;
use std::time::Duration;

use reqwest::StatusCode;

/// Login handshake failures. Never retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The login page carried no `_csrf` meta tag.
    CsrfNotFound,
    /// The login POST answered with something other than 302 or 200.
    LoginFailed(StatusCode),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::CsrfNotFound => write!(f, "CSRF token not found in login page"),
            AuthError::LoginFailed(status) => {
                write!(f, "login failed: HTTP {}", status.as_u16())
            }
        }
    }
}

impl std::error::Error for AuthError {}

#[derive(Debug)]
pub enum ClientError {
    /// Network, TLS, timeout or body read failure.
    Transport {
        endpoint: String,
        source: reqwest::Error,
    },
    Auth(AuthError),
    /// The server answered outside the success band the caller asked for.
    HttpStatus {
        endpoint: String,
        status: StatusCode,
        body: String,
    },
    /// The server answered successfully but with a body we cannot use.
    Protocol { endpoint: String, message: String },
    /// A poll deadline passed before the job became ready.
    Timeout {
        operation: String,
        elapsed: Duration,
        last_error: Option<Box<ClientError>>,
    },
}

impl ClientError {
    pub(crate) fn transport(endpoint: &str, source: reqwest::Error) -> Self {
        ClientError::Transport {
            endpoint: endpoint.to_string(),
            source,
        }
    }

    pub(crate) fn protocol(endpoint: &str, message: impl Into<String>) -> Self {
        ClientError::Protocol {
            endpoint: endpoint.to_string(),
            message: message.into(),
        }
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::HttpStatus { status, .. } => Some(*status),
            ClientError::Auth(AuthError::LoginFailed(status)) => Some(*status),
            ClientError::Transport { source, .. } => source.status(),
            _ => None,
        }
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Transport { endpoint, source } => {
                write!(f, "{}: request failed: {}", endpoint, source)
            }
            ClientError::Auth(err) => write!(f, "authentication error: {}", err),
            ClientError::HttpStatus {
                endpoint,
                status,
                body,
            } => {
                let body = body.trim();
                if body.is_empty() {
                    write!(f, "{}: HTTP {}", endpoint, status.as_u16())
                } else {
                    write!(f, "{}: HTTP {}: {}", endpoint, status.as_u16(), body)
                }
            }
            ClientError::Protocol { endpoint, message } => {
                write!(f, "{}: {}", endpoint, message)
            }
            ClientError::Timeout {
                operation,
                elapsed,
                last_error,
            } => {
                write!(f, "{} timed out after {}s", operation, elapsed.as_secs())?;
                if let Some(last) = last_error {
                    write!(f, " (last error: {})", last)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ClientError::Transport { source, .. } => Some(source),
            ClientError::Auth(err) => Some(err),
            ClientError::Timeout {
                last_error: Some(last),
                ..
            } => Some(last.as_ref()),
            _ => None,
        }
    }
}

impl From<AuthError> for ClientError {
    fn from(err: AuthError) -> Self {
        ClientError::Auth(err)
    }
}

pub type ClientResult<T> = std::result::Result<T, ClientError>;
