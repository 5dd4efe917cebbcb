//! Stateless HTTP Basic-Auth GETs against the `/webservice` endpoints.

use log::debug;

use super::client::{HttpClient, RawResponse, SuccessBand};
use crate::error::ClientResult;

/// Issues GET requests with Basic credentials attached to every call.
///
/// Shares the transport (and therefore its cookie jar) with the session,
/// but never depends on being logged in.
#[derive(Clone)]
pub struct BasicAuthFetcher {
    http: HttpClient,
    username: String,
    password: String,
}

impl BasicAuthFetcher {
    pub fn new(http: HttpClient, username: &str, password: &str) -> Self {
        Self {
            http,
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    /// GETs `path` and returns the response if its status is inside `band`.
    #[tracing::instrument(skip(self))]
    pub async fn get(&self, path: &str, band: SuccessBand) -> ClientResult<RawResponse> {
        debug!("GET {} (basic auth)", path);
        let request = self
            .http
            .get(path)
            .basic_auth(&self.username, Some(&self.password));

        self.http.execute(path, request).await?.require(path, band)
    }

    /// Accepts only HTTP 200.
    pub async fn get_strict(&self, path: &str) -> ClientResult<Vec<u8>> {
        Ok(self.get(path, SuccessBand::Exactly200).await?.body)
    }

    /// Accepts any 2xx status.
    pub async fn get_success(&self, path: &str) -> ClientResult<Vec<u8>> {
        Ok(self.get(path, SuccessBand::Any2xx).await?.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use crate::http::ClientConfig;
    use reqwest::StatusCode;

    // base64("user:pass")
    const BASIC_HEADER: &str = "Basic dXNlcjpwYXNz";

    fn fetcher_for(url: &str) -> BasicAuthFetcher {
        let http = HttpClient::from_config(&ClientConfig::new(url, "user", "pass")).unwrap();
        BasicAuthFetcher::new(http, "user", "pass")
    }

    #[tokio::test]
    async fn test_get_attaches_basic_credentials() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/webservice/getMySurveys")
            .match_header("authorization", BASIC_HEADER)
            .with_status(200)
            .with_body("<Surveys/>")
            .create_async()
            .await;

        let fetcher = fetcher_for(&server.url());
        let body = fetcher.get_success("/webservice/getMySurveys").await.unwrap();

        mock.assert_async().await;
        assert_eq!(body, b"<Surveys/>");
    }

    #[tokio::test]
    async fn test_credentials_sent_on_every_call() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/webservice/ping")
            .match_header("authorization", BASIC_HEADER)
            .with_status(200)
            .expect(2)
            .create_async()
            .await;

        let fetcher = fetcher_for(&server.url());
        fetcher.get_success("/webservice/ping").await.unwrap();
        fetcher.get_success("/webservice/ping").await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_strict_rejects_non_200_success() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/webservice/getResults/T1")
            .with_status(204)
            .expect(2)
            .create_async()
            .await;

        let fetcher = fetcher_for(&server.url());

        let err = fetcher
            .get_strict("/webservice/getResults/T1")
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::NO_CONTENT));

        let body = fetcher
            .get_success("/webservice/getResults/T1")
            .await
            .unwrap();
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_error_carries_status_and_server_message() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/webservice/getSurveyPDF/missing")
            .with_status(404)
            .with_body("Survey not found")
            .create_async()
            .await;

        let fetcher = fetcher_for(&server.url());
        let err = fetcher
            .get_success("/webservice/getSurveyPDF/missing")
            .await
            .unwrap_err();

        match err {
            ClientError::HttpStatus {
                endpoint,
                status,
                body,
            } => {
                assert_eq!(endpoint, "/webservice/getSurveyPDF/missing");
                assert_eq!(status, StatusCode::NOT_FOUND);
                assert_eq!(body, "Survey not found");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }
}
