//! EUSurvey workflows: results export, answer PDFs, survey form PDFs and
//! survey listings.
//!
//! [`SurveyClient`] composes the Basic-Auth webservice, the cookie session
//! and the poller. Every failure is returned to the caller as-is; the only
//! local recovery is polling a job that is not ready yet.

mod types;

use std::time::Duration;

use log::{debug, info};

use crate::error::{ClientError, ClientResult};
use crate::http::{BasicAuthFetcher, ClientConfig, HttpClient, SuccessBand};
use crate::poll::{Backoff, Clock, Poller, Probe, TokioClock};
use crate::session::Session;

pub use types::{Survey, SurveyList, SurveyMetadata, parse_xml};

/// Closed set of plaintext bodies an endpoint uses to say "yes".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadyTokens(&'static [&'static str]);

impl ReadyTokens {
    /// `/pdf/answerready/{code}` answers either literal once the PDF exists.
    pub const ANSWER_PDF_READY: ReadyTokens = ReadyTokens(&["exists", "OK"]);
    /// `/worker/createanswerpdf/{code}` acknowledges with `OK`.
    pub const GENERATION_STARTED: ReadyTokens = ReadyTokens(&["OK"]);

    pub const fn new(tokens: &'static [&'static str]) -> Self {
        Self(tokens)
    }

    /// Exact, case-sensitive comparison.
    pub fn matches(&self, body: &str) -> bool {
        self.0.contains(&body)
    }
}

pub fn survey_pdf_path(alias: &str) -> String {
    format!("/webservice/getSurveyPDF/{}", alias)
}

pub fn prepare_results_path(form_id: &str, show_ids: bool) -> String {
    format!("/webservice/prepareResults/{}/{}", form_id, show_ids)
}

pub fn results_path(task_id: &str) -> String {
    format!("/webservice/getResults/{}", task_id)
}

pub fn answer_ready_path(code: &str) -> String {
    format!("/pdf/answerready/{}", code)
}

pub fn create_answer_pdf_path(code: &str) -> String {
    format!("/worker/createanswerpdf/{}", code)
}

pub fn answer_pdf_path(code: &str) -> String {
    format!("/pdf/answer/{}", code)
}

const SURVEYS_PATH: &str = "/webservice/getMySurveys";

fn survey_metadata_path(alias: &str) -> String {
    format!("/webservice/getSurveyMetadata/{}", alias)
}

/// Extracts the export task id from a `prepareResults` body.
pub fn parse_task_id(endpoint: &str, body: &[u8]) -> ClientResult<String> {
    let task_id = String::from_utf8_lossy(body).trim().to_string();
    if task_id.is_empty() {
        return Err(ClientError::protocol(endpoint, "server returned an empty task id"));
    }
    Ok(task_id)
}

pub struct SurveyClient<C: Clock = TokioClock> {
    basic: BasicAuthFetcher,
    session: Session,
    poller: Poller<C>,
    poll_timeout: Duration,
}

impl SurveyClient<TokioClock> {
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        Self::with_clock(config, TokioClock)
    }
}

impl<C: Clock> SurveyClient<C> {
    /// Builds the client around one shared transport, polling on `clock`.
    pub fn with_clock(config: &ClientConfig, clock: C) -> ClientResult<Self> {
        let http = HttpClient::from_config(config)?;
        Ok(Self {
            basic: BasicAuthFetcher::new(http.clone(), &config.username, &config.password),
            session: Session::new(http, &config.username, &config.password),
            poller: Poller::with_clock(clock, Backoff::default()),
            poll_timeout: config.poll_timeout,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn poller(&self) -> &Poller<C> {
        &self.poller
    }

    pub async fn list_surveys(&self) -> ClientResult<SurveyList> {
        let body = self.basic.get_success(SURVEYS_PATH).await?;
        parse_xml(&body).map_err(|e| {
            ClientError::protocol(SURVEYS_PATH, format!("parsing survey list XML: {}", e))
        })
    }

    pub async fn survey_metadata(&self, alias: &str) -> ClientResult<SurveyMetadata> {
        let path = survey_metadata_path(alias);
        let body = self.basic.get_success(&path).await?;
        parse_xml(&body)
            .map_err(|e| ClientError::protocol(&path, format!("parsing survey metadata XML: {}", e)))
    }

    /// Downloads the blank survey form as PDF.
    #[tracing::instrument(skip(self))]
    pub async fn survey_pdf(&self, alias: &str) -> ClientResult<Vec<u8>> {
        self.basic.get_success(&survey_pdf_path(alias)).await
    }

    /// Starts a server-side export and returns its task id.
    #[tracing::instrument(skip(self))]
    pub async fn prepare_results(&self, form_id: &str, show_ids: bool) -> ClientResult<String> {
        let path = prepare_results_path(form_id, show_ids);
        let body = self.basic.get_success(&path).await?;
        parse_task_id(&path, &body)
    }

    /// Polls an export task until its result document is available.
    ///
    /// Any failed fetch, including transport errors, means "not ready yet";
    /// only the deadline ends the poll. A 2xx other than 200 carries no
    /// document and counts as not ready too.
    #[tracing::instrument(skip(self))]
    pub async fn fetch_results(&self, task_id: &str) -> ClientResult<Vec<u8>> {
        let path = results_path(task_id);
        let path = path.as_str();
        let operation = format!("getResults {}", task_id);

        self.poller
            .poll(&operation, self.poll_timeout, || async move {
                match self.basic.get(path, SuccessBand::Exactly200).await {
                    Ok(response) => Ok(Probe::Ready(response.body)),
                    Err(err) => Ok(Probe::NotReady(Some(err))),
                }
            })
            .await
    }

    /// Prepares an export and waits for its result document.
    pub async fn export_results(&self, form_id: &str, show_ids: bool) -> ClientResult<Vec<u8>> {
        let task_id = self.prepare_results(form_id, show_ids).await?;
        info!("Export task ID: {}, polling for results...", task_id);
        self.fetch_results(&task_id).await
    }

    /// Side-effect-free check whether the answer PDF exists on the server.
    pub async fn is_answer_pdf_ready(&self, code: &str) -> ClientResult<bool> {
        let response = self.session.get(&answer_ready_path(code)).await?;
        Ok(ReadyTokens::ANSWER_PDF_READY.matches(&response.text()))
    }

    /// Asks the server to generate the answer PDF.
    ///
    /// The status is checked before the body: a non-2xx answer is an
    /// `HttpStatus` error, a 2xx answer whose body is not exactly `OK` is a
    /// `Protocol` error.
    pub async fn create_answer_pdf(&self, code: &str) -> ClientResult<()> {
        let path = create_answer_pdf_path(code);
        let response = self
            .session
            .get(&path)
            .await?
            .require(&path, SuccessBand::Any2xx)?;

        let body = response.text();
        if !ReadyTokens::GENERATION_STARTED.matches(&body) {
            return Err(ClientError::protocol(
                &path,
                format!("createanswerpdf returned {:?} (expected \"OK\")", body),
            ));
        }
        info!("PDF generation triggered for {}", code);
        Ok(())
    }

    /// Downloads a generated answer PDF. Only HTTP 200 is accepted.
    pub async fn download_answer_pdf(&self, code: &str) -> ClientResult<Vec<u8>> {
        let path = answer_pdf_path(code);
        let response = self
            .session
            .get(&path)
            .await?
            .require(&path, SuccessBand::Exactly200)?;
        Ok(response.body)
    }

    /// Generates the answer PDF if needed, waits for it and downloads it.
    ///
    /// Generation is only triggered when the first readiness check says the
    /// PDF does not exist yet.
    #[tracing::instrument(skip(self))]
    pub async fn answer_pdf(&self, code: &str) -> ClientResult<Vec<u8>> {
        self.session.login().await?;

        if self.is_answer_pdf_ready(code).await? {
            info!("PDF already exists for {}", code);
        } else {
            info!("Triggering PDF generation for {}...", code);
            self.create_answer_pdf(code).await?;

            info!("Waiting for PDF to be ready...");
            let operation = format!("answer PDF generation for {}", code);
            self.poller
                .poll(&operation, self.poll_timeout, || async move {
                    if self.is_answer_pdf_ready(code).await? {
                        Ok(Probe::Ready(()))
                    } else {
                        Ok(Probe::NotReady(None))
                    }
                })
                .await?;
        }

        debug!("Downloading answer PDF for {}...", code);
        self.download_answer_pdf(code).await
    }
}
