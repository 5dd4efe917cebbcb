use anyhow::{Context, Result, bail};
use log::info;
use std::path::PathBuf;

use crate::poll::Clock;
use crate::runtime::Runtime;
use crate::survey::SurveyClient;

use super::config::Config;
use super::{validate_identifier, write_output};

#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Numeric survey id or alias.
    pub form_id: String,
    pub output: Option<PathBuf>,
    pub show_ids: bool,
    /// Skip the confirmation prompt.
    pub yes: bool,
}

pub(crate) fn export_warning(form_id: &str) -> String {
    format!(
        "WARNING: This triggers a server-side export for survey {:?} that generates\n\
         a PDF for every respondent in that survey. It can take a very long time\n\
         and puts heavy load on the server.\n\
         Consider using 'pdf answer' for individual respondents.\n",
        form_id
    )
}

pub fn default_results_path(config: &Config, form_id: &str) -> PathBuf {
    config.output_dir.join(format!("results-{}.xml", form_id))
}

/// Export survey results to an XML file and return its path
#[tracing::instrument(skip(runtime, config, client))]
pub async fn results_export<R: Runtime, C: Clock>(
    runtime: &R,
    config: &Config,
    client: &SurveyClient<C>,
    options: &ExportOptions,
) -> Result<PathBuf> {
    validate_identifier("survey id", &options.form_id)?;

    if !options.yes {
        eprintln!("{}", export_warning(&options.form_id));
        if !runtime.confirm("Continue?")? {
            bail!("aborted");
        }
    }

    info!(
        "Preparing results export for survey {}...",
        options.form_id
    );
    let data = client
        .export_results(&options.form_id, options.show_ids)
        .await
        .with_context(|| format!("Failed to export results for survey {}", options.form_id))?;

    let output = options
        .output
        .clone()
        .unwrap_or_else(|| default_results_path(config, &options.form_id));
    write_output(runtime, &output, &data, "Results")?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::ClientConfig;
    use crate::runtime::MockRuntime;
    use crate::test_utils::FakeClock;
    use mockito::Server;
    use std::path::Path;

    fn options(form_id: &str, yes: bool) -> ExportOptions {
        ExportOptions {
            form_id: form_id.to_string(),
            output: None,
            show_ids: true,
            yes,
        }
    }

    fn client_for(url: &str) -> SurveyClient<FakeClock> {
        SurveyClient::with_clock(&ClientConfig::new(url, "u", "p"), FakeClock::new()).unwrap()
    }

    #[test]
    fn test_export_warning_names_survey() {
        let warning = export_warning("4578");
        assert!(warning.contains("\"4578\""));
        assert!(warning.contains("heavy load"));
    }

    #[test]
    fn test_default_results_path() {
        let config = Config {
            output_dir: PathBuf::from("/data/out"),
            ..Config::default()
        };
        assert_eq!(
            default_results_path(&config, "Check4SkillsInRomana"),
            PathBuf::from("/data/out/results-Check4SkillsInRomana.xml")
        );
    }

    #[tokio::test]
    async fn test_declined_prompt_aborts_before_any_request() {
        let mut server = Server::new_async().await;
        let prepare = server
            .mock("GET", "/webservice/prepareResults/4578/true")
            .expect(0)
            .create_async()
            .await;

        let mut runtime = MockRuntime::new();
        runtime.expect_confirm().times(1).returning(|_| Ok(false));
        runtime.expect_write().never();

        let client = client_for(&server.url());
        let err = results_export(&runtime, &Config::default(), &client, &options("4578", false))
            .await
            .unwrap_err();

        prepare.assert_async().await;
        assert_eq!(err.to_string(), "aborted");
    }

    #[tokio::test]
    async fn test_export_writes_results_file() {
        let mut server = Server::new_async().await;
        let _prepare = server
            .mock("GET", "/webservice/prepareResults/4578/true")
            .with_status(200)
            .with_body(" T1 \n")
            .create_async()
            .await;
        let _results = server
            .mock("GET", "/webservice/getResults/T1")
            .with_status(200)
            .with_body("<results/>")
            .create_async()
            .await;

        let config = Config::default();
        let expected = default_results_path(&config, "4578");
        let expected_clone = expected.clone();

        let mut runtime = MockRuntime::new();
        runtime.expect_confirm().never();
        runtime.expect_exists().returning(|_| false);
        runtime
            .expect_write()
            .withf(move |path, contents| path == expected_clone.as_path() && contents == b"<results/>")
            .times(1)
            .returning(|_, _| Ok(()));

        let client = client_for(&server.url());
        let written = results_export(&runtime, &config, &client, &options("4578", true))
            .await
            .unwrap();

        assert_eq!(written, expected);
    }

    #[tokio::test]
    async fn test_confirmed_export_uses_explicit_output() {
        let mut server = Server::new_async().await;
        let _prepare = server
            .mock("GET", "/webservice/prepareResults/A/false")
            .with_status(200)
            .with_body("T2")
            .create_async()
            .await;
        let _results = server
            .mock("GET", "/webservice/getResults/T2")
            .with_status(200)
            .with_body("<results id=\"2\"/>")
            .create_async()
            .await;

        let mut runtime = MockRuntime::new();
        runtime.expect_confirm().times(1).returning(|_| Ok(true));
        runtime.expect_exists().returning(|_| false);
        runtime
            .expect_write()
            .withf(|path, _| path == Path::new("custom.xml"))
            .times(1)
            .returning(|_, _| Ok(()));

        let client = client_for(&server.url());
        let opts = ExportOptions {
            form_id: "A".into(),
            output: Some(PathBuf::from("custom.xml")),
            show_ids: false,
            yes: false,
        };
        let written = results_export(&runtime, &Config::default(), &client, &opts)
            .await
            .unwrap();

        assert_eq!(written, PathBuf::from("custom.xml"));
    }

    #[tokio::test]
    async fn test_failed_export_writes_nothing() {
        let mut server = Server::new_async().await;
        let _prepare = server
            .mock("GET", "/webservice/prepareResults/4578/true")
            .with_status(200)
            .with_body("")
            .create_async()
            .await;

        let mut runtime = MockRuntime::new();
        runtime.expect_write().never();

        let client = client_for(&server.url());
        let err = results_export(&runtime, &Config::default(), &client, &options("4578", true))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("Failed to export results for survey 4578"));
    }
}
