use assert_cmd::Command;
use assert_cmd::cargo;
use mockito::{Matcher, Server};
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const LOGIN_HTML: &str = r#"<html><head><meta name="_csrf" content="csrf-42"/></head></html>"#;

fn write_config(dir: &Path, base_url: &str) -> std::path::PathBuf {
    let path = dir.join("eusurveymgr.json");
    let config = format!(
        r#"{{
            "base_url": "{}",
            "web_user": "alice",
            "web_password": "s3cret",
            "output_dir": "{}",
            "timeout_seconds": 5,
            "db_host": "unused"
        }}"#,
        base_url,
        dir.display()
    );
    fs::write(&path, config).unwrap();
    path
}

fn eusurveymgr(config: &Path) -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("eusurveymgr"));
    cmd.env_remove("EUSURVEYMGR_WEB_USER")
        .env_remove("EUSURVEYMGR_WEB_PASSWORD")
        .env_remove("EUSURVEYMGR_BASE_URL")
        .arg("--config")
        .arg(config);
    cmd
}

#[test]
fn test_end_to_end_survey_pdf() {
    let mut server = Server::new();
    let _pdf = server
        .mock("GET", "/webservice/getSurveyPDF/Check4SkillsInRomana")
        .match_header("authorization", "Basic YWxpY2U6czNjcmV0")
        .with_status(200)
        .with_body("%PDF-1.4 form")
        .expect(1)
        .create();

    let dir = tempdir().unwrap();
    let config = write_config(dir.path(), &server.url());

    eusurveymgr(&config)
        .args(["pdf", "survey", "--alias", "Check4SkillsInRomana"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Check4SkillsInRomana.pdf"));

    let written = fs::read(dir.path().join("Check4SkillsInRomana.pdf")).unwrap();
    assert_eq!(written, b"%PDF-1.4 form");
}

#[test]
fn test_end_to_end_answer_pdf_already_generated() {
    let mut server = Server::new();
    let code = "a1b2c3d4-0000-1111-2222-333344445555";

    let _page = server
        .mock("GET", "/auth/login")
        .with_status(200)
        .with_body(LOGIN_HTML)
        .expect(1)
        .create();
    let _login = server
        .mock("POST", "/login")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("username".into(), "alice".into()),
            Matcher::UrlEncoded("_csrf".into(), "csrf-42".into()),
        ]))
        .with_status(302)
        .with_header("set-cookie", "JSESSIONID=abc; Path=/")
        .with_header("location", "/dashboard")
        .expect(1)
        .create();
    let _ready = server
        .mock("GET", format!("/pdf/answerready/{}", code).as_str())
        .match_header("cookie", Matcher::Regex("JSESSIONID=abc".into()))
        .with_status(200)
        .with_body("exists")
        .create();
    let trigger = server
        .mock("GET", format!("/worker/createanswerpdf/{}", code).as_str())
        .expect(0)
        .create();
    let _pdf = server
        .mock("GET", format!("/pdf/answer/{}", code).as_str())
        .with_status(200)
        .with_body("%PDF-1.4 answer")
        .create();

    let dir = tempdir().unwrap();
    let config = write_config(dir.path(), &server.url());
    let answers = dir.path().join("answers");

    eusurveymgr(&config)
        .args(["pdf", "answer", "--code", code, "--output"])
        .arg(&answers)
        .assert()
        .success();

    trigger.assert();
    let written = fs::read(answers.join(format!("{}.pdf", code))).unwrap();
    assert_eq!(written, b"%PDF-1.4 answer");
}

#[test]
fn test_end_to_end_results_export() {
    let mut server = Server::new();
    let _prepare = server
        .mock("GET", "/webservice/prepareResults/4578/false")
        .with_status(200)
        .with_body("  T-77\n")
        .expect(1)
        .create();
    let _results = server
        .mock("GET", "/webservice/getResults/T-77")
        .with_status(200)
        .with_body("<results><row/></results>")
        .expect(1)
        .create();

    let dir = tempdir().unwrap();
    let config = write_config(dir.path(), &server.url());
    let output = dir.path().join("export.xml");

    eusurveymgr(&config)
        .args(["results", "export", "--id", "4578", "--showids=false", "-y", "--output"])
        .arg(&output)
        .assert()
        .success();

    assert_eq!(fs::read_to_string(&output).unwrap(), "<results><row/></results>");
}

#[test]
fn test_failed_download_exits_non_zero_and_writes_nothing() {
    let mut server = Server::new();
    let _pdf = server
        .mock("GET", "/webservice/getSurveyPDF/gone")
        .with_status(404)
        .with_body("Not Found")
        .create();

    let dir = tempdir().unwrap();
    let config = write_config(dir.path(), &server.url());

    eusurveymgr(&config)
        .args(["pdf", "survey", "--alias", "gone"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("404"));

    assert!(!dir.path().join("gone.pdf").exists());
}

#[test]
fn test_missing_config_file_fails() {
    let dir = tempdir().unwrap();

    eusurveymgr(&dir.path().join("nope.json"))
        .args(["surveys", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nope.json"));
}
