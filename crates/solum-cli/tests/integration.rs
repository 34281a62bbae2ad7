#![allow(deprecated)]
use assert_cmd::Command;
use mockito::{Matcher, Server};
use predicates::prelude::*;
use tempfile::TempDir;

const TOKEN: &str = "test-token";
const PLAN_ID: &str = "1b0a3e2c-5d4f-4a6b-8c7d-9e0f1a2b3c4d";

/// A `solum` invocation pointed at `server` with a static token and an
/// isolated (absent) config file.
fn solum(server: &Server, dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("solum").unwrap();
    cmd.current_dir(dir.path())
        .env("SOLUM_CONFIG", dir.path().join("config.yaml"))
        .env("SOLUM_URL", server.url())
        .env("OS_AUTH_TOKEN", TOKEN)
        .env_remove("OS_AUTH_URL")
        .env_remove("OS_USERNAME")
        .env_remove("OS_PASSWORD")
        .env_remove("OS_TENANT_NAME");
    cmd
}

// ---------------------------------------------------------------------------
// solum plan
// ---------------------------------------------------------------------------

#[test]
fn plan_list_prints_table() {
    let mut server = Server::new();
    let mock = server
        .mock("GET", "/v1/plans")
        .match_header("x-auth-token", TOKEN)
        .with_status(200)
        .with_body(r#"[{"uuid": "p1", "name": "ex_plan1", "description": "dsc1."}]"#)
        .create();
    let dir = TempDir::new().unwrap();

    solum(&server, &dir)
        .args(["plan", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("UUID"))
        .stdout(predicate::str::contains("ex_plan1"))
        .stdout(predicate::str::contains("dsc1."));
    mock.assert();
}

#[test]
fn plan_list_json() {
    let mut server = Server::new();
    server
        .mock("GET", "/v1/plans")
        .with_status(200)
        .with_body(r#"{"plans": [{"uuid": "p1", "name": "ex_plan1"}]}"#)
        .create();
    let dir = TempDir::new().unwrap();

    let output = solum(&server, &dir)
        .args(["--json", "plan", "list"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed[0]["name"], "ex_plan1");
}

#[test]
fn plan_create_posts_yaml() {
    let mut server = Server::new();
    let mock = server
        .mock("POST", "/v1/plans")
        .match_header("content-type", "x-application/yaml")
        .match_body(Matcher::Regex("name: ex_plan1".into()))
        .with_status(201)
        .with_body("uuid: p1\nuri: http://solum/v1/plans/p1\nname: ex_plan1\n")
        .create();
    let dir = TempDir::new().unwrap();
    let plan_file = dir.path().join("plan.yaml");
    std::fs::write(&plan_file, "version: 1\nname: ex_plan1\ndescription: dsc1.\n").unwrap();

    solum(&server, &dir)
        .args(["plan", "create"])
        .arg(&plan_file)
        .assert()
        .success()
        .stdout(predicate::str::contains("http://solum/v1/plans/p1"));
    mock.assert();
}

#[test]
fn plan_create_with_private_repo_prints_deploy_key() {
    let mut server = Server::new();
    server
        .mock("POST", "/v1/plans")
        .with_status(201)
        .with_body(
            "uuid: p1\nname: private_app\nartifacts:\n  - name: web\n    content:\n      private: true\n      public_key: ssh-rsa AAAAB3Nza\n",
        )
        .create();
    let dir = TempDir::new().unwrap();
    let plan_file = dir.path().join("plan.yaml");
    std::fs::write(&plan_file, "version: 1\nname: private_app\n").unwrap();

    solum(&server, &dir)
        .args(["plan", "create"])
        .arg(&plan_file)
        .assert()
        .success()
        .stdout(predicate::str::contains("ssh-rsa AAAAB3Nza"))
        .stdout(predicate::str::contains("Artifact: web"));
}

#[test]
fn plan_create_missing_file_fails() {
    let server = Server::new();
    let dir = TempDir::new().unwrap();

    solum(&server, &dir)
        .args(["plan", "create", "absent.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("could not open plan file"));
}

#[test]
fn plan_show_by_name_uses_filtered_list() {
    let mut server = Server::new();
    let mock = server
        .mock("GET", "/v1/plans")
        .match_query(Matcher::UrlEncoded("name".into(), "ex_plan1".into()))
        .with_status(200)
        .with_body(format!(r#"[{{"uuid": "{PLAN_ID}", "name": "ex_plan1"}}]"#))
        .expect(1)
        .create();
    let dir = TempDir::new().unwrap();

    solum(&server, &dir)
        .args(["plan", "show", "ex_plan1"])
        .assert()
        .success()
        .stdout(predicate::str::contains(PLAN_ID));
    mock.assert();
}

#[test]
fn plan_show_ambiguous_name_fails() {
    let mut server = Server::new();
    server
        .mock("GET", "/v1/plans")
        .match_query(Matcher::UrlEncoded("name".into(), "dup".into()))
        .with_status(200)
        .with_body(r#"[{"uuid": "a", "name": "dup"}, {"uuid": "b", "name": "dup"}]"#)
        .create();
    let dir = TempDir::new().unwrap();

    solum(&server, &dir)
        .args(["plan", "show", "dup"])
        .assert()
        .failure()
        .stderr(
            predicate::str::contains("could not resolve plan 'dup'")
                .and(predicate::str::contains("multiple plans named 'dup'"))
                .and(predicate::str::contains("not found").not()),
        );
}

#[test]
fn plan_delete_by_uuid() {
    let mut server = Server::new();
    let get = server
        .mock("GET", format!("/v1/plans/{PLAN_ID}").as_str())
        .with_status(200)
        .with_body(format!(r#"{{"uuid": "{PLAN_ID}", "name": "ex_plan1"}}"#))
        .create();
    let delete = server
        .mock("DELETE", format!("/v1/plans/{PLAN_ID}").as_str())
        .with_status(204)
        .create();
    let dir = TempDir::new().unwrap();

    solum(&server, &dir)
        .args(["plan", "delete", PLAN_ID])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted plan"));
    get.assert();
    delete.assert();
}

#[test]
fn api_error_message_is_surfaced() {
    let mut server = Server::new();
    server
        .mock("GET", "/v1/plans")
        .with_status(500)
        .with_body(r#"{"faultstring": "database unavailable"}"#)
        .create();
    let dir = TempDir::new().unwrap();

    solum(&server, &dir)
        .args(["plan", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("database unavailable"));
}

// ---------------------------------------------------------------------------
// solum app create
// ---------------------------------------------------------------------------

#[test]
fn app_create_with_all_flags_needs_no_prompt() {
    let mut server = Server::new();
    let mock = server
        .mock("POST", "/v1/plans")
        .match_header("content-type", "x-application/yaml")
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex("name: myapp".into()),
            Matcher::Regex("language_pack: auto".into()),
            Matcher::Regex("run_cmd: python app.py".into()),
            Matcher::Regex("- 8080".into()),
        ]))
        .with_status(201)
        .with_body("uuid: p9\nname: myapp\nuri: http://solum/v1/plans/p9\n")
        .create();
    let dir = TempDir::new().unwrap();

    solum(&server, &dir)
        .args([
            "app",
            "create",
            "--name",
            "myapp",
            "--git-url",
            "https://github.com/example/app.git",
            "--lp",
            "auto",
            "--run-cmd",
            "python app.py",
            "--port",
            "8080",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("http://solum/v1/plans/p9"));
    mock.assert();
}

#[test]
fn app_create_resolves_language_pack_from_plan_file() {
    let mut server = Server::new();
    let lookup = server
        .mock("GET", "/v1/languagepacks")
        .match_query(Matcher::UrlEncoded("name".into(), "python".into()))
        .with_status(200)
        .with_body(r#"[{"uuid": "lp1", "name": "python", "status": "READY"}]"#)
        .expect(1)
        .create();
    let create = server
        .mock("POST", "/v1/plans")
        .match_body(Matcher::Regex("language_pack: python".into()))
        .with_status(201)
        .with_body("uuid: p2\nname: webapp\n")
        .create();
    let dir = TempDir::new().unwrap();
    let plan_file = dir.path().join("app.yaml");
    std::fs::write(
        &plan_file,
        "version: 1\nname: webapp\nartifacts:\n  - language_pack: python\n    content:\n      href: https://github.com/example/web.git\n      run_cmd: ./start.sh\n",
    )
    .unwrap();

    solum(&server, &dir)
        .args(["app", "create", "--plan-file"])
        .arg(&plan_file)
        .assert()
        .success()
        .stderr(predicate::str::contains("Defaulting to port 80."));
    lookup.assert();
    create.assert();
}

#[test]
fn app_create_unregistered_language_pack_fails() {
    let mut server = Server::new();
    server
        .mock("GET", "/v1/languagepacks")
        .match_query(Matcher::UrlEncoded("name".into(), "cobol".into()))
        .with_status(200)
        .with_body("[]")
        .create();
    let create = server.mock("POST", "/v1/plans").expect(0).create();
    let dir = TempDir::new().unwrap();
    let plan_file = dir.path().join("app.yaml");
    std::fs::write(&plan_file, "artifacts:\n  - language_pack: cobol\n").unwrap();

    solum(&server, &dir)
        .args(["app", "create", "--plan-file"])
        .arg(&plan_file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Languagepack cobol not registered"));
    create.assert();
}

#[test]
fn app_create_invalid_name_fails() {
    let server = Server::new();
    let dir = TempDir::new().unwrap();

    solum(&server, &dir)
        .args([
            "app",
            "create",
            "--name",
            "not valid!",
            "--git-url",
            "https://github.com/example/app.git",
            "--lp",
            "auto",
            "--run-cmd",
            "./run",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Application name must be 1-100 characters"));
}

// ---------------------------------------------------------------------------
// solum assembly / pipeline
// ---------------------------------------------------------------------------

#[test]
fn assembly_create_resolves_plan_name_to_uri() {
    let mut server = Server::new();
    let find = server
        .mock("GET", "/v1/plans")
        .match_query(Matcher::UrlEncoded("name".into(), "the-plan-name".into()))
        .with_status(200)
        .with_body(
            r#"[{"uuid": "p1", "name": "the-plan-name", "uri": "http://solum/v1/plans/p1"}]"#,
        )
        .create();
    let create = server
        .mock("POST", "/v1/assemblies")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "name": "app1",
            "description": "desc",
            "plan_uri": "http://solum/v1/plans/p1"
        })))
        .with_status(201)
        .with_body(r#"{"uuid": "a1", "name": "app1", "status": "QUEUED"}"#)
        .create();
    let dir = TempDir::new().unwrap();

    solum(&server, &dir)
        .args([
            "assembly",
            "create",
            "app1",
            "the-plan-name",
            "--description",
            "desc",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("QUEUED"));
    find.assert();
    create.assert();
}

#[test]
fn assembly_create_with_plan_uri_skips_lookup() {
    let mut server = Server::new();
    let find = server.mock("GET", "/v1/plans").expect(0).create();
    let create = server
        .mock("POST", "/v1/assemblies")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "plan_uri": "http://example.com/v1/plans/p1"
        })))
        .with_status(201)
        .with_body(r#"{"uuid": "a1", "name": "app1"}"#)
        .create();
    let dir = TempDir::new().unwrap();

    solum(&server, &dir)
        .args(["assembly", "create", "app1", "http://example.com/v1/plans/p1"])
        .assert()
        .success();
    find.assert();
    create.assert();
}

#[test]
fn pipeline_create_posts_workbook() {
    let mut server = Server::new();
    let create = server
        .mock("POST", "/v1/pipelines")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "name": "pipe1",
            "workbook_name": "workbook",
            "plan_uri": "http://example.com/v1/plans/p1"
        })))
        .with_status(201)
        .with_body(r#"{"uuid": "pl1", "name": "pipe1", "workbook_name": "workbook"}"#)
        .create();
    let dir = TempDir::new().unwrap();

    solum(&server, &dir)
        .args([
            "pipeline",
            "create",
            "http://example.com/v1/plans/p1",
            "workbook",
            "pipe1",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("pipe1"));
    create.assert();
}

// ---------------------------------------------------------------------------
// solum languagepack / component
// ---------------------------------------------------------------------------

#[test]
fn languagepack_create_rejects_uppercase_name() {
    let mut server = Server::new();
    let create = server.mock("POST", "/v1/languagepacks").expect(0).create();
    let dir = TempDir::new().unwrap();
    let lp_file = dir.path().join("lp.json");
    std::fs::write(&lp_file, r#"{"name": "Python", "source_uri": "git://x"}"#).unwrap();

    solum(&server, &dir)
        .args(["languagepack", "create"])
        .arg(&lp_file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("languagepack name 'Python'"));
    create.assert();
}

#[test]
fn languagepack_create_posts_json() {
    let mut server = Server::new();
    let create = server
        .mock("POST", "/v1/languagepacks")
        .match_header("content-type", "application/json")
        .match_body(Matcher::PartialJson(serde_json::json!({"name": "python"})))
        .with_status(201)
        .with_body(r#"{"uuid": "lp1", "name": "python", "status": "PENDING"}"#)
        .create();
    let dir = TempDir::new().unwrap();
    let lp_file = dir.path().join("lp.json");
    std::fs::write(&lp_file, r#"{"name": "python", "source_uri": "git://x"}"#).unwrap();

    solum(&server, &dir)
        .args(["languagepack", "create"])
        .arg(&lp_file)
        .assert()
        .success()
        .stdout(predicate::str::contains("PENDING"));
    create.assert();
}

#[test]
fn component_show_missing_name_fails() {
    let mut server = Server::new();
    server
        .mock("GET", "/v1/components")
        .match_query(Matcher::UrlEncoded("name".into(), "ghost".into()))
        .with_status(200)
        .with_body("[]")
        .create();
    let dir = TempDir::new().unwrap();

    solum(&server, &dir)
        .args(["component", "show", "ghost"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("component not found: ghost"));
}

// ---------------------------------------------------------------------------
// configuration
// ---------------------------------------------------------------------------

#[test]
fn missing_credentials_fail_before_any_request() {
    let dir = TempDir::new().unwrap();
    let mut cmd = Command::cargo_bin("solum").unwrap();
    cmd.current_dir(dir.path())
        .env("SOLUM_CONFIG", dir.path().join("config.yaml"))
        .env_remove("SOLUM_URL")
        .env_remove("OS_AUTH_TOKEN")
        .env_remove("OS_AUTH_URL")
        .env_remove("OS_USERNAME")
        .env_remove("OS_PASSWORD")
        .env_remove("OS_TENANT_NAME")
        .args(["plan", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no credentials"));
}

#[test]
fn config_file_supplies_endpoint_and_token() {
    let mut server = Server::new();
    let mock = server
        .mock("GET", "/v1/components")
        .match_header("x-auth-token", "file-token")
        .with_status(200)
        .with_body("[]")
        .create();
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.yaml");
    std::fs::write(
        &config,
        format!("solum_url: {}\nauth:\n  token: file-token\n", server.url()),
    )
    .unwrap();

    let mut cmd = Command::cargo_bin("solum").unwrap();
    cmd.current_dir(dir.path())
        .env("SOLUM_CONFIG", &config)
        .env_remove("SOLUM_URL")
        .env_remove("OS_AUTH_TOKEN")
        .env_remove("OS_AUTH_URL")
        .env_remove("OS_USERNAME")
        .env_remove("OS_PASSWORD")
        .env_remove("OS_TENANT_NAME")
        .args(["component", "list"])
        .assert()
        .success();
    mock.assert();
}

#[test]
fn config_validate_reports_bad_url() {
    let server = Server::new();
    let dir = TempDir::new().unwrap();

    solum(&server, &dir)
        .env("SOLUM_URL", "solum.example.com")
        .args(["config", "validate"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("[error] solum_url"));
}

#[test]
fn config_show_redacts_token() {
    let server = Server::new();
    let dir = TempDir::new().unwrap();

    solum(&server, &dir)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("********"))
        .stdout(predicate::str::contains(TOKEN).not());
}
