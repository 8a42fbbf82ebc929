//! The `lantern-setup` binary driven over stdin/stdout.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

use crate::common::{write_directory, write_templates};

struct TestEnv {
    _tmp: TempDir,
    home: PathBuf,
    data: PathBuf,
}

impl TestEnv {
    fn new() -> Self {
        let tmp = tempfile::tempdir().expect("tempdir");
        let home = tmp.path().join("home");
        let templates = tmp.path().join("srv");
        let data = home.join(".lantern");
        write_templates(&templates);
        fs::create_dir_all(&data).expect("data dir");
        write_directory(
            &data.join("contacts.json"),
            "alice@gmail.com",
            "x",
            &[("bob@gmail.com", "Bob")],
        );
        let config = format!(
            "[templates]\nsource_dir = {:?}\n\n[directory]\nretry_delay_ms = 0\n",
            templates.display().to_string()
        );
        fs::write(data.join("config.toml"), config).expect("config");
        Self {
            _tmp: tmp,
            home,
            data,
        }
    }

    fn cmd(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("lantern-setup");
        cmd.env("HOME", &self.home)
            .env("RUST_LOG", "info")
            .env_remove("LANTERN_ALLOW_COREDUMPS");
        cmd
    }
}

fn lines(stdout: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(stdout)
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn walks_the_censored_install() {
    let env = TestEnv::new();
    let out = env
        .cmd()
        .write_stdin(
            "file:///srv/install1Censored.html\n\
             file:///srv/loginCensored?&email=alice&pwd=x\n\
             file:///srv/trustedContacts?bob%40gmail.com=on\n\
             file:///srv/finished?runNow=off\n",
        )
        .assert()
        .code(1)
        .get_output()
        .stdout
        .clone();

    let lines = lines(&out);
    assert_eq!(lines.len(), 5, "{lines:?}");
    assert!(lines[0].starts_with("display file://"));
    assert!(lines[0].ends_with("/install0Uncensored-copy.html"));
    assert!(lines[1].ends_with("/install1Censored-copy.html"));
    assert!(lines[2].ends_with("/install2Censored-copy.html"));
    assert!(lines[3].ends_with("/installFinishedCensored-copy.html"));
    assert_eq!(lines[4], "exit 1");

    let config = fs::read_to_string(env.data.join("config.toml")).expect("config");
    assert!(config.contains("forced = true"));
    assert!(config.contains("retry_delay_ms = 0"));
    let trusted: Vec<String> =
        serde_json::from_slice(&fs::read(env.data.join("trusted.json")).expect("trust file"))
            .expect("trust json");
    assert_eq!(trusted, vec!["bob@gmail.com".to_string()]);
    assert!(env.data.join("installed").exists());
    assert!(env.data.join("logs").join("setup.log").exists());
}

#[test]
fn run_now_keeps_running_and_exits_cleanly() {
    let env = TestEnv::new();
    let out = env
        .cmd()
        .write_stdin("file:///srv/finished?runNow=on\n")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    assert_eq!(lines(&out).last().map(String::as_str), Some("closed"));
}

#[test]
fn confirmed_close_exits_with_one() {
    let env = TestEnv::new();
    let out = env
        .cmd()
        .write_stdin(":close\nn\n:close\ny\n")
        .assert()
        .code(1)
        .get_output()
        .stdout
        .clone();
    let lines = lines(&out);
    assert_eq!(
        lines[1],
        "confirm Exit?: Are you sure you want to cancel installing Lantern? [y/N]"
    );
    assert_eq!(lines[2], "cancelled");
    assert_eq!(lines.last().map(String::as_str), Some("exit 1"));
}

#[test]
fn reconfigure_flag_keeps_the_host() {
    let env = TestEnv::new();
    let out = env
        .cmd()
        .arg("--reconfigure")
        .write_stdin("file:///srv/finished\n")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    assert_eq!(lines(&out).last().map(String::as_str), Some("closed"));
    assert_eq!(
        fs::read_to_string(env.data.join("installed")).expect("marker"),
        "installed\n"
    );
}

#[test]
fn end_of_input_exits_cleanly() {
    let env = TestEnv::new();
    let out = env
        .cmd()
        .write_stdin("")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    assert_eq!(lines(&out).len(), 1);
}

#[test]
fn update_prompt_is_dismissed() {
    let env = TestEnv::new();
    let out = env
        .cmd()
        .args(["--update", "version=2.0"])
        .write_stdin("https://getlantern.org/update\nlantern:noUpdate\n")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let lines = lines(&out);
    assert!(lines[0].ends_with("/update-copy.html"));
    assert_eq!(lines.last().map(String::as_str), Some("closed"));
}

#[test]
fn missing_templates_fail_to_start() {
    let env = TestEnv::new();
    env.cmd()
        .args(["--templates", "/nonexistent/lantern-templates"])
        .write_stdin("")
        .assert()
        .failure();
}
