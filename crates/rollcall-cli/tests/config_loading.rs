//! Integration tests for configuration and scenario files.

use std::io::Write;

use rollcall_cli::Config;
use rollcall_cli::scenario::{Scenario, simulate};
use rollcall_controller::GateState;
use rollcall_core::ReaderId;
use tempfile::NamedTempFile;

const SITE: &str = r#"
[timing]
approval_timeout_ms = 20000
sneak_window_ms = 5000

[roster]
admin_uid = "AD000001"

[[roster.person]]
id = 1
name = "Ada"
class = "5B"
dorm = "H-12"
contact = "555-0101"
uid = "04A1B2C3"

[[roster.person]]
id = 2
name = "Bo"
uid = "04B0B0B0"

[hardware]
absent = []
"#;

fn write_temp(text: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(text.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_load_config_from_file() {
    let file = write_temp(SITE);
    let config = Config::load(Some(file.path())).unwrap();

    assert_eq!(config.roster.people.len(), 2);
    assert_eq!(config.roster.people[0].class, "5B");
    assert_eq!(config.roster.people[1].dorm, "");
    assert_eq!(config.roster().unwrap().len(), 2);
    assert!(!config.is_absent(ReaderId::Gate));
}

#[test]
fn test_missing_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::load(Some(dir.path().join("absent.toml").as_path())).unwrap();

    assert!(config.roster.people.is_empty());
    assert!(config.roster().unwrap().is_empty());
}

#[test]
fn test_malformed_file_is_an_error() {
    let file = write_temp("[timing\n");
    let err = Config::load(Some(file.path())).unwrap_err();
    assert!(format!("{err:#}").contains("parsing config file"));
}

#[test]
fn test_duplicate_credentials_rejected() {
    let file = write_temp(
        r#"
[[roster.person]]
id = 1
name = "Ada"
uid = "04A1B2C3"

[[roster.person]]
id = 2
name = "Bo"
uid = "04a1b2c3"
"#,
    );
    let config = Config::load(Some(file.path())).unwrap();
    assert!(config.roster().is_err());
}

#[test]
fn test_simulated_sneak_scenario() {
    let config = Config::from_toml(SITE).unwrap();
    let scenario = Scenario::from_toml(
        r#"
duration_ms = 20000

[[step]]
at_ms = 100
action = "present"
reader = "gate"
uid = "04A1B2C3"

[[step]]
at_ms = 1000
action = "remove"
reader = "gate"
"#,
    )
    .unwrap();

    let mut out = Vec::new();
    let summary = simulate(&config, &scenario, &mut out).unwrap();

    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], r#"{"event":"boot","status":"ok"}"#);
    assert!(lines.contains(&r#"{"event":"scan","student":"Ada","zone":"gate"}"#));
    assert!(lines.contains(&r#"{"event":"sneaked","student":"Ada"}"#));
    assert!(lines.contains(&r#"{"event":"alarm","student":"Ada","reason":"sneaked"}"#));

    assert_eq!(summary.events, lines.len());
    assert_eq!(summary.bus_violations, 0);
    assert_eq!(summary.final_state.gate_state, GateState::Idle);
    assert_eq!(summary.final_state.counts.sneaked, 1);
}

#[test]
fn test_simulated_approval_with_commands() {
    let config = Config::from_toml(SITE).unwrap();
    let scenario = Scenario::from_toml(
        r#"
duration_ms = 8000

[[step]]
at_ms = 0
action = "command"
line = "MODE:CLASS"

[[step]]
at_ms = 100
action = "present"
reader = "gate"
uid = "04A1B2C3"

[[step]]
at_ms = 500
action = "present"
reader = "classroom"
uid = "AD000001"

[[step]]
at_ms = 600
action = "remove"
reader = "classroom"

[[step]]
at_ms = 700
action = "remove"
reader = "gate"

[[step]]
at_ms = 800
action = "command"
line = "SYNC"
"#,
    )
    .unwrap();

    let mut out = Vec::new();
    let summary = simulate(&config, &scenario, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();

    assert!(text.contains(r#"{"event":"mode_change","mode":"class"}"#));
    assert_eq!(text.matches(r#""event":"approved""#).count(), 1);
    assert_eq!(text.matches(r#""event":"student_info""#).count(), 2);
    assert_eq!(text.matches(r#""event":"sneaked""#).count(), 0);
    assert_eq!(summary.final_state.counts.left, 1);
    assert_eq!(summary.final_state.gate_state, GateState::Idle);
}

fn demo(name: &str) -> std::path::PathBuf {
    std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../demos")
        .join(name)
}

#[test]
fn test_demo_files_run_clean() {
    let config = Config::from_file(&demo("site.toml")).unwrap();

    let sneak = Scenario::from_file(&demo("sneak.toml")).unwrap();
    let mut out = Vec::new();
    let summary = simulate(&config, &sneak, &mut out).unwrap();
    assert_eq!(summary.bus_violations, 0);
    assert_eq!(summary.final_state.gate_state, GateState::Idle);
    assert_eq!(summary.final_state.counts.sneaked, 1);
    assert!(!summary.final_state.alarm_active);

    let approval = Scenario::from_file(&demo("approval.toml")).unwrap();
    let mut out = Vec::new();
    let summary = simulate(&config, &approval, &mut out).unwrap();
    assert_eq!(summary.bus_violations, 0);
    assert_eq!(summary.final_state.gate_state, GateState::Idle);
    assert_eq!(summary.final_state.counts.left, 1);
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains(r#"{"event":"alarm","student":"Bo","reason":"wrong_zone"}"#));
}
