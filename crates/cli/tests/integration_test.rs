use std::fs;
use std::path::Path;
use tempfile::tempdir;
use vaultline_cli::commands::{backup, evaluate, events, reset, restore, status, summary, transfer};
use vaultline_cli::engine::{format_opt, format_ts, ReplaySession};
use vaultline_kernel::view::AttackPhase;
use vaultline_node::config::NodeConfig;
use vaultline_persistence::fixtures;

fn config_in(dir: &Path) -> NodeConfig {
    NodeConfig {
        ledger_path: dir.join("events.jsonl"),
        source_root: dir.join("src"),
        artifact_root: dir.join("backup"),
        restore_root: dir.join("restore"),
        mirror_root: dir.join("airgap"),
        codecs: vec!["lz4".into(), "zstd".into()],
        ..NodeConfig::default()
    }
}

#[test]
fn test_read_only_commands_over_fixture() {
    let dir = tempdir().unwrap();
    let paths = fixtures::generate_test_scenario(dir.path()).unwrap();

    assert!(summary::run(&paths.ledger, false).is_ok());
    assert!(summary::run(&paths.ledger, true).is_ok());
    assert!(events::run(&paths.ledger, 5).is_ok());
    assert!(status::run(&paths.ledger).is_ok());
    assert!(evaluate::run(&paths.ledger).is_ok());
}

#[test]
fn test_replay_session_over_fixture() {
    let dir = tempdir().unwrap();
    let paths = fixtures::generate_test_scenario(dir.path()).unwrap();
    fixtures::append_raw(&paths.ledger, "{ torn line").unwrap();

    let session = ReplaySession::open(&paths.ledger).unwrap();
    // Two malformed lines ship with the fixture.
    assert_eq!(session.skipped, 3);
    assert!(session.first_ts.unwrap() <= session.last_ts.unwrap());
    assert_eq!(session.views.summary().global.total_files, 2);
    assert_eq!(session.views.ransom().status, AttackPhase::Running);
}

#[test]
fn test_missing_ledger_is_empty() {
    let dir = tempdir().unwrap();
    let session = ReplaySession::open(&dir.path().join("none.jsonl")).unwrap();
    assert_eq!(session.events, 0);
    assert_eq!(session.first_ts, None);
    assert!(status::run(&dir.path().join("none.jsonl")).is_ok());
}

#[test]
fn test_backup_restore_transfer_workflow() {
    let dir = tempdir().unwrap();
    let cfg = config_in(dir.path());
    fs::create_dir_all(cfg.source_root.join("docs")).unwrap();
    fs::write(cfg.source_root.join("docs/readme.md"), "# title\n".repeat(200)).unwrap();

    assert!(backup::run(&cfg, None).is_ok());
    assert!(restore::run(&cfg).is_ok());
    assert!(transfer::run(&cfg, None).is_ok());
    assert!(cfg.mirror_root.join("ZSTD/docs/readme.md.zst").exists());

    let session = ReplaySession::open(&cfg.ledger_path).unwrap();
    let global = session.views.summary().global;
    assert_eq!(global.total_backup_pairs, 2);
    assert_eq!(global.total_restore_ok, 2);
    assert_eq!(global.errors, 0);
}

#[test]
fn test_transfer_into_artifact_root_fails() {
    let dir = tempdir().unwrap();
    let cfg = config_in(dir.path());
    fs::create_dir_all(&cfg.artifact_root).unwrap();
    assert!(transfer::run(&cfg, Some(&cfg.artifact_root.join("x"))).is_err());
}

#[test]
fn test_reset_appends_system_start() {
    let dir = tempdir().unwrap();
    let paths = fixtures::generate_test_scenario(dir.path()).unwrap();
    let cfg = NodeConfig {
        ledger_path: paths.ledger.clone(),
        ..config_in(dir.path())
    };

    assert!(reset::run(&cfg).is_ok());
    let session = ReplaySession::open(&paths.ledger).unwrap();
    assert_eq!(session.views.ransom().status, AttackPhase::Idle);
    assert_eq!(session.views.header().status, AttackPhase::Idle);
    // History survives the reset.
    assert_eq!(session.views.summary().global.total_files, 2);
}

#[test]
fn test_formatting_helpers() {
    assert_eq!(format_ts(None), "-");
    assert_eq!(format_ts(Some(0.5)), "1970-01-01T00:00:00.500Z");
    assert_eq!(format_opt(Some(1.23456), 2), "1.23");
    assert_eq!(format_opt(None, 2), "-");
}
