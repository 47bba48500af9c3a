// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use crate::replay::{replay_text, Replayer};
use crate::view::AttackPhase;

const CLEAN: &str = r#"{"ts": 1.0, "event": "hash_original", "data": {"file": "a.txt", "size": 10, "sha256": "H"}}
{"ts": 2.0, "event": "backup_result", "data": {"file": "a.txt", "algo": "zstd", "ratio": 0.3, "duration_ms": 4}}
{"ts": 3.0, "event": "hdr_corrupt_start", "data": {"total": 1, "mode": "zero"}}
"#;

#[test]
fn test_garbage_lines_do_not_change_views() {
    let noisy = format!(
        "\n   \nnot json\n[1,2]\n\"string\"\n{}{{\"ts\": 9, \"event\": \"backup_res\n{}",
        &CLEAN[..CLEAN.find('\n').unwrap() + 1],
        &CLEAN[CLEAN.find('\n').unwrap() + 1..],
    );
    let clean = replay_text(CLEAN);
    let dirty = replay_text(&noisy);
    assert_eq!(clean.summary(), dirty.summary());
    assert_eq!(clean.header(), dirty.header());
}

#[test]
fn test_truncated_tail_is_skipped() {
    let text = format!("{CLEAN}{{\"ts\": 4.0, \"event\": \"hdr_done\", \"da");
    let views = replay_text(&text);
    assert_eq!(views.header().status, AttackPhase::Running);
    assert_eq!(views.applied(), 3);
}

#[test]
fn test_unknown_kinds_are_noops() {
    let mut replayer = Replayer::default();
    assert!(replayer.apply_line(r#"{"ts": 1, "event": "weather_report", "data": {"file": "a"}}"#));
    assert!(replayer.apply_line(r#"{"ts": 1, "event": "", "data": {}}"#));
    let views = replayer.finish();
    assert_eq!(views.summary().global.total_files, 0);
    assert_eq!(views.summary().global.errors, 0);
    assert_eq!(views.ransom().status, AttackPhase::Idle);
}

#[test]
fn test_missing_required_fields_drop_event() {
    let views = replay_text(
        r#"{"ts": 1, "event": "hash_original", "data": {"size": 5}}
{"ts": 1, "event": "backup_result", "data": {"file": "a"}}
{"ts": 1, "event": "backup_result", "data": {"algo": "lz4"}}
{"ts": 1, "event": "restore_validated", "data": {"file": "", "ok": true}}
{"ts": 1, "event": "restore_validated", "data": {"file": "LZ4/", "ok": true}}
"#,
    );
    let global = views.summary().global;
    assert_eq!(global.total_files, 0);
    assert_eq!(global.total_backup_pairs, 0);
    assert_eq!(global.total_restore, 0);
}

#[test]
fn test_wrong_typed_fields_read_as_absent() {
    let views = replay_text(
        r#"{"ts": "soon", "event": "hash_original", "data": {"file": "a", "size": "12", "sha256": 7}}
{"ts": 1, "event": "hdr_corrupt_start", "data": {"total": "many", "mode": 3}}
{"ts": 1, "event": "restore_validated", "data": {"file": "Brotli/a", "ok": "yes"}}
"#,
    );
    let summary = views.summary();
    assert_eq!(summary.files[0].size, 12);
    assert_eq!(summary.files[0].sha, "");
    assert_eq!(summary.global.total_restore_ok, 0);
    let header = views.header();
    assert_eq!(header.status, AttackPhase::Running);
    assert_eq!(header.total, 0);
    assert_eq!(header.mode, "unknown");
}

#[test]
fn test_legacy_aliases_and_type_key() {
    let views = replay_text(
        r#"{"ts": 1, "type": "hash_original", "data": {"filepath": "old.txt", "size": 1, "sha256": "H"}}
{"ts": 2, "type": "backup_result", "data": {"rel_path": "old.txt", "algo": "gzip"}}
"#,
    );
    let summary = views.summary();
    assert_eq!(summary.files[0].file, "old.txt");
    assert_eq!(summary.files[0].algos, vec!["gzip"]);
}
