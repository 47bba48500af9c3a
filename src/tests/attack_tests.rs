// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use crate::event::RawEvent;
use crate::replay::replay;
use crate::view::AttackPhase;
use serde_json::{json, Value};

fn ev(kind: &str, data: Value) -> RawEvent {
    match data {
        Value::Object(payload) => RawEvent::new(0.0, kind, payload),
        _ => RawEvent::new(0.0, kind, Default::default()),
    }
}

fn repeat(kind: &str, n: usize) -> Vec<RawEvent> {
    (0..n).map(|_| ev(kind, json!({}))).collect()
}

#[test]
fn test_reset_mid_run_discards_prior_counts() {
    let mut events = vec![ev("ransom_scan_start", json!({"total": 10}))];
    events.extend(repeat("ransom_encrypt_done", 5));
    events.push(ev("ransom_reset", json!({})));
    events.extend(repeat("ransom_encrypt_done", 2));

    let ransom = replay(events).ransom();
    assert_eq!(ransom.encrypted, 2);
    assert_eq!(ransom.total, 2);
    assert_ne!(ransom.status, AttackPhase::Done);
    assert_eq!(ransom.last_event.as_deref(), Some("ransom_encrypt_done"));
}

#[test]
fn test_reset_dominance_every_domain() {
    let cases = [
        ("hdr_corrupt_start", "hdr_file", "header_reset"),
        ("simulate_corrupt_start", "simulate_corrupt_file", "corrupt_reset"),
        ("simulate_ransomware_start", "simulate_ransomware_file", "system_start"),
    ];

    for (start, unit, reset) in cases {
        for n in [0usize, 1, 4] {
            let mut events = vec![ev(start, json!({"total": 50}))];
            events.extend(repeat(unit, 7));
            events.push(ev(reset, json!({})));
            events.extend(repeat(unit, n));
            let views = replay(events);

            let (success, total) = match unit {
                "hdr_file" => (views.header().total_success, views.header().total),
                "simulate_corrupt_file" => (views.corrupt().total_success, views.corrupt().total),
                _ => (views.ransom().encrypted, views.ransom().total),
            };
            assert_eq!(success, n as u64, "{reset} then {n} x {unit}");
            assert_eq!(total, n as u64);
        }
    }
}

#[test]
fn test_system_reset_clears_all_domains() {
    let views = replay(vec![
        ev("ransom_scan_start", json!({"total": 3})),
        ev("hdr_corrupt_start", json!({"total": 3, "mode": "zero"})),
        ev("simulate_corrupt_start", json!({"total": 3, "folder": "LZ4"})),
        ev("start_normal_mode", json!({})),
    ]);
    assert_eq!(views.ransom().status, AttackPhase::Idle);
    assert_eq!(views.ransom().last_event.as_deref(), Some("start_normal_mode"));
    assert_eq!(views.header().status, AttackPhase::Idle);
    assert_eq!(views.header().mode, "unknown");
    assert_eq!(views.corrupt().status, AttackPhase::Idle);
    assert_eq!(views.corrupt().folder, "unknown");
}

#[test]
fn test_domain_reset_is_local() {
    let views = replay(vec![
        ev("hdr_corrupt_start", json!({"total": 2})),
        ev("hdr_file", json!({"status": "ok"})),
        ev("corrupt_reset", json!({})),
    ]);
    assert_eq!(views.header().status, AttackPhase::Running);
    assert_eq!(views.header().total_success, 1);
}

#[test]
fn test_ransom_full_cycle() {
    let mut events = vec![ev("simulate_ransomware_start", json!({"total": 4}))];
    events.extend(repeat("encrypt_end", 3));
    events.push(ev("encrypt_end", json!({"status": "failed"})));
    events.extend(repeat("decrypt_end", 2));

    let running = replay(events.clone()).ransom();
    assert_eq!(running.status, AttackPhase::Running);
    assert!(running.running);
    assert_eq!(running.encrypted, 3);
    assert_eq!(running.total_fail, 1);
    assert_eq!(running.decrypted, 2);
    assert_eq!(running.total, 4);

    events.push(ev("simulate_ransomware_done", json!({"total_success": 9, "total_fail": 0})));
    let done = replay(events).ransom();
    assert_eq!(done.status, AttackPhase::Done);
    assert!(!done.running);
    assert_eq!(done.encrypted, 9);
    assert_eq!(done.total_success, 9);
    assert_eq!(done.total_fail, 0);
    assert_eq!(done.decrypted, 2);
}

#[test]
fn test_ransom_completion_prefers_count() {
    let ransom = replay(vec![
        ev("ransom_scan_start", json!({"total": 5})),
        ev("ransom_simulation_end", json!({"count": 4, "total_success": 1})),
    ])
    .ransom();
    assert_eq!(ransom.encrypted, 4);
}

#[test]
fn test_completion_without_counts_keeps_running_values() {
    let mut events = vec![ev("hdr_corrupt_start", json!({"total": 3, "mode": "zero"}))];
    events.extend(repeat("hdr_file", 2));
    events.push(ev("hdr_done", json!({})));

    let header = replay(events).header();
    assert_eq!(header.status, AttackPhase::Done);
    assert_eq!(header.total_success, 2);
    assert_eq!(header.mode, "zero");
}

#[test]
fn test_header_done_overwrites() {
    let header = replay(vec![
        ev("hdr_corrupt_start", json!({"total": 3, "mode": "zero"})),
        ev("hdr_file", json!({"status": "ok"})),
        ev("hdr_file", json!({"status": "error"})),
        ev("hdr_done", json!({"success": 2, "fail": 1, "mode": "random"})),
    ])
    .header();
    assert_eq!(header.status, AttackPhase::Done);
    assert_eq!(header.total, 3);
    assert_eq!(header.total_success, 2);
    assert_eq!(header.total_fail, 1);
    assert_eq!(header.mode, "random");
}

#[test]
fn test_corrupt_error_keeps_counts() {
    let corrupt = replay(vec![
        ev("simulate_corrupt_start", json!({"total": 3, "folder": "ZSTD"})),
        ev("simulate_corrupt_file", json!({})),
        ev("simulate_corrupt_error", json!({"error": "disk"})),
    ])
    .corrupt();
    assert_eq!(corrupt.status, AttackPhase::Error);
    assert_eq!(corrupt.total_success, 1);
    assert_eq!(corrupt.folder, "ZSTD");
    assert_eq!(corrupt.mode, "corrupt_simulation");
}

#[test]
fn test_error_event_feeds_global_counter_too() {
    let views = replay(vec![ev("hdr_corrupt_error", json!({}))]);
    assert_eq!(views.header().status, AttackPhase::Error);
    assert_eq!(views.summary().global.errors, 1);
}

#[test]
fn test_decrypt_run_from_simulator() {
    let mut events = vec![ev("simulate_ransomware_start", json!({"total": 3}))];
    events.extend(repeat("simulate_ransomware_file", 3));
    events.push(ev("simulate_ransomware_done", json!({"total_success": 3, "total_fail": 0})));
    events.push(ev("decrypt_start", json!({"total": 3, "folder": "attack"})));
    events.push(ev("decrypt_file", json!({"idx": 1, "status": "ok"})));
    events.push(ev("decrypt_file", json!({"idx": 2, "status": "error", "error": "bad token"})));
    events.push(ev("decrypt_file", json!({"idx": 3, "status": "ok"})));

    let running = replay(events.clone()).ransom();
    assert_eq!(running.decrypted, 2);
    assert_eq!(running.encrypted, 3);
    assert_eq!(running.total_fail, 0);
    assert_eq!(running.status, AttackPhase::Done);

    events.push(ev("decrypt_done", json!({"total_success": 5, "total_fail": 1})));
    let done = replay(events.clone()).ransom();
    assert_eq!(done.decrypted, 5);
    assert_eq!(done.status, AttackPhase::Done);

    events.push(ev("decrypt_done", json!({})));
    assert_eq!(replay(events.clone()).ransom().decrypted, 5);

    events.push(ev("decrypt_error", json!({"error": "key_not_found"})));
    let failed = replay(events).ransom();
    assert_eq!(failed.status, AttackPhase::Error);
    assert_eq!(failed.decrypted, 5);
}

#[test]
fn test_last_event_tracks_every_kind() {
    let views = replay(vec![
        ev("ransom_scan_start", json!({"total": 2})),
        ev("ransom_encrypt_done", json!({})),
        ev("backup_result", json!({"file": "a", "algo": "lz4"})),
        ev("hdr_file", json!({"status": "ok"})),
    ]);
    let ransom = views.ransom();
    assert_eq!(ransom.last_event.as_deref(), Some("hdr_file"));
    assert_eq!(ransom.encrypted, 1);
    assert!(ransom.running);
}
