mod helpers;

use chrono::{TimeZone, Utc};
use dossier::context::{build_context, Mode};
use dossier::scan::{CpuInfo, ScanReport};
use helpers::{canonical, sample_report};
use std::path::Path;

fn paths() -> (&'static Path, &'static Path) {
    (
        Path::new("/home/u/claude_context.json"),
        Path::new("/home/u/.claude/context_changelog.diff"),
    )
}

#[test]
fn builder_is_deterministic() {
    let report = sample_report();
    let now = Utc.with_ymd_and_hms(2026, 8, 1, 9, 30, 0).unwrap();
    let (ctx, log) = paths();

    let first = build_context(&report, Mode::Full, now, ctx, log);
    let second = build_context(&report, Mode::Full, now, ctx, log);
    assert_eq!(canonical(&first), canonical(&second));
}

#[test]
fn minimal_keys_are_a_subset_of_full_keys() {
    let report = sample_report();
    let now = Utc.with_ymd_and_hms(2026, 8, 1, 9, 30, 0).unwrap();
    let (ctx, log) = paths();

    let minimal = build_context(&report, Mode::Minimal, now, ctx, log);
    let full = build_context(&report, Mode::Full, now, ctx, log);

    let minimal_keys: Vec<&String> = minimal.as_object().unwrap().keys().collect();
    let full_obj = full.as_object().unwrap();
    for key in &minimal_keys {
        assert!(full_obj.contains_key(*key), "full mode missing key {key}");
    }
    assert!(minimal_keys.len() < full_obj.len());
}

#[test]
fn minimal_mode_keeps_hardware_and_network() {
    let report = ScanReport {
        platform: "linux".into(),
        hostname: "tiny".into(),
        cpu: CpuInfo {
            model: "EPYC 7453".into(),
            cores: 0,
            threads: 0,
        },
        ..Default::default()
    };
    let now = Utc.with_ymd_and_hms(2026, 8, 1, 9, 30, 0).unwrap();
    let (ctx, log) = paths();

    let doc = build_context(&report, Mode::Minimal, now, ctx, log);
    assert_eq!(doc["hardware"]["cpu"], "EPYC 7453");
    assert!(doc.get("network").is_some());
    assert!(doc.get("servers").is_none());
    assert!(doc.get("pending_tasks").is_none());
}

#[test]
fn document_carries_timestamp_and_overview() {
    let report = sample_report();
    let now = Utc.with_ymd_and_hms(2026, 8, 1, 9, 30, 0).unwrap();
    let (ctx, log) = paths();

    let doc = build_context(&report, Mode::Full, now, ctx, log);
    assert_eq!(doc["last_updated"], "2026-08-01T09:30:00Z");
    assert_eq!(doc["infrastructure_overview"]["hostname"], "buildbox");
    assert_eq!(doc["infrastructure_overview"]["platform"], "linux");
    // Loopback filtered out, eth0 address wins
    assert_eq!(doc["infrastructure_overview"]["primary_ip"], "192.168.1.40");
}

#[test]
fn hardware_sections_are_formatted() {
    let report = sample_report();
    let now = Utc.with_ymd_and_hms(2026, 8, 1, 9, 30, 0).unwrap();
    let (ctx, log) = paths();

    let doc = build_context(&report, Mode::Full, now, ctx, log);
    assert_eq!(
        doc["hardware"]["cpu"],
        "AMD EPYC 7453 28-Core Processor (28c/56t)"
    );
    assert_eq!(doc["hardware"]["memory"], "256GB");
    assert_eq!(doc["hardware"]["gpus"]["gpu0"]["model"], "GeForce RTX 3090");
    assert_eq!(doc["hardware"]["gpus"]["gpu0"]["vram"], "24GB");
    assert_eq!(
        doc["hardware"]["storage"]["Samsung_SSD_990_PRO_"]["device"],
        "/dev/nvme0n1"
    );
    assert_eq!(doc["network"]["interfaces"]["eth0"], "192.168.1.40");
    assert_eq!(doc["ssh_keys"]["id_ed25519"]["type"], "ssh-ed25519");
    assert_eq!(doc["ssh_keys"]["id_ed25519"]["has_private"], true);
}

#[test]
fn update_instructions_reference_the_update_command() {
    let report = sample_report();
    let now = Utc.with_ymd_and_hms(2026, 8, 1, 9, 30, 0).unwrap();
    let (ctx, log) = paths();

    let doc = build_context(&report, Mode::Full, now, ctx, log);
    let procedure = doc["_instructions_for_claude"]["update_procedure"]
        .as_str()
        .unwrap();
    assert!(procedure.contains("dossier update"));
    assert!(procedure.contains("/home/u/claude_context.json"));
    assert_eq!(
        doc["context_backup"]["changelog"],
        "/home/u/.claude/context_changelog.diff"
    );
}
