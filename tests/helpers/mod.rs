#![allow(dead_code)]

use dossier::scan::{
    CpuInfo, DiskInfo, GpuInfo, InterfaceInfo, MemoryInfo, NetworkInfo, ScanReport, SshKeyInfo,
};
use serde_json::Value;
use std::path::PathBuf;
use tempfile::TempDir;

/// A scratch directory with context and changelog paths inside it.
/// The directory is removed when the value drops.
pub struct TestEnv {
    pub dir: TempDir,
    pub context_path: PathBuf,
    pub changelog_path: PathBuf,
}

pub fn test_env() -> TestEnv {
    let dir = tempfile::tempdir().expect("tmpdir");
    let context_path = dir.path().join("claude_context.json");
    let changelog_path = dir.path().join("context_changelog.diff");
    TestEnv {
        dir,
        context_path,
        changelog_path,
    }
}

/// A fixed scan report resembling a small homelab box.
pub fn sample_report() -> ScanReport {
    ScanReport {
        platform: "linux".into(),
        hostname: "buildbox".into(),
        cpu: CpuInfo {
            model: "AMD EPYC 7453 28-Core Processor".into(),
            cores: 28,
            threads: 56,
        },
        memory: MemoryInfo { total_gb: 256 },
        gpus: vec![GpuInfo {
            vendor: "NVIDIA".into(),
            model: "GeForce RTX 3090".into(),
            index: Some(0),
            vram_mb: Some(24576),
            pcie_bus: Some("00000000:01:00.0".into()),
            uuid: Some("GPU-0aa8".into()),
            source: None,
        }],
        storage: vec![DiskInfo {
            device: "/dev/nvme0n1".into(),
            size: "1.8T".into(),
            model: "Samsung SSD 990 PRO 2TB".into(),
        }],
        network: NetworkInfo {
            interfaces: vec![
                InterfaceInfo {
                    name: "eth0".into(),
                    ipv4: vec!["192.168.1.40".into()],
                    ipv6: vec!["fe80::1".into()],
                },
                InterfaceInfo {
                    name: "lo".into(),
                    ipv4: vec!["127.0.0.1".into()],
                    ipv6: vec!["::1".into()],
                },
            ],
        },
        ssh_keys: vec![SshKeyInfo {
            name: "id_ed25519".into(),
            key_type: "ssh-ed25519".into(),
            public_key: "/home/u/.ssh/id_ed25519.pub".into(),
            has_private: true,
        }],
    }
}

/// Canonical serialized form (sorted keys, trailing newline), matching what
/// the update path writes to disk.
pub fn canonical(value: &Value) -> String {
    dossier::audit::canonical_json(value)
}

/// Extract the diff body of the last changelog entry (everything after the
/// final separator line).
pub fn last_changelog_diff(changelog: &str) -> String {
    let sep_line = format!("{}\n", dossier::audit::CHANGELOG_SEPARATOR);
    let idx = changelog
        .rfind(&sep_line)
        .expect("changelog has at least one separator");
    changelog[idx + sep_line.len()..].trim_end().to_string() + "\n"
}

/// Reference unified-diff applier: replays a diff on top of `old` and returns
/// the reconstructed text. Used to verify the changelog round-trip property.
pub fn apply_unified(old: &str, diff: &str) -> String {
    let old_lines: Vec<&str> = old.lines().collect();
    let mut out: Vec<String> = Vec::new();
    let mut old_pos = 0usize;

    for line in diff.lines() {
        if line.starts_with("--- ") || line.starts_with("+++ ") {
            continue;
        }
        if let Some(header) = line.strip_prefix("@@ -") {
            let old_range = header.split_whitespace().next().unwrap();
            let mut parts = old_range.split(',');
            let start: usize = parts.next().unwrap().parse().unwrap();
            let count: usize = parts.next().map_or(1, |c| c.parse().unwrap());
            let hunk_start = if count == 0 { start } else { start - 1 };
            while old_pos < hunk_start {
                out.push(old_lines[old_pos].to_string());
                old_pos += 1;
            }
        } else if let Some(ctx) = line.strip_prefix(' ') {
            out.push(ctx.to_string());
            old_pos += 1;
        } else if line.starts_with('-') {
            old_pos += 1;
        } else if let Some(added) = line.strip_prefix('+') {
            out.push(added.to_string());
        }
    }
    while old_pos < old_lines.len() {
        out.push(old_lines[old_pos].to_string());
        old_pos += 1;
    }

    let mut text = out.join("\n");
    if !text.is_empty() {
        text.push('\n');
    }
    text
}
