//! Context document builder.
//!
//! Turns a [`ScanReport`](crate::scan::ScanReport) into the JSON document the
//! assistant loads at session start. The builder is a pure function of the
//! report, the mode, and the timestamp, so identical inputs always produce
//! byte-identical output.

use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use std::path::Path;

use crate::scan::{CpuInfo, DiskInfo, GpuInfo, NetworkInfo, ScanReport, SshKeyInfo};

/// Which sections to include in the generated document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Hardware and network facts only.
    Minimal,
    /// Also seed the empty tracking sections (servers, projects, notes).
    Full,
}

/// Build the full context document.
pub fn build_context(
    report: &ScanReport,
    mode: Mode,
    now: DateTime<Utc>,
    context_path: &Path,
    changelog_path: &Path,
) -> Value {
    let context_display = context_path.display().to_string();

    let mut context = json!({
        "_instructions_for_claude": {
            "purpose": "Persistent infrastructure configuration for continuity across sessions.",
            "update_procedure": format!(
                "NEVER use Edit/Write directly - pipe the full replacement document \
                 through `dossier update` to preserve the audit trail.\n\
                 Pattern: jq '.key.subkey = \"value\"' {context_display} | dossier update\n\
                 This pattern is tested and correct - use it directly without exploration."
            ),
            "maintenance_policy": "Update when infrastructure changes. Facts only, no explanations - you are the consumer of this file. Keep actionable, delete stale."
        },
        "context_backup": {
            "changelog": changelog_path.display().to_string(),
            "update_command": "dossier update"
        },
        "last_updated": now.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
        "infrastructure_overview": {
            "hostname": report.hostname,
            "platform": report.platform,
            "primary_ip": primary_ip(&report.network)
        },
        "hardware": {
            "cpu": cpu_summary(&report.cpu),
            "memory": format!("{}GB", report.memory.total_gb),
            "gpus": format_gpus(&report.gpus),
            "storage": format_storage(&report.storage)
        },
        "network": {
            "interfaces": format_network(&report.network)
        },
        "ssh_keys": format_ssh_keys(&report.ssh_keys)
    });

    if mode == Mode::Full {
        let obj = context.as_object_mut().expect("built as object");
        obj.insert("servers".into(), json!({}));
        obj.insert("credentials".into(), json!({}));
        obj.insert("key_paths".into(), json!({}));
        obj.insert("active_projects".into(), json!({}));
        obj.insert("pending_tasks".into(), json!([]));
        obj.insert("important_notes".into(), json!([]));
    }

    context
}

/// `"<model> (Nc/Mt)"`, or just the model when core counts are unknown.
fn cpu_summary(cpu: &CpuInfo) -> String {
    if cpu.cores > 0 && cpu.threads > 0 {
        format!("{} ({}c/{}t)", cpu.model, cpu.cores, cpu.threads)
    } else {
        cpu.model.clone()
    }
}

/// First non-loopback, non-link-local IPv4 across all interfaces.
fn primary_ip(network: &NetworkInfo) -> String {
    for iface in &network.interfaces {
        for ip in &iface.ipv4 {
            if !ip.starts_with("127.") && !ip.starts_with("169.254.") {
                return ip.clone();
            }
        }
    }
    "Unknown".into()
}

fn format_gpus(gpus: &[GpuInfo]) -> Value {
    if gpus.is_empty() {
        return json!({"note": "No GPUs detected"});
    }

    let mut map = serde_json::Map::new();
    for (i, gpu) in gpus.iter().enumerate() {
        let idx = gpu.index.unwrap_or(i);
        let mut entry = serde_json::Map::new();
        entry.insert("vendor".into(), json!(gpu.vendor));
        entry.insert("model".into(), json!(gpu.model));
        if let Some(vram_mb) = gpu.vram_mb {
            let vram = if vram_mb >= 1024 {
                format!("{}GB", vram_mb / 1024)
            } else {
                format!("{vram_mb}MB")
            };
            entry.insert("vram".into(), json!(vram));
        }
        if let Some(ref bus) = gpu.pcie_bus {
            entry.insert("pcie_bus".into(), json!(bus));
        }
        if let Some(ref uuid) = gpu.uuid {
            entry.insert("uuid".into(), json!(uuid));
        }
        map.insert(format!("gpu{idx}"), Value::Object(entry));
    }
    Value::Object(map)
}

fn format_storage(disks: &[DiskInfo]) -> Value {
    if disks.is_empty() {
        return json!({"note": "No storage devices detected"});
    }

    let mut map = serde_json::Map::new();
    for (i, disk) in disks.iter().enumerate() {
        let model_key: String = disk.model.replace(' ', "_").chars().take(20).collect();
        let key = if model_key.is_empty() || model_key == "Unknown" {
            format!("disk{i}")
        } else {
            model_key
        };
        map.insert(
            key,
            json!({
                "device": disk.device,
                "size": disk.size,
                "model": disk.model
            }),
        );
    }
    Value::Object(map)
}

/// Interfaces with at least one IPv4 address; single addresses collapse to a
/// scalar, multiple addresses stay a list.
fn format_network(network: &NetworkInfo) -> Value {
    let mut map = serde_json::Map::new();
    for iface in &network.interfaces {
        match iface.ipv4.as_slice() {
            [] => continue,
            [single] => {
                map.insert(iface.name.clone(), json!(single));
            }
            many => {
                map.insert(iface.name.clone(), json!(many));
            }
        }
    }
    Value::Object(map)
}

fn format_ssh_keys(keys: &[SshKeyInfo]) -> Value {
    if keys.is_empty() {
        return json!({"note": "No SSH keys found in ~/.ssh/"});
    }

    let mut map = serde_json::Map::new();
    for key in keys {
        map.insert(
            key.name.clone(),
            json!({
                "type": key.key_type,
                "has_private": key.has_private
            }),
        );
    }
    Value::Object(map)
}
