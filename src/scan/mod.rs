//! Best-effort system scanner.
//!
//! Produces a [`ScanReport`] snapshot of local hardware, network, and SSH key
//! facts. Every probe degrades gracefully: a missing utility, permission
//! error, or unsupported platform yields a placeholder or omitted field,
//! never a failed scan.

pub mod hardware;
pub mod network;
pub mod ssh;

use serde::{Deserialize, Serialize};
use std::process::Command;
use sysinfo::System;

/// Combined output of all probes. JSON-serializable, deterministic for a
/// fixed machine state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanReport {
    pub platform: String,
    pub hostname: String,
    pub cpu: CpuInfo,
    pub memory: MemoryInfo,
    pub gpus: Vec<GpuInfo>,
    pub storage: Vec<DiskInfo>,
    pub network: NetworkInfo,
    pub ssh_keys: Vec<SshKeyInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CpuInfo {
    pub model: String,
    pub cores: usize,
    pub threads: usize,
}

impl Default for CpuInfo {
    fn default() -> Self {
        Self {
            model: "Unknown".into(),
            cores: 0,
            threads: 0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryInfo {
    pub total_gb: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GpuInfo {
    pub vendor: String,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vram_mb: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pcie_bus: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    /// Which probe discovered this GPU, when it was not a vendor tool.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiskInfo {
    pub device: String,
    pub size: String,
    pub model: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetworkInfo {
    pub interfaces: Vec<InterfaceInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterfaceInfo {
    pub name: String,
    pub ipv4: Vec<String>,
    pub ipv6: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SshKeyInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub key_type: String,
    pub public_key: String,
    pub has_private: bool,
}

/// Normalized platform name: `linux`, `macos`, or `windows`.
pub fn platform() -> &'static str {
    std::env::consts::OS
}

/// Run every probe and assemble the full report.
pub fn scan_system() -> ScanReport {
    let mut sys = System::new();
    sys.refresh_cpu_all();
    sys.refresh_memory();

    ScanReport {
        platform: platform().to_string(),
        hostname: System::host_name().unwrap_or_else(|| "Unknown".into()),
        cpu: hardware::scan_cpu(&sys),
        memory: hardware::scan_memory(&sys),
        gpus: hardware::scan_gpus(),
        storage: hardware::scan_storage(),
        network: network::scan_interfaces(),
        ssh_keys: ssh::scan_ssh_keys(&ssh::default_ssh_dir()),
    }
}

/// Run an external probe command, returning its stdout on success.
///
/// Any failure (missing binary, non-zero exit, empty or non-UTF8 output)
/// returns `None` so callers fall through to the next probe.
pub(crate) fn run_probe(cmd: &str, args: &[&str]) -> Option<String> {
    match Command::new(cmd).args(args).output() {
        Ok(output) if output.status.success() => {
            let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
            if text.is_empty() {
                None
            } else {
                Some(text)
            }
        }
        Ok(output) => {
            tracing::debug!(cmd, status = %output.status, "probe exited non-zero");
            None
        }
        Err(err) => {
            tracing::debug!(cmd, %err, "probe unavailable");
            None
        }
    }
}
