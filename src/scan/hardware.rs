//! CPU, memory, GPU, and storage probes.
//!
//! CPU and memory come from [`sysinfo`]. GPUs are discovered through vendor
//! tools (`nvidia-smi`, `rocm-smi`) with `lspci` / `system_profiler`
//! fallbacks. Storage prefers `lsblk` on Linux (physical devices with model
//! names) and falls back to mounted filesystems elsewhere.

use sysinfo::{Disks, System};

use super::{platform, run_probe, CpuInfo, DiskInfo, GpuInfo, MemoryInfo};

pub fn scan_cpu(sys: &System) -> CpuInfo {
    let model = sys
        .cpus()
        .first()
        .map(|cpu| cpu.brand().trim().to_string())
        .filter(|brand| !brand.is_empty())
        .unwrap_or_else(|| "Unknown".into());

    CpuInfo {
        model,
        cores: sys.physical_core_count().unwrap_or(0),
        threads: sys.cpus().len(),
    }
}

pub fn scan_memory(sys: &System) -> MemoryInfo {
    let total_bytes = sys.total_memory();
    MemoryInfo {
        total_gb: ((total_bytes as f64) / (1024.0 * 1024.0 * 1024.0)).round() as u64,
    }
}

/// Detect GPUs across vendors. Probes are additive; each one that fails is
/// skipped silently.
pub fn scan_gpus() -> Vec<GpuInfo> {
    let mut gpus = scan_nvidia();
    gpus.extend(scan_rocm());

    if platform() == "linux" && !gpus.iter().any(|g| g.vendor == "AMD") {
        let fallback = scan_lspci(&gpus);
        gpus.extend(fallback);
    }

    if platform() == "macos" {
        gpus.extend(scan_macos_displays());
    }

    gpus
}

fn scan_nvidia() -> Vec<GpuInfo> {
    let Some(output) = run_probe(
        "nvidia-smi",
        &[
            "--query-gpu=index,name,memory.total,pci.bus_id,uuid",
            "--format=csv,noheader,nounits",
        ],
    ) else {
        return Vec::new();
    };

    output
        .lines()
        .filter_map(|line| {
            let parts: Vec<&str> = line.split(',').map(str::trim).collect();
            if parts.len() < 5 {
                return None;
            }
            Some(GpuInfo {
                vendor: "NVIDIA".into(),
                model: parts[1].to_string(),
                index: parts[0].parse().ok(),
                vram_mb: parts[2].parse().ok(),
                pcie_bus: Some(parts[3].to_string()),
                uuid: Some(parts[4].to_string()),
                source: None,
            })
        })
        .collect()
}

fn scan_rocm() -> Vec<GpuInfo> {
    let Some(output) = run_probe(
        "rocm-smi",
        &["--showproductname", "--showmeminfo", "vram", "--json"],
    ) else {
        return Vec::new();
    };

    let Ok(data) = serde_json::from_str::<serde_json::Value>(&output) else {
        return Vec::new();
    };
    let Some(cards) = data.as_object() else {
        return Vec::new();
    };

    cards
        .iter()
        .filter(|(id, _)| id.starts_with("card"))
        .map(|(id, info)| GpuInfo {
            vendor: "AMD".into(),
            model: info
                .get("Card series")
                .and_then(|v| v.as_str())
                .unwrap_or("Unknown AMD GPU")
                .to_string(),
            index: id.trim_start_matches("card").parse().ok(),
            vram_mb: info
                .get("VRAM Total Memory (B)")
                .and_then(|v| v.as_str())
                .and_then(|s| s.parse::<u64>().ok())
                .map(|bytes| bytes / (1024 * 1024)),
            pcie_bus: None,
            uuid: None,
            source: None,
        })
        .collect()
}

/// `lspci -nn` fallback for AMD/Intel GPUs that have no vendor tool installed.
fn scan_lspci(existing: &[GpuInfo]) -> Vec<GpuInfo> {
    let Some(output) = run_probe("lspci", &["-nn"]) else {
        return Vec::new();
    };

    let mut found = Vec::new();
    for line in output.lines() {
        if !line.contains("VGA") && !line.contains("3D controller") {
            continue;
        }
        if line.contains("AMD") || line.contains("ATI") || line.contains("Radeon") {
            let model = lspci_model(line).unwrap_or_else(|| "AMD GPU".into());
            let duplicate = existing
                .iter()
                .chain(found.iter())
                .any(|g: &GpuInfo| g.vendor == "AMD" && g.model.contains(&model));
            if !duplicate {
                found.push(GpuInfo {
                    vendor: "AMD".into(),
                    model,
                    index: None,
                    vram_mb: None,
                    pcie_bus: None,
                    uuid: None,
                    source: Some("lspci".into()),
                });
            }
        } else if line.contains("Intel") {
            found.push(GpuInfo {
                vendor: "Intel".into(),
                model: lspci_model(line).unwrap_or_else(|| "Intel GPU".into()),
                index: None,
                vram_mb: None,
                pcie_bus: None,
                uuid: None,
                source: Some("lspci".into()),
            });
        }
    }
    found
}

/// Extract the device model from an `lspci -nn` line, e.g.
/// `00:02.0 VGA compatible controller [0300]: Intel Corporation UHD Graphics 620 [8086:5917]`
/// yields `Intel Corporation UHD Graphics 620`.
fn lspci_model(line: &str) -> Option<String> {
    let rest = line.splitn(2, "]: ").nth(1)?;
    let model = rest.split(" [").next()?.trim();
    if model.is_empty() {
        None
    } else {
        Some(model.to_string())
    }
}

fn scan_macos_displays() -> Vec<GpuInfo> {
    let Some(output) = run_probe("system_profiler", &["SPDisplaysDataType", "-json"]) else {
        return Vec::new();
    };
    let Ok(data) = serde_json::from_str::<serde_json::Value>(&output) else {
        return Vec::new();
    };

    let displays = data
        .get("SPDisplaysDataType")
        .and_then(|v| v.as_array())
        .cloned()
        .unwrap_or_default();

    displays
        .iter()
        .enumerate()
        .map(|(i, gpu)| {
            let pci_vendor = gpu
                .get("sppci_vendor")
                .and_then(|v| v.as_str())
                .unwrap_or("Unknown");
            let vendor = if pci_vendor.to_lowercase().contains("apple") {
                "Apple".to_string()
            } else {
                pci_vendor.to_string()
            };
            GpuInfo {
                vendor,
                model: gpu
                    .get("sppci_model")
                    .and_then(|v| v.as_str())
                    .unwrap_or("Unknown")
                    .to_string(),
                index: Some(i),
                vram_mb: gpu
                    .get("spdisplays_vram")
                    .and_then(|v| v.as_str())
                    .and_then(parse_vram),
                pcie_bus: None,
                uuid: None,
                source: None,
            }
        })
        .collect()
}

/// Parse a `system_profiler` VRAM string like `"1536 MB"` or `"4 GB"`.
/// Apple Silicon unified memory reports no VRAM at all.
fn parse_vram(text: &str) -> Option<u64> {
    let text = text.trim();
    if let Some(mb) = text.strip_suffix("MB") {
        return mb.trim().parse().ok();
    }
    if let Some(gb) = text.strip_suffix("GB") {
        return gb.trim().parse::<f64>().ok().map(|g| (g * 1024.0) as u64);
    }
    None
}

/// Detect storage devices. On Linux, `lsblk` reports physical disks with
/// model names; everywhere else we fall back to mounted filesystems.
pub fn scan_storage() -> Vec<DiskInfo> {
    if platform() == "linux" {
        if let Some(disks) = scan_lsblk() {
            if !disks.is_empty() {
                return disks;
            }
        }
    }
    scan_mounted_disks()
}

fn scan_lsblk() -> Option<Vec<DiskInfo>> {
    let output = run_probe("lsblk", &["-d", "-o", "NAME,SIZE,TYPE,MODEL", "-n"])?;
    let disks = output
        .lines()
        .filter_map(|line| {
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() < 3 || parts[2] != "disk" {
                return None;
            }
            Some(DiskInfo {
                device: format!("/dev/{}", parts[0]),
                size: parts[1].to_string(),
                model: if parts.len() > 3 {
                    parts[3..].join(" ")
                } else {
                    "Unknown".into()
                },
            })
        })
        .collect();
    Some(disks)
}

fn scan_mounted_disks() -> Vec<DiskInfo> {
    let disks = Disks::new_with_refreshed_list();
    let mut seen = std::collections::BTreeSet::new();
    let mut result = Vec::new();
    for disk in disks.list() {
        let device = disk.name().to_string_lossy().into_owned();
        // The same device can back several mount points
        if !seen.insert(device.clone()) {
            continue;
        }
        result.push(DiskInfo {
            device,
            size: format_size(disk.total_space()),
            model: "Unknown".into(),
        });
    }
    result
}

/// Render a byte count the way `lsblk` does, e.g. `931.5G` or `512M`.
fn format_size(bytes: u64) -> String {
    const GIB: f64 = 1024.0 * 1024.0 * 1024.0;
    const MIB: f64 = 1024.0 * 1024.0;
    let bytes = bytes as f64;
    if bytes >= GIB {
        format!("{:.1}G", bytes / GIB)
    } else if bytes >= MIB {
        format!("{:.0}M", bytes / MIB)
    } else {
        format!("{bytes:.0}B")
    }
}
