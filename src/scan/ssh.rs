//! SSH key discovery.
//!
//! Lists public keys in the user's `.ssh` directory and records whether the
//! matching private half is present. Key material itself is never read into
//! the report, only the file path and the key type token.

use std::path::{Path, PathBuf};

use super::SshKeyInfo;

pub fn default_ssh_dir() -> PathBuf {
    dirs::home_dir()
        .expect("home directory must exist")
        .join(".ssh")
}

/// Scan a directory for `*.pub` keys. A missing or unreadable directory
/// yields an empty list.
pub fn scan_ssh_keys(ssh_dir: &Path) -> Vec<SshKeyInfo> {
    let Ok(entries) = std::fs::read_dir(ssh_dir) else {
        return Vec::new();
    };

    let mut keys: Vec<SshKeyInfo> = entries
        .flatten()
        .filter_map(|entry| {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("pub") {
                return None;
            }
            let name = path.file_stem()?.to_str()?.to_string();
            let has_private = ssh_dir.join(&name).exists();

            let key_type = std::fs::read_to_string(&path)
                .ok()
                .and_then(|content| {
                    let content = content.trim().to_string();
                    if content.starts_with("ssh-") || content.starts_with("ecdsa-") {
                        content.split_whitespace().next().map(str::to_string)
                    } else {
                        None
                    }
                })
                .unwrap_or_else(|| "unknown".into());

            Some(SshKeyInfo {
                name,
                key_type,
                public_key: path.to_string_lossy().into_owned(),
                has_private,
            })
        })
        .collect();

    keys.sort_by(|a, b| a.name.cmp(&b.name));
    keys
}
