//! CLI `doctor` command — check the installation and print a health report.

use anyhow::Result;

use crate::audit::CHANGELOG_SEPARATOR;
use crate::config::DossierConfig;
use crate::install;

/// Inspect the context file, changelog, hook script, and settings
/// registration. Read-only.
pub fn doctor(config: &DossierConfig) -> Result<()> {
    let context_path = config.resolved_context_path();
    let changelog_path = config.resolved_changelog_path();
    let claude_dir = config.resolved_claude_dir();
    let script_path = claude_dir.join("hooks").join("load_context.sh");
    let settings_path = claude_dir.join("settings.json");

    println!("Dossier Health Report");
    println!("=====================");
    println!();

    println!("Context file:      {}", context_path.display());
    if context_path.exists() {
        let size = std::fs::metadata(&context_path).map(|m| m.len()).unwrap_or(0);
        println!("  Size:            {}", format_bytes(size));
        match std::fs::read_to_string(&context_path)
            .ok()
            .and_then(|s| serde_json::from_str::<serde_json::Value>(&s).ok())
        {
            Some(doc) => {
                println!("  Valid JSON:      yes");
                if let Some(updated) = doc.get("last_updated").and_then(|v| v.as_str()) {
                    println!("  Last updated:    {updated}");
                }
            }
            None => println!("  Valid JSON:      NO - next update will diff against empty"),
        }
    } else {
        println!("  Status:          not found - run `dossier setup`");
    }
    println!();

    println!("Changelog:         {}", changelog_path.display());
    if changelog_path.exists() {
        let size = std::fs::metadata(&changelog_path).map(|m| m.len()).unwrap_or(0);
        println!("  Size:            {}", format_bytes(size));
        println!("  Entries:         {}", changelog_entries(&changelog_path));
    } else {
        println!("  Status:          not found - run `dossier setup`");
    }
    println!();

    println!("Hook script:       {}", script_path.display());
    if script_path.exists() {
        println!("  Status:          installed");
        if !is_executable(&script_path) {
            println!("  WARNING: not executable - rerun `dossier setup --force`");
        }
    } else {
        println!("  Status:          not found - run `dossier setup`");
    }
    println!();

    println!("Settings:          {}", settings_path.display());
    if install::session_hook_registered(&settings_path, &script_path.to_string_lossy()) {
        println!("  SessionStart:    registered");
    } else {
        println!("  SessionStart:    NOT registered - run `dossier setup`");
    }

    Ok(())
}

/// Count timestamped blocks (baseline included) by counting separator pairs.
fn changelog_entries(path: &std::path::Path) -> usize {
    std::fs::read_to_string(path)
        .map(|content| {
            content
                .lines()
                .filter(|line| *line == CHANGELOG_SEPARATOR)
                .count()
                / 2
        })
        .unwrap_or(0)
}

#[cfg(unix)]
fn is_executable(path: &std::path::Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|m| m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(_path: &std::path::Path) -> bool {
    true
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
