//! Installer — context file, session hook script, and settings registration.
//!
//! Claude Code's `SessionStart` hooks run a command whose output is injected
//! at the start of every session. The installer drops a small shell script
//! that prints the context document and registers it under
//! `hooks.SessionStart` in `settings.json`, preserving every unrelated
//! setting and hook entry.
//!
//! There is no rollback: a partially completed install is corrected by
//! rerunning `dossier setup`.

use anyhow::{Context, Result};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};

use crate::audit;
use crate::config::DossierConfig;

/// Write the generated context document. Refuses to overwrite an existing
/// file unless `force` is set. Returns whether the file was written.
pub fn write_context_file(path: &Path, document: &Value, force: bool) -> Result<bool> {
    if path.exists() && !force {
        return Ok(false);
    }
    audit::write_atomic(path, &audit::canonical_json(document))
        .with_context(|| format!("failed to write context file {}", path.display()))?;
    Ok(true)
}

/// The session hook: print the context file, or a one-line diagnostic to
/// stderr if it is missing. No parsing, no validation.
pub fn hook_script_content(context_path: &Path) -> String {
    format!(
        r#"#!/bin/bash
# Dossier - SessionStart hook
# Prints the context document at session start

CONTEXT_FILE="{}"

if [ -f "$CONTEXT_FILE" ]; then
    cat "$CONTEXT_FILE"
else
    echo "Context file not found: $CONTEXT_FILE" >&2
fi
"#,
        context_path.display()
    )
}

/// Install the hook script into `<claude_dir>/hooks/load_context.sh` and mark
/// it executable. An existing script is left alone unless `force` is set.
/// Returns the script path and whether it was (re)written.
pub fn install_hook_script(
    claude_dir: &Path,
    context_path: &Path,
    force: bool,
) -> Result<(PathBuf, bool)> {
    let hooks_dir = claude_dir.join("hooks");
    std::fs::create_dir_all(&hooks_dir)
        .with_context(|| format!("failed to create hooks dir {}", hooks_dir.display()))?;

    let script_path = hooks_dir.join("load_context.sh");
    if script_path.exists() && !force {
        return Ok((script_path, false));
    }

    std::fs::write(&script_path, hook_script_content(context_path))
        .with_context(|| format!("failed to write hook script {}", script_path.display()))?;
    set_executable(&script_path)?;

    Ok((script_path, true))
}

#[cfg(unix)]
fn set_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mut perms = std::fs::metadata(path)
        .with_context(|| format!("failed to stat {}", path.display()))?
        .permissions();
    perms.set_mode(perms.mode() | 0o111);
    std::fs::set_permissions(path, perms)
        .with_context(|| format!("failed to set permissions on {}", path.display()))?;
    Ok(())
}

#[cfg(not(unix))]
fn set_executable(_path: &Path) -> Result<()> {
    Ok(())
}

/// The entry registered under `hooks.SessionStart`.
fn hook_entry(hook_command: &str) -> Value {
    json!({
        "matcher": "",
        "hooks": [{
            "type": "command",
            "command": hook_command
        }]
    })
}

/// Check whether a `SessionStart` entry already runs `hook_command`.
fn is_hook_registered(session_start: &[Value], hook_command: &str) -> bool {
    session_start.iter().any(|entry| {
        entry
            .get("hooks")
            .and_then(|h| h.as_array())
            .is_some_and(|hooks| {
                hooks.iter().any(|h| {
                    h.get("command")
                        .and_then(|c| c.as_str())
                        .is_some_and(|cmd| cmd == hook_command)
                })
            })
    })
}

/// Read-only probe used by `dossier doctor`.
pub fn session_hook_registered(settings_path: &Path, hook_command: &str) -> bool {
    let Ok(content) = std::fs::read_to_string(settings_path) else {
        return false;
    };
    let Ok(settings) = serde_json::from_str::<Value>(&content) else {
        return false;
    };
    settings
        .get("hooks")
        .and_then(|h| h.get("SessionStart"))
        .and_then(|s| s.as_array())
        .is_some_and(|entries| is_hook_registered(entries, hook_command))
}

/// Register the session hook in `settings.json`, creating the file if needed.
///
/// Idempotent, and preserves every existing key and hook entry: only the one
/// `SessionStart` entry is appended, and only when it is not already present.
/// Returns whether an entry was added.
pub fn register_session_hook(settings_path: &Path, hook_command: &str) -> Result<bool> {
    if let Some(parent) = settings_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }

    // Load existing settings or start fresh. An unparsable settings file is
    // not overwritten: registering into it would destroy the user's config.
    let mut settings: Value = if settings_path.exists() {
        let content = std::fs::read_to_string(settings_path)
            .with_context(|| format!("failed to read {}", settings_path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("{} is not valid JSON", settings_path.display()))?
    } else {
        json!({})
    };

    let obj = settings
        .as_object_mut()
        .context("settings.json is not a JSON object")?;

    let hooks = obj.entry("hooks").or_insert(json!({}));
    let hooks_obj = hooks
        .as_object_mut()
        .context("hooks is not a JSON object")?;

    let session_start = hooks_obj.entry("SessionStart").or_insert(json!([]));
    let entries = session_start
        .as_array_mut()
        .context("SessionStart is not an array")?;

    if is_hook_registered(entries, hook_command) {
        return Ok(false);
    }

    entries.push(hook_entry(hook_command));

    let output = serde_json::to_string_pretty(&settings)
        .context("failed to serialize settings")?;
    std::fs::write(settings_path, output + "\n")
        .with_context(|| format!("failed to write {}", settings_path.display()))?;

    Ok(true)
}

/// Persist the effective config so later `dossier update` invocations resolve
/// the same context and changelog paths. Skipped when a config already
/// exists, unless `force` is set.
pub fn write_config_file(
    config_path: &Path,
    config: &DossierConfig,
    force: bool,
) -> Result<bool> {
    if config_path.exists() && !force {
        return Ok(false);
    }
    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }
    std::fs::write(config_path, config.to_toml()?)
        .with_context(|| format!("failed to write config {}", config_path.display()))?;
    Ok(true)
}
