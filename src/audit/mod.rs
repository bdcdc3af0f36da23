//! Update path — validation, diff, changelog append, atomic replace.
//!
//! [`apply_update`] is the single entry point. It validates the replacement
//! document before touching anything on disk: a malformed document leaves
//! both the context file and the changelog byte-for-byte unchanged. The
//! changelog entry is committed before the context file is replaced, so every
//! on-disk state of the document has a corresponding diff in the log.

pub mod diff;

use chrono::{DateTime, Local};
use serde_json::Value;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

/// Labels used in the `---`/`+++` diff headers.
const DIFF_FROM_LABEL: &str = "claude_context.json.old";
const DIFF_TO_LABEL: &str = "claude_context.json.new";

/// Context lines per hunk.
const DIFF_CONTEXT: usize = 3;

/// Separator line between changelog blocks.
pub const CHANGELOG_SEPARATOR: &str =
    "============================================================";

/// Failure taxonomy for the update path.
///
/// Input failures abort before any file is touched; I/O failures abort before
/// the context file is mutated.
#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("no content provided on stdin")]
    EmptyInput,
    #[error("invalid JSON in replacement document: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("{context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl UpdateError {
    fn io(context: impl Into<String>) -> impl FnOnce(std::io::Error) -> Self {
        let context = context.into();
        move |source| Self::Io { context, source }
    }
}

/// Result of a successful update invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Replacement was identical to the current document; nothing written.
    NoChange,
    /// Context replaced and changelog appended.
    Applied {
        additions: usize,
        deletions: usize,
    },
}

/// Canonical serialized form: pretty-printed with sorted keys and a trailing
/// newline. Diffs are always computed between canonical forms so formatting
/// noise never shows up in the changelog.
pub fn canonical_json(value: &Value) -> String {
    let mut text = serde_json::to_string_pretty(value).expect("JSON value serializes");
    text.push('\n');
    text
}

/// Replace the context document with `new_content`, recording the transition
/// in the changelog.
///
/// A missing context file is treated as an empty document, so the first
/// update logs a diff against `{}`. An existing file that fails to parse is
/// also treated as empty (with a warning) rather than blocking the update.
pub fn apply_update(
    context_path: &Path,
    changelog_path: &Path,
    new_content: &str,
    now: DateTime<Local>,
) -> Result<UpdateOutcome, UpdateError> {
    let new_content = new_content.trim();
    if new_content.is_empty() {
        return Err(UpdateError::EmptyInput);
    }

    let new_json: Value = serde_json::from_str(new_content)?;

    let old_json: Value = if context_path.exists() {
        let old_content = std::fs::read_to_string(context_path).map_err(UpdateError::io(
            format!("failed to read {}", context_path.display()),
        ))?;
        serde_json::from_str(&old_content).unwrap_or_else(|_| {
            tracing::warn!(
                path = %context_path.display(),
                "existing context file is not valid JSON, diffing against empty document"
            );
            serde_json::json!({})
        })
    } else {
        serde_json::json!({})
    };

    let old_formatted = canonical_json(&old_json);
    let new_formatted = canonical_json(&new_json);

    let diff_text = diff::unified_diff(
        &old_formatted,
        &new_formatted,
        DIFF_FROM_LABEL,
        DIFF_TO_LABEL,
        DIFF_CONTEXT,
    );
    if diff_text.is_empty() {
        return Ok(UpdateOutcome::NoChange);
    }

    append_changelog_entry(changelog_path, &diff_text, now)?;
    write_atomic(context_path, &new_formatted)?;

    let (additions, deletions) = diff::added_removed(&diff_text);
    Ok(UpdateOutcome::Applied {
        additions,
        deletions,
    })
}

/// Append one timestamped diff block to the changelog, creating the file and
/// its parent directory on first use.
pub fn append_changelog_entry(
    changelog_path: &Path,
    diff_text: &str,
    now: DateTime<Local>,
) -> Result<(), UpdateError> {
    if let Some(parent) = changelog_path.parent() {
        std::fs::create_dir_all(parent).map_err(UpdateError::io(format!(
            "failed to create directory {}",
            parent.display()
        )))?;
    }

    let entry = format!(
        "\n{sep}\n# {ts}\n{sep}\n{diff_text}\n",
        sep = CHANGELOG_SEPARATOR,
        ts = now.format("%Y-%m-%d %H:%M:%S"),
    );

    let mut file = std::fs::OpenOptions::new()
        .append(true)
        .create(true)
        .open(changelog_path)
        .map_err(UpdateError::io(format!(
            "failed to open changelog {}",
            changelog_path.display()
        )))?;
    file.write_all(entry.as_bytes()).map_err(UpdateError::io(format!(
        "failed to append to changelog {}",
        changelog_path.display()
    )))?;

    Ok(())
}

/// Seed a fresh changelog with the baseline document. Called once at install
/// time; an existing changelog is left untouched (it is append-only).
pub fn write_changelog_baseline(
    changelog_path: &Path,
    baseline: &str,
    now: DateTime<Local>,
    context_path: &Path,
) -> Result<bool, UpdateError> {
    if changelog_path.exists() {
        return Ok(false);
    }
    if let Some(parent) = changelog_path.parent() {
        std::fs::create_dir_all(parent).map_err(UpdateError::io(format!(
            "failed to create directory {}",
            parent.display()
        )))?;
    }

    let content = format!(
        "# Dossier context changelog\n\
         # Tracks all changes to {context}\n\
         # Use this file to recover deleted information or review history\n\
         \n\
         {sep}\n\
         # {ts} - BASELINE\n\
         {sep}\n\
         {baseline}\n",
        context = context_path.display(),
        sep = CHANGELOG_SEPARATOR,
        ts = now.format("%Y-%m-%d %H:%M:%S"),
    );

    std::fs::write(changelog_path, content).map_err(UpdateError::io(format!(
        "failed to write changelog {}",
        changelog_path.display()
    )))?;
    Ok(true)
}

/// Write a file atomically: write a `.tmp` sibling, then rename over the
/// target. Readers never observe a torn document.
pub fn write_atomic(path: &Path, contents: &str) -> Result<(), UpdateError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(UpdateError::io(format!(
            "failed to create directory {}",
            parent.display()
        )))?;
    }

    let tmp_path = path.with_extension("tmp");
    std::fs::write(&tmp_path, contents).map_err(UpdateError::io(format!(
        "failed to write temp file {}",
        tmp_path.display()
    )))?;
    std::fs::rename(&tmp_path, path).map_err(UpdateError::io(format!(
        "failed to replace {}",
        path.display()
    )))?;
    Ok(())
}
