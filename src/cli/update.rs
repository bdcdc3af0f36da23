//! CLI `update` command — read a replacement document from stdin and apply it.

use anyhow::{Context, Result};
use chrono::Local;
use std::io::Read;

use crate::audit::{self, UpdateOutcome};
use crate::config::DossierConfig;

pub fn update(config: &DossierConfig) -> Result<()> {
    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .context("failed to read replacement document from stdin")?;

    let context_path = config.resolved_context_path();
    let changelog_path = config.resolved_changelog_path();

    match audit::apply_update(&context_path, &changelog_path, &input, Local::now())? {
        UpdateOutcome::NoChange => {
            println!("No changes detected");
        }
        UpdateOutcome::Applied {
            additions,
            deletions,
        } => {
            println!("Updated {}", context_path.display());
            println!("  +{additions} -{deletions} lines");
            println!("Diff appended to {}", changelog_path.display());
        }
    }

    Ok(())
}
