//! CLI `setup` command — scan the system, build the context document, and
//! install the hook and changelog.

use anyhow::Result;
use chrono::{Local, Utc};
use std::path::PathBuf;

use crate::audit;
use crate::config::{self, DossierConfig};
use crate::context::{build_context, Mode};
use crate::install;
use crate::scan;

pub struct SetupArgs {
    /// Only include hardware/network sections.
    pub minimal: bool,
    /// Print discovered facts and exit without installing.
    pub scan_only: bool,
    /// Override the context file location.
    pub context_path: Option<PathBuf>,
    /// Overwrite files that already exist.
    pub force: bool,
}

pub fn setup(mut config: DossierConfig, args: &SetupArgs) -> Result<()> {
    println!("Dossier - Setup");
    println!("========================================");

    println!();
    println!("Scanning system...");
    let report = scan::scan_system();

    if args.scan_only {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("  Platform: {}", report.platform);
    println!("  Hostname: {}", report.hostname);
    println!("  CPU: {}", report.cpu.model);
    println!("  Memory: {}GB", report.memory.total_gb);
    println!("  GPUs: {}", report.gpus.len());
    println!("  Storage devices: {}", report.storage.len());
    println!("  Network interfaces: {}", report.network.interfaces.len());
    println!("  SSH keys: {}", report.ssh_keys.len());

    if let Some(ref path) = args.context_path {
        config.paths.context_file = path.to_string_lossy().into_owned();
    }
    let context_path = config.resolved_context_path();
    let changelog_path = config.resolved_changelog_path();
    let claude_dir = config.resolved_claude_dir();

    println!();
    println!("Building context...");
    let mode = if args.minimal {
        Mode::Minimal
    } else {
        Mode::Full
    };
    let document = build_context(&report, mode, Utc::now(), &context_path, &changelog_path);

    println!();
    println!("Installing components...");

    if install::write_context_file(&context_path, &document, args.force)? {
        println!("  Created context file: {}", context_path.display());
    } else {
        println!(
            "  Context file already exists, keeping it: {} (rerun with --force to regenerate)",
            context_path.display()
        );
    }

    let (script_path, written) =
        install::install_hook_script(&claude_dir, &context_path, args.force)?;
    if written {
        println!("  Installed hook script: {}", script_path.display());
    } else {
        println!("  Hook script already present: {}", script_path.display());
    }

    let settings_path = claude_dir.join("settings.json");
    if install::register_session_hook(&settings_path, &script_path.to_string_lossy())? {
        println!("  Updated settings: {}", settings_path.display());
    } else {
        println!("  Hook already registered, skipping");
    }

    let baseline = audit::canonical_json(&document);
    if audit::write_changelog_baseline(&changelog_path, &baseline, Local::now(), &context_path)? {
        println!("  Initialized changelog: {}", changelog_path.display());
    }

    let config_path = config::default_config_path();
    if install::write_config_file(&config_path, &config, args.force)? {
        println!("  Wrote config: {}", config_path.display());
    }

    println!();
    println!("========================================");
    println!("Setup complete!");
    println!();
    println!("========================================");
    println!("NEXT STEP: Start a Claude Code session and paste this prompt:");
    println!("========================================");
    println!(
        r#"
I just installed Dossier. Read {} to see my system
configuration that was auto-detected.

Help me add:
- Remote servers I SSH into regularly (IP, user, purpose)
- Credentials you'll need for accessing systems
- Key file paths I reference often
- Any active projects with current status

Use the update pattern shown in _instructions_for_claude.
"#,
        context_path.display()
    );

    Ok(())
}
