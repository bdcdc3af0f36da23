//! Persistent machine context for AI coding agents.
//!
//! Dossier scans the local machine for hardware, network, and SSH key facts,
//! writes them into a JSON context document, and wires that document into
//! Claude Code via a `SessionStart` hook so every session starts with an
//! accurate picture of the infrastructure it is running on. Every later
//! mutation of the document goes through an update path that appends a
//! unified diff to an append-only changelog before replacing the file.
//!
//! # Architecture
//!
//! - **Scanner**: best-effort probes via [sysinfo](https://docs.rs/sysinfo)
//!   plus vendor tools (`nvidia-smi`, `rocm-smi`, `lspci`); any failed probe
//!   degrades to a placeholder instead of aborting
//! - **Builder**: pure function from scan report to the fixed document schema
//! - **Audit**: line-based unified diff, changelog append, atomic replace
//! - **Installer**: hook script plus idempotent `settings.json` registration
//!
//! Single-threaded and process-per-invocation throughout. Concurrent updates
//! are last-writer-wins by design; the atomic replace only guarantees readers
//! never see a torn document.
//!
//! # Modules
//!
//! - [`config`] — Configuration loading from TOML files and environment variables
//! - [`scan`] — Hardware, network, and SSH key probes
//! - [`context`] — Context document builder (minimal and full modes)
//! - [`audit`] — Update writer: diff, changelog, atomic replace
//! - [`install`] — Session hook and settings installation

pub mod audit;
pub mod config;
pub mod context;
pub mod install;
pub mod scan;
