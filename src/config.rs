use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct DossierConfig {
    pub paths: PathsConfig,
    pub log: LogConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct PathsConfig {
    /// The context document consumed by the assistant at session start.
    pub context_file: String,
    /// Append-only changelog recording every context mutation.
    pub changelog_file: String,
    /// Claude Code configuration directory (hooks and settings live here).
    pub claude_dir: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
}

impl Default for DossierConfig {
    fn default() -> Self {
        Self {
            paths: PathsConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        let home = dirs::home_dir().expect("home directory must exist");
        let claude_dir = home.join(".claude");
        Self {
            context_file: home
                .join("claude_context.json")
                .to_string_lossy()
                .into_owned(),
            changelog_file: claude_dir
                .join("context_changelog.diff")
                .to_string_lossy()
                .into_owned(),
            claude_dir: claude_dir.to_string_lossy().into_owned(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
        }
    }
}

/// Returns `~/.dossier/`
pub fn default_dossier_dir() -> PathBuf {
    dirs::home_dir()
        .expect("home directory must exist")
        .join(".dossier")
}

/// Returns the default config file path: `~/.dossier/config.toml`
pub fn default_config_path() -> PathBuf {
    default_dossier_dir().join("config.toml")
}

impl DossierConfig {
    /// Load config from TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            DossierConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides (DOSSIER_CONTEXT, DOSSIER_CHANGELOG,
    /// DOSSIER_LOG_LEVEL).
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("DOSSIER_CONTEXT") {
            self.paths.context_file = val;
        }
        if let Ok(val) = std::env::var("DOSSIER_CHANGELOG") {
            self.paths.changelog_file = val;
        }
        if let Ok(val) = std::env::var("DOSSIER_LOG_LEVEL") {
            self.log.level = val;
        }
    }

    /// Resolve the context file path, expanding `~` if needed.
    pub fn resolved_context_path(&self) -> PathBuf {
        expand_tilde(&self.paths.context_file)
    }

    /// Resolve the changelog file path, expanding `~` if needed.
    pub fn resolved_changelog_path(&self) -> PathBuf {
        expand_tilde(&self.paths.changelog_file)
    }

    /// Resolve the Claude configuration directory, expanding `~` if needed.
    pub fn resolved_claude_dir(&self) -> PathBuf {
        expand_tilde(&self.paths.claude_dir)
    }

    /// Serialize this config as TOML for persisting at install time.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("failed to serialize config TOML")
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        dirs::home_dir()
            .expect("home directory must exist")
            .join(rest)
    } else {
        PathBuf::from(path)
    }
}
