//! Project-level bridge configuration
//!
//! `bridge.toml` at the project root. The generated client location is an
//! explicit setting resolved once at startup, instead of environment-variable
//! sensitive module resolution.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "bridge.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Where the ORM tool emits the generated client (and where the schema
    /// copy used for change detection is cached).
    pub client_dir: PathBuf,
    /// Program used to invoke project-local binaries (`npx`, `yarn`, ...).
    pub package_runner: String,
    /// Command the dev loop supervises and restarts on schema changes.
    pub dev_command: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            client_dir: PathBuf::from("node_modules/@prisma/client"),
            package_runner: "npx".to_string(),
            dev_command: "npm run dev".to_string(),
        }
    }
}

impl BridgeConfig {
    /// Load the project config, falling back to defaults when the file is
    /// absent.
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("invalid config in {}", path.display()))
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = root.join(CONFIG_FILE);
        let raw = toml::to_string_pretty(self).context("failed to serialize config")?;
        std::fs::write(&path, raw).with_context(|| format!("failed to write {}", path.display()))
    }

    /// Generated client directory resolved against the project root.
    pub fn resolved_client_dir(&self, root: &Path) -> PathBuf {
        if self.client_dir.is_absolute() {
            self.client_dir.clone()
        } else {
            root.join(&self.client_dir)
        }
    }

    /// Path of the schema copy cached beside the generated client.
    pub fn cached_schema_path(&self, root: &Path) -> PathBuf {
        self.resolved_client_dir(root).join("schema.prisma")
    }

    /// Commented sample config.
    pub fn example() -> String {
        let defaults = Self::default();
        format!(
            "# Prisma bridge configuration\n\
             \n\
             # Location of the generated database client.\n\
             client_dir = \"{}\"\n\
             \n\
             # Program used to invoke project-local binaries.\n\
             package_runner = \"{}\"\n\
             \n\
             # Dev server command supervised by `prisma-bridge dev`.\n\
             dev_command = \"{}\"\n",
            defaults.client_dir.display(),
            defaults.package_runner,
            defaults.dev_command,
        )
    }
}
