//! Shared helpers for CLI commands

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Project root: the nearest ancestor of cwd carrying a bridge config, a
/// Prisma schema or a `prisma/` directory. Falls back to cwd so that
/// scaffolding into a fresh directory works.
pub fn find_project_root() -> Result<PathBuf> {
    let cwd = std::env::current_dir().context("Failed to get current directory")?;

    let mut current = cwd.clone();
    loop {
        if current.join(bridge_core::config::CONFIG_FILE).exists()
            || current.join("schema.prisma").exists()
            || current.join("prisma").is_dir()
        {
            return Ok(current);
        }
        match current.parent() {
            Some(parent) => current = parent.to_path_buf(),
            None => return Ok(cwd),
        }
    }
}

/// Project name used in scaffolded connection strings.
pub fn project_name(root: &Path) -> String {
    root.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| "app".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_name_is_the_directory_name() {
        assert_eq!(project_name(Path::new("/tmp/my-app")), "my-app");
        assert_eq!(project_name(Path::new("/")), "app");
    }
}
