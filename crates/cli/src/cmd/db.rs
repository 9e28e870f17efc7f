//! Database workflow subcommands

use anyhow::{Context, Result};
use bridge_core::adapter::ShellAdapter;
use bridge_core::config::BridgeConfig;
use bridge_core::migrate;
use std::path::PathBuf;
use tokio::process::Command;
use tracing::{error, info, warn};

fn project() -> Result<(PathBuf, BridgeConfig)> {
    let root = crate::util::find_project_root()?;
    let config = BridgeConfig::load(&root)?;
    Ok((root, config))
}

pub async fn run_init() -> Result<()> {
    let (root, config) = project()?;
    migrate::init(&ShellAdapter, &config, &root).await
}

pub async fn run_plan(name: Option<String>) -> Result<()> {
    let (_root, config) = project()?;
    migrate::plan(&ShellAdapter, &config, name).await
}

pub async fn run_apply(force: bool) -> Result<()> {
    let (_root, config) = project()?;
    migrate::apply(&ShellAdapter, &config, force).await
}

pub async fn run_rollback() -> Result<()> {
    let (_root, config) = project()?;
    migrate::rollback(&ShellAdapter, &config).await
}

/// Start the ORM tool's data browser against the project schema and open it
/// in the browser.
pub async fn run_ui(port: Option<u16>) -> Result<()> {
    let (root, config) = project()?;

    let Some(schema) = bridge_core::schema::find_schema(&root) else {
        error!("We could not find your schema.prisma file");
        std::process::exit(1);
    };

    let port = match port {
        Some(port) => port,
        None => pick_free_port(5555, 5600)?,
    };
    let port_arg = port.to_string();
    let schema_arg = format!("--schema={}", schema.display());

    let mut child = Command::new(&config.package_runner)
        .args(["prisma", "studio", "--port", &port_arg, &schema_arg])
        .current_dir(&root)
        .spawn()
        .with_context(|| {
            format!(
                "failed to start the data browser with `{}`",
                config.package_runner
            )
        })?;

    let url = studio_url(port);
    info!("Studio started at {url}");
    if let Err(err) = opener::open(&url) {
        warn!("could not open {url} in your browser: {err}");
    }

    // Runs until the user interrupts it; the browser owns the terminal.
    child.wait().await?;
    Ok(())
}

fn studio_url(port: u16) -> String {
    format!("http://localhost:{port}")
}

fn pick_free_port(from: u16, to: u16) -> Result<u16> {
    for port in from..=to {
        if std::net::TcpListener::bind(("127.0.0.1", port)).is_ok() {
            return Ok(port);
        }
    }
    anyhow::bail!("no free port between {from} and {to}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_port_is_in_range() {
        let port = pick_free_port(5555, 5600).unwrap();
        assert!((5555..=5600).contains(&port));
    }

    #[test]
    fn studio_url_uses_the_selected_port() {
        assert_eq!(studio_url(5555), "http://localhost:5555");
    }
}
