//! View and create the bridge configuration

use anyhow::Result;
use bridge_core::config::{BridgeConfig, CONFIG_FILE};
use owo_colors::OwoColorize;

/// List the effective configuration values.
pub async fn run_list() -> Result<()> {
    let root = crate::util::find_project_root()?;
    let config = BridgeConfig::load(&root)?;
    let path = root.join(CONFIG_FILE);

    println!("{}", "Bridge Configuration".bold());
    println!("{}: {}\n", "Location".dimmed(), path.display().dimmed());

    println!("  {} = {}", "client_dir".cyan(), config.client_dir.display());
    println!("  {} = {}", "package_runner".cyan(), config.package_runner);
    println!("  {} = {}", "dev_command".cyan(), config.dev_command);

    if !path.exists() {
        println!(
            "\n{}",
            "File does not exist; defaults shown. Run 'prisma-bridge config init' to create it."
                .yellow()
        );
    }
    Ok(())
}

/// Write a commented sample config when none exists.
pub async fn run_init() -> Result<()> {
    let root = crate::util::find_project_root()?;
    let path = root.join(CONFIG_FILE);

    if path.exists() {
        println!("{}", path.display());
        return Ok(());
    }

    std::fs::write(&path, BridgeConfig::example())?;
    println!("{} Created config file at: {}", "✓".green(), path.display());
    Ok(())
}
