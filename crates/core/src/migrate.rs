//! Migration subcommand wrappers
//!
//! Thin shells around the ORM tool's migration CLI. Responses are judged by
//! their error stream: any error output downgrades the whole operation to a
//! logged failure that the calling hook swallows. Recovery is manual, the
//! user re-runs the command.

use crate::adapter::{HostAdapter, RunResult};
use crate::config::BridgeConfig;
use crate::generate::{self, GenerateOptions};
use anyhow::Result;
use std::path::Path;
use tracing::{error, info, trace};

const FORCE_COLOR: &[(&str, &str)] = &[("FORCE_COLOR", "true")];

/// Marker in the tool's dry-run output meaning there is nothing to apply.
pub const ALREADY_APPLIED: &str = "All migrations are already applied";

async fn run_tool(
    adapter: &dyn HostAdapter,
    config: &BridgeConfig,
    args: &[&str],
) -> Result<RunResult> {
    let mut full = vec!["prisma"];
    full.extend_from_slice(args);
    adapter.run(&config.package_runner, &full, FORCE_COLOR).await
}

/// `db init`: create the development database, apply pending migrations and
/// regenerate the client. Each step runs only when the previous one was
/// healthy.
pub async fn init(adapter: &dyn HostAdapter, config: &BridgeConfig, root: &Path) -> Result<()> {
    let saved = run_tool(
        adapter,
        config,
        &["migrate", "save", "--name", "init", "--create-db", "--experimental"],
    )
    .await?;
    if !handle_tool_response(&saved, "We could not initialize your database", true) {
        return Ok(());
    }

    let migrated = run_tool(
        adapter,
        config,
        &["migrate", "up", "-c", "--auto-approve", "--experimental"],
    )
    .await?;
    if !handle_tool_response(&migrated, "We could not initialize your database", false) {
        return Ok(());
    }

    generate::run_generators(adapter, config, root, GenerateOptions { silent: true }).await
}

/// `db migrate plan`: save a named migration, prompting for the name when
/// none was given.
pub async fn plan(
    adapter: &dyn HostAdapter,
    config: &BridgeConfig,
    migration_name: Option<String>,
) -> Result<()> {
    let name = match migration_name {
        Some(name) => name,
        None => prompt_migration_name(adapter).await?,
    };

    let response = run_tool(
        adapter,
        config,
        &["migrate", "save", "--experimental", "--name", &name],
    )
    .await?;
    handle_tool_response(&response, "We could not generate a migration file", false);
    Ok(())
}

async fn prompt_migration_name(adapter: &dyn HostAdapter) -> Result<String> {
    loop {
        let name = adapter.input("Name of your migration").await?;
        if name.is_empty() {
            info!("Migration names need to have at least one character");
        } else if name.contains(' ') {
            info!("Migration names cannot contain spaces. Use '-' instead");
        } else {
            return Ok(name);
        }
    }
}

/// `db migrate apply`: dry-run, confirm, then apply. `force` skips both the
/// preview and the confirmation.
pub async fn apply(adapter: &dyn HostAdapter, config: &BridgeConfig, force: bool) -> Result<()> {
    if !force {
        let preview = run_tool(
            adapter,
            config,
            &["migrate", "up", "--preview", "--auto-approve", "--experimental"],
        )
        .await?;
        if !handle_tool_response(&preview, "We could not run a dry-run of your migration", false) {
            return Ok(());
        }
        if preview.stdout.contains(ALREADY_APPLIED) {
            return Ok(());
        }
        if !adapter.confirm("Do you want to apply the above migration?").await? {
            info!("Migration not applied.");
            return Ok(());
        }
    }

    println!();
    let response = run_tool(
        adapter,
        config,
        &["migrate", "up", "--auto-approve", "--experimental"],
    )
    .await?;
    handle_tool_response(&response, "We could not migrate your database", false);
    Ok(())
}

/// `db migrate rollback`: revert the last applied migration.
pub async fn rollback(adapter: &dyn HostAdapter, config: &BridgeConfig) -> Result<()> {
    let response = run_tool(adapter, config, &["migrate", "down", "--experimental"]).await?;
    handle_tool_response(&response, "We could not rollback your migration", false);
    Ok(())
}

/// Dev-loop migration against the temporary database state. Unlike the
/// workflow commands this surfaces failure to its caller so the dev loop can
/// decide not to restart the server.
pub async fn tmp_prepare(adapter: &dyn HostAdapter, config: &BridgeConfig) -> Result<RunResult> {
    info!("Prisma Schema change detected, migrating...");
    trace!("running prisma migrate...");

    let result = run_tool(adapter, config, &["tmp-prepare"]).await?;
    trace!(stdout = %result.stdout.trim(), "result");

    if !result.healthy() {
        anyhow::bail!("schema migration failed: {}", result.stderr.trim());
    }
    Ok(result)
}

/// Judge a tool response. Error output (including a failed spawn) is logged
/// under the given headline and reported as unhealthy; otherwise stdout is
/// echoed, with the ORM tool's own CLI hints rewritten to this tool's
/// command names.
pub fn handle_tool_response(response: &RunResult, message: &str, silent_stdout: bool) -> bool {
    if !response.healthy() {
        error!("{message}");
        error!("{}", response.stderr.trim());
        return false;
    }

    if !silent_stdout && !response.stdout.trim().is_empty() {
        println!("{}", rewrite_tool_output(&response.stdout));
    }
    true
}

/// Rewrite the raw tool output so its retry hints name this CLI instead of
/// the ORM tool's own binary, and drop its banner lines.
pub fn rewrite_tool_output(stdout: &str) -> String {
    stdout
        .lines()
        .filter(|line| !line.contains("To apply the migrations, run"))
        .map(|line| {
            line.replace(
                "prisma migrate up --experimental",
                "prisma-bridge db migrate apply",
            )
            .replace("🏋️‍  migrate up --preview", "")
            .replace("🏋️‍  migrate up", "")
        })
        .collect::<Vec<_>>()
        .join("\n")
}
