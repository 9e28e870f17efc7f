//! Dev loop: run generators, supervise the host dev server and re-migrate on
//! schema changes.
//!
//! Schema saves arriving while a migration is in flight collapse into one
//! trailing migration; the server restarts only after a healthy migration.

use anyhow::{Context, Result};
use bridge_core::adapter::ShellAdapter;
use bridge_core::config::BridgeConfig;
use bridge_core::generate::{self, GenerateOptions};
use bridge_core::migrate;
use bridge_watcher::debounce::DebouncedTrigger;
use bridge_watcher::{SchemaWatcher, WatcherSettings};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tracing::{error, info, trace};

pub async fn run() -> Result<()> {
    let root = crate::util::find_project_root()?;
    let config = Arc::new(BridgeConfig::load(&root)?);
    let adapter = Arc::new(ShellAdapter);

    generate::run_generators(adapter.as_ref(), &config, &root, GenerateOptions::default())
        .await?;

    let settings = WatcherSettings::default();
    trace!(?settings, "registering schema watcher");
    let mut watcher = SchemaWatcher::start(&root, &settings)?;

    let mut server = spawn_dev_server(&config, &root)?;
    info!("dev server started: {}", config.dev_command);

    let migrate_db = {
        let adapter = adapter.clone();
        let config = config.clone();
        DebouncedTrigger::new(move || {
            let adapter = adapter.clone();
            let config = config.clone();
            async move {
                migrate::tmp_prepare(adapter.as_ref(), &config)
                    .await
                    .map(|_| ())
            }
        })
    };
    let (restart_tx, mut restart_rx) = mpsc::unbounded_channel();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("shutting down");
                let _ = server.kill().await;
                return Ok(());
            }
            event = watcher.next() => {
                let Some(event) = event else {
                    anyhow::bail!("schema watcher stopped unexpectedly");
                };
                // Off the loop so saves arriving mid-migration reach the
                // trigger and collapse into its trailing run.
                dispatch_migration(&migrate_db, event.path, &restart_tx);
            }
            Some(path) = restart_rx.recv() => {
                // Waiters that shared one migration all report it; restart
                // the server once.
                while restart_rx.try_recv().is_ok() {}
                info!("Migration applied");
                let _ = server.kill().await;
                server = spawn_dev_server(&config, &root)?;
                info!(file = %path.display(), "dev server restarted");
            }
        }
    }
}

/// Hand one schema save to the debounced migration trigger. A healthy
/// migration reports back on `restart_tx`.
fn dispatch_migration(
    trigger: &DebouncedTrigger<()>,
    path: PathBuf,
    restart_tx: &mpsc::UnboundedSender<PathBuf>,
) {
    let trigger = trigger.clone();
    let restart_tx = restart_tx.clone();
    tokio::spawn(async move {
        match trigger.call().await {
            Ok(()) => {
                let _ = restart_tx.send(path);
            }
            // Soft-fail: keep watching, the user fixes the schema and
            // saves again.
            Err(err) => error!("{err}"),
        }
    });
}

fn spawn_dev_server(config: &BridgeConfig, root: &Path) -> Result<Child> {
    let mut parts = config.dev_command.split_whitespace();
    let program = parts.next().context("dev_command is empty")?;
    Command::new(program)
        .args(parts)
        .current_dir(root)
        .spawn()
        .with_context(|| format!("failed to spawn dev server `{}`", config.dev_command))
}
