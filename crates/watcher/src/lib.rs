//! Schema file watching
//!
//! Forwards change notifications for the project's Prisma schema into an
//! async channel so the dev loop can re-run migration and generation.
//! Collapsing of rapid event bursts happens in [`debounce`].

pub mod debounce;

use anyhow::{Context, Result};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tracing::trace;

/// Watch patterns the dev workflow registers.
///
/// The schema may live at the project root or under `prisma/`; the host's
/// own app listener must not react to either, while this plugin's listener
/// reacts to nothing else. The allow patterns drive [`SchemaWatcher`]'s
/// event filtering.
#[derive(Debug, Clone)]
pub struct WatcherSettings {
    pub watch_patterns: Vec<String>,
    pub app_ignore_patterns: Vec<String>,
    pub plugin_allow_patterns: Vec<String>,
}

impl Default for WatcherSettings {
    fn default() -> Self {
        Self {
            watch_patterns: vec![
                "./schema.prisma".to_string(),
                "./prisma/schema.prisma".to_string(),
            ],
            app_ignore_patterns: vec!["./prisma/**".to_string(), "./schema.prisma".to_string()],
            plugin_allow_patterns: vec![
                "./schema.prisma".to_string(),
                "./prisma/schema.prisma".to_string(),
            ],
        }
    }
}

impl WatcherSettings {
    /// Whether `path` matches one of the plugin's allow patterns relative to
    /// `root`. Schema copies under `prisma/migrations/` match no pattern and
    /// are therefore ignored.
    pub fn allows(&self, root: &Path, path: &Path) -> bool {
        let Ok(relative) = path.strip_prefix(root) else {
            return false;
        };
        self.plugin_allow_patterns
            .iter()
            .any(|pattern| Path::new(pattern.trim_start_matches("./")) == relative)
    }
}

/// A change notification for the schema file.
#[derive(Debug, Clone)]
pub struct SchemaEvent {
    pub path: PathBuf,
}

/// Live watcher over the project's schema file locations.
pub struct SchemaWatcher {
    /// Kept alive for the lifetime of the watch; dropping it stops notify.
    _watcher: RecommendedWatcher,
    rx: mpsc::UnboundedReceiver<SchemaEvent>,
}

impl SchemaWatcher {
    /// Start watching `root` (and `root/prisma` when present) for changes to
    /// the paths allowed by `settings`.
    pub fn start(root: &Path, settings: &WatcherSettings) -> Result<Self> {
        // Canonicalize so event paths line up with the allow patterns.
        let root = root
            .canonicalize()
            .with_context(|| format!("failed to resolve {}", root.display()))?;
        let (tx, rx) = mpsc::unbounded_channel();

        let settings = settings.clone();
        let filter_root = root.clone();
        let mut watcher =
            notify::recommended_watcher(move |event: notify::Result<Event>| {
                let Ok(event) = event else { return };
                if !matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) {
                    return;
                }
                for path in event.paths {
                    if settings.allows(&filter_root, &path) {
                        trace!(path = %path.display(), "schema change event");
                        let _ = tx.send(SchemaEvent { path });
                    }
                }
            })
            .context("failed to create file watcher")?;

        watcher
            .watch(&root, RecursiveMode::NonRecursive)
            .with_context(|| format!("failed to watch {}", root.display()))?;

        let prisma_dir = root.join("prisma");
        if prisma_dir.is_dir() {
            watcher
                .watch(&prisma_dir, RecursiveMode::NonRecursive)
                .with_context(|| format!("failed to watch {}", prisma_dir.display()))?;
        }

        Ok(Self {
            _watcher: watcher,
            rx,
        })
    }

    /// Next schema change, or `None` once the watcher backend shuts down.
    pub async fn next(&mut self) -> Option<SchemaEvent> {
        self.rx.recv().await
    }
}
