//! Run the Prisma generators for the project schema (build/generate hooks)

use anyhow::Result;
use bridge_core::adapter::ShellAdapter;
use bridge_core::config::BridgeConfig;
use bridge_core::generate::{self, GenerateOptions};
use bridge_core::BridgeError;
use tracing::error;

pub async fn run(silent: bool) -> Result<()> {
    let root = crate::util::find_project_root()?;
    let config = BridgeConfig::load(&root)?;
    let adapter = ShellAdapter;

    match generate::run_generators(&adapter, &config, &root, GenerateOptions { silent }).await {
        Ok(()) => Ok(()),
        Err(err) => {
            if matches!(
                err.downcast_ref::<BridgeError>(),
                Some(BridgeError::SchemaNotFound { .. })
            ) {
                error!("{err}");
                std::process::exit(1);
            }
            Err(err)
        }
    }
}
