//! Generator invocation pipeline
//!
//! Runs the ORM tool's code generators for the project schema, skipping the
//! work entirely when the schema is byte-identical to the copy cached beside
//! the generated client.

use crate::adapter::HostAdapter;
use crate::config::BridgeConfig;
use crate::error::BridgeError;
use crate::migrate::handle_tool_response;
use crate::schema::{self, GeneratorBlock, CLIENT_GENERATOR_BLOCK, CLIENT_PROVIDER};
use anyhow::Result;
use std::path::Path;
use tracing::{info, trace, warn};

#[derive(Debug, Clone, Copy, Default)]
pub struct GenerateOptions {
    pub silent: bool,
}

/// Execute all generators declared in the project schema.
pub async fn run_generators(
    adapter: &dyn HostAdapter,
    config: &BridgeConfig,
    root: &Path,
    opts: GenerateOptions,
) -> Result<()> {
    let schema_path = schema::find_schema(root).ok_or_else(|| BridgeError::SchemaNotFound {
        root: root.to_path_buf(),
    })?;

    let cached_path = config.cached_schema_path(root);
    let local = adapter.read_file(&schema_path).await?;
    let cached = adapter.read_file(&cached_path).await?;
    if !should_regenerate(local.as_deref(), cached.as_deref()) {
        trace!("generators were not run because the schema was not updated");
        return Ok(());
    }

    if !opts.silent {
        info!("Running Prisma generators ...");
    }

    let generators = ensure_client_generator(adapter, &schema_path).await?;
    for generator in &generators {
        trace!(
            name = %generator.name,
            provider = %generator.provider,
            output = ?generator.output,
            "generating"
        );
    }

    let schema_arg = format!("--schema={}", schema_path.display());
    let response = adapter
        .run(&config.package_runner, &["prisma", "generate", &schema_arg], &[])
        .await?;
    if !handle_tool_response(&response, "We could not run your Prisma generators", opts.silent) {
        // Soft-fail: the user fixes the schema and re-runs.
        return Ok(());
    }

    // Cache the schema text we just generated from so an unchanged schema
    // skips the next run. The scaffolded generator block, if any, is part of
    // the file by now.
    if let Some(current) = adapter.read_file(&schema_path).await? {
        adapter.write_file(&cached_path, &current).await?;
    }
    Ok(())
}

/// Regenerate unless the local schema is byte-identical to the cached copy.
/// A missing file on either side always regenerates.
pub fn should_regenerate(local: Option<&str>, cached_copy: Option<&str>) -> bool {
    match (local, cached_copy) {
        (Some(local), Some(copy)) => local != copy,
        _ => true,
    }
}

/// Make sure the schema declares a client generator, scaffolding one at the
/// top of the file when absent, and return the declared generators.
pub async fn ensure_client_generator(
    adapter: &dyn HostAdapter,
    schema_path: &Path,
) -> Result<Vec<GeneratorBlock>> {
    let contents = adapter.read_file(schema_path).await?.unwrap_or_default();
    let generators = schema::parse_generators(&contents);
    if generators
        .iter()
        .any(|generator| generator.provider == CLIENT_PROVIDER)
    {
        return Ok(generators);
    }

    warn!(
        "a Prisma Client JS generator block is needed in your Prisma schema at \"{}\"",
        schema_path.display()
    );
    warn!("we scaffolded one for you");

    let patched = format!("{CLIENT_GENERATOR_BLOCK}\n{contents}");
    adapter.write_file(schema_path, &patched).await?;
    Ok(schema::parse_generators(&patched))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::stub::StubAdapter;
    use crate::adapter::RunResult;

    const SCHEMA_WITH_CLIENT: &str = "generator prisma_client {\n  provider = \"prisma-client-js\"\n}\n\nmodel World {\n  id Int @id\n}\n";

    #[test]
    fn identical_copies_skip_regeneration() {
        assert!(!should_regenerate(Some("a"), Some("a")));
        // Whitespace counts.
        assert!(should_regenerate(Some("a"), Some("a ")));
        assert!(should_regenerate(Some("a"), None));
        assert!(should_regenerate(None, Some("a")));
    }

    #[tokio::test]
    async fn unchanged_schema_runs_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let adapter = StubAdapter::new();
        let config = BridgeConfig::default();

        std::fs::create_dir_all(root.join("prisma")).unwrap();
        std::fs::write(root.join("prisma/schema.prisma"), SCHEMA_WITH_CLIENT).unwrap();
        std::fs::create_dir_all(config.resolved_client_dir(root)).unwrap();
        std::fs::write(config.cached_schema_path(root), SCHEMA_WITH_CLIENT).unwrap();

        run_generators(&adapter, &config, root, GenerateOptions::default())
            .await
            .unwrap();

        assert!(adapter.recorded().is_empty());
    }

    #[tokio::test]
    async fn changed_schema_regenerates_and_refreshes_cache() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let adapter = StubAdapter::new();
        adapter.push_run(RunResult::default());
        let config = BridgeConfig::default();

        std::fs::create_dir_all(root.join("prisma")).unwrap();
        std::fs::write(root.join("prisma/schema.prisma"), SCHEMA_WITH_CLIENT).unwrap();
        std::fs::create_dir_all(config.resolved_client_dir(root)).unwrap();
        std::fs::write(config.cached_schema_path(root), "stale copy").unwrap();

        run_generators(&adapter, &config, root, GenerateOptions::default())
            .await
            .unwrap();

        let recorded = adapter.recorded();
        assert_eq!(recorded.len(), 1);
        assert!(recorded[0].starts_with("npx prisma generate"));

        let cached = std::fs::read_to_string(config.cached_schema_path(root)).unwrap();
        assert_eq!(cached, SCHEMA_WITH_CLIENT);
    }

    #[tokio::test]
    async fn missing_client_generator_is_scaffolded() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let adapter = StubAdapter::new();
        adapter.push_run(RunResult::default());
        let config = BridgeConfig::default();

        std::fs::create_dir_all(root.join("prisma")).unwrap();
        let bare_model = "model World {\n  id Int @id\n}\n";
        std::fs::write(root.join("prisma/schema.prisma"), bare_model).unwrap();

        run_generators(&adapter, &config, root, GenerateOptions::default())
            .await
            .unwrap();

        let patched = std::fs::read_to_string(root.join("prisma/schema.prisma")).unwrap();
        assert!(patched.starts_with(CLIENT_GENERATOR_BLOCK));
        assert!(patched.contains(bare_model));
        assert!(schema::has_client_generator(&patched));
    }

    #[tokio::test]
    async fn missing_schema_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let adapter = StubAdapter::new();

        let err = run_generators(
            &adapter,
            &BridgeConfig::default(),
            dir.path(),
            GenerateOptions::default(),
        )
        .await
        .unwrap_err();

        let bridge_err = err.downcast_ref::<BridgeError>().unwrap();
        assert!(matches!(bridge_err, BridgeError::SchemaNotFound { .. }));
        assert!(err.to_string().contains("prisma.io/docs"));
    }

    #[tokio::test]
    async fn unhealthy_generate_leaves_cache_stale() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let adapter = StubAdapter::new();
        adapter.push_run(RunResult {
            stdout: String::new(),
            stderr: "generator crashed".to_string(),
            exit_code: Some(1),
        });
        let config = BridgeConfig::default();

        std::fs::create_dir_all(root.join("prisma")).unwrap();
        std::fs::write(root.join("prisma/schema.prisma"), SCHEMA_WITH_CLIENT).unwrap();

        // Soft-fail: no error, but the cache is not written either, so the
        // next run tries again.
        run_generators(&adapter, &config, root, GenerateOptions::default())
            .await
            .unwrap();
        assert!(!config.cached_schema_path(root).exists());
    }
}
