//! Scaffold starter Prisma files (create workflow hook)

use anyhow::Result;
use bridge_core::adapter::ShellAdapter;
use bridge_core::config::BridgeConfig;
use bridge_core::scaffold::{self, CreateOptions};
use bridge_core::schema::Database;

pub async fn run(
    database: Database,
    connection_uri: Option<String>,
    name: Option<String>,
) -> Result<()> {
    let root = crate::util::find_project_root()?;
    let config = BridgeConfig::load(&root)?;
    let adapter = ShellAdapter;

    let opts = CreateOptions {
        database,
        connection_uri,
        project_name: name.unwrap_or_else(|| crate::util::project_name(&root)),
    };

    scaffold::after_base_setup(&adapter, &config, &root, &opts).await?;

    println!("Scaffolded Prisma starter files:");
    println!("  - prisma/schema.prisma");
    println!("  - prisma/seed.ts");
    println!("  - src/graphql.ts");
    Ok(())
}
