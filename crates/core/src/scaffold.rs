//! Starter project scaffolding for the create workflow

use crate::adapter::{HostAdapter, RunResult};
use crate::config::BridgeConfig;
use crate::schema::{render_datasource, Database, CLIENT_GENERATOR_BLOCK};
use anyhow::Result;
use owo_colors::OwoColorize;
use std::path::Path;
use tracing::info;

pub struct CreateOptions {
    pub database: Database,
    pub connection_uri: Option<String>,
    pub project_name: String,
}

/// Ignore stanza for the ORM tool's failed-migration droppings.
pub const GITIGNORE_STANZA: &str = "\n# Prisma\nfailed-inferMigrationSteps*\n";

pub const WORLD_MODEL: &str = "model World {
  id         Int    @id @default(autoincrement())
  name       String @unique
  population Float
}
";

pub const SEED_SCRIPT: &str = "import { PrismaClient } from '@prisma/client'

const db = new PrismaClient()

main()

async function main() {
  const results = await Promise.all(
    [
      {
        name: 'Earth',
        population: 6_000_000_000,
      },
      {
        name: 'Mars',
        population: 0,
      },
    ].map(data => db.world.create({ data })),
  )

  console.log('Seeded: %j', results)

  db.disconnect()
}
";

pub const GRAPHQL_MODULE: &str = "import { schema } from \"nexus-future\"

schema.objectType({
  name: \"World\",
  definition(t) {
    t.model.id()
    t.model.name()
    t.model.population()
  }
})

schema.queryType({
  definition(t) {
    t.field(\"hello\", {
      type: \"World\",
      args: {
        world: schema.stringArg({ required: false })
      },
      async resolve(_root, args, ctx) {
        const worldToFindByName = args.world ?? 'Earth'
        const world = await ctx.db.world.findOne({
          where: {
            name: worldToFindByName
          }
        })

        if (!world) throw new Error(`No such world named \"${args.world}\"`)

        return world
      }
    })

    t.list.field('worlds', {
      type: 'World',
      resolve(_root, _args, ctx) {
        return ctx.db.world.findMany()
      }
    })
  }
})
";

/// Full starter schema: datasource, client generator, example model.
pub fn render_schema_template(opts: &CreateOptions) -> String {
    let datasource = render_datasource(
        opts.database,
        opts.connection_uri.as_deref(),
        &opts.project_name,
    );
    format!("{datasource}\n{CLIENT_GENERATOR_BLOCK}\n{WORLD_MODEL}")
}

/// Create-workflow hook: write the starter files and, when a usable
/// connection is at hand, initialize and seed the development database.
pub async fn after_base_setup(
    adapter: &dyn HostAdapter,
    config: &BridgeConfig,
    root: &Path,
    opts: &CreateOptions,
) -> Result<()> {
    adapter
        .append_file(&root.join(".gitignore"), GITIGNORE_STANZA)
        .await?;
    adapter
        .write_file(&root.join("prisma/schema.prisma"), &render_schema_template(opts))
        .await?;
    adapter
        .write_file(&root.join("prisma/seed.ts"), SEED_SCRIPT)
        .await?;
    adapter
        .write_file(&root.join("src/graphql.ts"), GRAPHQL_MODULE)
        .await?;

    if opts.connection_uri.is_some() || opts.database == Database::Sqlite {
        info!("Initializing development database...");
        let saved = adapter
            .run(
                &config.package_runner,
                &["prisma", "migrate", "save", "--create-db", "--name", "init", "--experimental"],
                &[],
            )
            .await?;
        require_healthy(&saved, "saving the initial migration")?;

        let migrated = adapter
            .run(
                &config.package_runner,
                &["prisma", "migrate", "up", "-c", "--experimental"],
                &[],
            )
            .await?;
        require_healthy(&migrated, "applying the initial migration")?;

        info!("Generating Prisma Client JS...");
        let generated = adapter
            .run(&config.package_runner, &["prisma", "generate"], &[])
            .await?;
        require_healthy(&generated, "generating the client")?;

        info!("Seeding development database...");
        let seeded = adapter
            .run(&config.package_runner, &["ts-node", "prisma/seed"], &[])
            .await?;
        require_healthy(&seeded, "seeding the database")?;
    } else {
        info!(
            "1. Please setup your {} and fill in the connection uri in your `{}` file.",
            opts.database,
            "prisma/schema.prisma".green()
        );
        info!(
            "2. Run `{}` to initialize your database.",
            "prisma-bridge db init".green()
        );
        info!(
            "3. Run `{}` to seed your database.",
            format!("{} ts-node prisma/seed.ts", config.package_runner).green()
        );
        info!("4. Run `{}` to start working.", config.dev_command.green());
    }

    Ok(())
}

/// The create workflow is the one place a tool failure is hard: a half
/// scaffolded project is worse than an aborted one.
fn require_healthy(response: &RunResult, step: &str) -> Result<()> {
    if response.healthy() {
        Ok(())
    } else {
        anyhow::bail!("{step} failed: {}", response.stderr.trim())
    }
}
