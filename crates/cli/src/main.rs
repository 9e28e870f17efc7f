//! Prisma bridge CLI - prisma-bridge command

use anyhow::Result;
use bridge_core::schema::Database;
use clap::{Parser, Subcommand};

mod cmd;
mod util;

/// Bridge a schema-definition host framework to the Prisma toolchain
#[derive(Parser)]
#[command(name = "prisma-bridge")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scaffold starter Prisma files into the current project
    Create {
        /// Development database kind (sqlite, postgres, mysql)
        #[arg(long, value_parser = parse_database)]
        database: Database,

        /// Connection string (defaults to a development URI for the chosen database)
        #[arg(long)]
        connection_uri: Option<String>,

        /// Project name used in scaffolded connection strings (default: directory name)
        #[arg(long)]
        name: Option<String>,
    },
    /// Run the Prisma generators for the project schema
    Generate {
        /// Suppress progress output
        #[arg(long)]
        silent: bool,
    },
    /// Run generators, start the dev server and re-migrate on schema changes
    Dev,
    /// Database workflow commands
    #[command(subcommand)]
    Db(DbCommands),
    /// View or create the bridge configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
enum DbCommands {
    /// Create the development database and apply pending migrations
    Init,
    /// Migration commands
    #[command(subcommand)]
    Migrate(MigrateCommands),
    /// Start the data browser
    Ui {
        /// Port to listen on (default: first free port between 5555 and 5600)
        #[arg(long)]
        port: Option<u16>,
    },
}

#[derive(Subcommand)]
enum MigrateCommands {
    /// Save a new migration file
    Plan {
        /// Migration name (prompted for when omitted)
        #[arg(long)]
        name: Option<String>,
    },
    /// Apply pending migrations
    Apply {
        /// Skip the dry-run preview and the confirmation prompt
        #[arg(long)]
        force: bool,
    },
    /// Revert the last applied migration
    Rollback,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// List the effective configuration values
    List,
    /// Create a commented bridge.toml if missing
    Init,
}

fn parse_database(raw: &str) -> Result<Database, String> {
    raw.parse()
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Create {
            database,
            connection_uri,
            name,
        } => cmd::create::run(database, connection_uri, name).await,
        Commands::Generate { silent } => cmd::generate::run(silent).await,
        Commands::Dev => cmd::dev::run().await,
        Commands::Db(db) => match db {
            DbCommands::Init => cmd::db::run_init().await,
            DbCommands::Migrate(migrate) => match migrate {
                MigrateCommands::Plan { name } => cmd::db::run_plan(name).await,
                MigrateCommands::Apply { force } => cmd::db::run_apply(force).await,
                MigrateCommands::Rollback => cmd::db::run_rollback().await,
            },
            DbCommands::Ui { port } => cmd::db::run_ui(port).await,
        },
        Commands::Config(config) => match config {
            ConfigCommands::List => cmd::config::run_list().await,
            ConfigCommands::Init => cmd::config::run_init().await,
        },
    }
}
