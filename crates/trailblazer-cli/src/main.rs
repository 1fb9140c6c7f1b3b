mod db;
mod shoes;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use trailblazer_db::Catalog;

use crate::{db::DbCommands, shoes::ShoeCommands};

#[derive(Debug, Parser)]
#[command(name = "trailblazer-cli")]
#[command(about = "Trailblazer catalog command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Browse and edit the shoe catalog
    Shoes {
        #[command(subcommand)]
        command: ShoeCommands,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = trailblazer_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("trailblazer-cli ready; run with --help to list commands");
        return Ok(());
    };

    let catalog = Catalog::from_config(&config).await?;
    match command {
        Commands::Db { command } => db::run(&catalog, command).await,
        Commands::Shoes { command } => shoes::run(&catalog, command).await,
    }
}
