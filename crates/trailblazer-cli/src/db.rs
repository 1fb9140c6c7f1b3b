//! `db` subcommands. Each needs a configured Postgres database.

use clap::Subcommand;
use sqlx::PgPool;
use trailblazer_db::Catalog;

#[derive(Debug, Subcommand)]
pub enum DbCommands {
    /// Check that the database answers
    Ping,
    /// Apply pending migrations
    Migrate,
    /// Insert the demo shoes and reviews (skips rows that already exist)
    Seed,
}

pub(crate) async fn run(catalog: &Catalog, command: DbCommands) -> anyhow::Result<()> {
    let pool = require_pool(catalog)?;

    match command {
        DbCommands::Ping => {
            trailblazer_db::health_check(pool).await?;
            println!("database ok");
        }
        DbCommands::Migrate => {
            let applied = trailblazer_db::run_migrations(pool).await?;
            println!("applied {applied} migration(s)");
        }
        DbCommands::Seed => {
            trailblazer_db::run_migrations(pool).await?;
            let inserted = trailblazer_db::seed_catalog(pool).await?;
            println!("seeded {inserted} shoe(s)");
        }
    }
    Ok(())
}

fn require_pool(catalog: &Catalog) -> anyhow::Result<&PgPool> {
    catalog.pool().ok_or_else(|| {
        anyhow::anyhow!(
            "DATABASE_URL is not set; the catalog is in mock mode and already serves the demo data"
        )
    })
}
