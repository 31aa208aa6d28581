use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use inventory_sqlite::inventory::{sample_products, sample_queries};
use inventory_sqlite::loader::load_products;
use inventory_sqlite::query_runner::run_queries;
use inventory_sqlite::SqliteConfig;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = SqliteConfig::default();
    let products = sample_products();

    println!("Loading the database...");
    println!("Loading the database with {} items.", products.len());
    load_products(&config, &products)
        .with_context(|| format!("loading {}", config.db_path.display()))?;
    println!("Done.");

    println!("Querying:");
    let stdout = std::io::stdout();
    run_queries(&config, &sample_queries(), &mut stdout.lock())
        .with_context(|| format!("querying {}", config.db_path.display()))?;
    Ok(())
}
