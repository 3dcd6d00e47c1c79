//! Registry maintenance - batch passes over the equipment registry
//!
//! Usage:
//!   registry-maintenance migrate
//!   registry-maintenance dedup --dry-run
//!   registry-maintenance re-resolve
//!   registry-maintenance reconcile --input rows.json --narrow-by-region
//!
//! Settings are flags with environment fallbacks (a `.env` file is honored):
//!   DATABASE_URL - PostgreSQL connection string
//!   REGISTRY_MAX_CONNECTIONS - Pool size (default: 5)
//!   REGISTRY_ACQUIRE_TIMEOUT_SECS - Pool acquire timeout (default: 30)
//!   REGISTRY_DEDUP_MAX_RETRIES - Retries per conflicting site group (default: 3)
//!   REGISTRY_RESOLUTION_CACHE_CAPACITY - Reconciliation cache size (default: 10000)
//!   RUST_LOG - Log filter

use anyhow::Context;
use clap::{Parser, Subcommand};
use registry_core_api::RegistryError;
use registry_core_db::models::ImportRow;
use registry_core_db::resolver::ImportReconciler;
use registry_core_postgres::repository::db_init::init_database;
use registry_core_postgres::{
    CatalogCache, DedupPass, PostgresRepositories, ReResolvePass, RegistryConfig,
};
use serde::Serialize;
use sqlx::PgPool;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "registry-maintenance")]
#[command(about = "Maintenance passes for the equipment registry")]
#[command(version)]
struct Args {
    #[command(flatten)]
    config: RegistryConfig,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply the schema in migrations/
    Migrate,

    /// Remove duplicate equipment, one site group per transaction
    Dedup {
        /// Report what would be removed without deleting
        #[arg(long)]
        dry_run: bool,
    },

    /// Assign sites to equipment whose free-text reference now resolves
    ReResolve {
        #[arg(long)]
        dry_run: bool,
    },

    /// Match import rows (JSON array of column -> value objects) to catalog sites
    Reconcile {
        #[arg(long)]
        input: PathBuf,

        /// Use the row's region column to narrow ambiguous matches
        #[arg(long)]
        narrow_by_region: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("info,registry_core_db=info,registry_core_postgres=debug")
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let config = args.config;
    let pool = Arc::new(
        config
            .connect()
            .await
            .context("could not connect to the registry database")?,
    );

    match args.command {
        Command::Migrate => {
            init_database(&pool).await?;
            info!("schema applied");
        }
        Command::Dedup { dry_run } => {
            let pass = DedupPass::new(pool.clone())
                .with_max_retries(config.dedup_max_retries)
                .dry_run(dry_run);

            let cancel = pass.cancel_flag();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("interrupt received, stopping after the current site group");
                    cancel.store(true, Ordering::SeqCst);
                }
            });

            let report = pass.run(&CatalogCache::default()).await?;
            print_json(&report)?;
            if report.cancelled {
                return Err(RegistryError::Cancelled.into());
            }
        }
        Command::ReResolve { dry_run } => {
            let report = ReResolvePass::new(pool.clone())
                .dry_run(dry_run)
                .run(&CatalogCache::default())
                .await?;
            print_json(&report)?;
        }
        Command::Reconcile {
            input,
            narrow_by_region,
        } => {
            let rows = read_rows(&input)?;
            let catalog = load_catalog(pool.clone()).await?;
            let reconciler = ImportReconciler::new(catalog.snapshot(), config.resolution_cache_capacity)
                .with_region_narrowing(narrow_by_region);
            let report = reconciler.reconcile(&rows);
            info!(
                rows = rows.len(),
                resolved = report.resolved,
                ambiguous = report.ambiguous,
                not_found = report.not_found,
                "reconciliation finished"
            );
            print_json(&report)?;
        }
    }

    Ok(())
}

async fn load_catalog(pool: Arc<PgPool>) -> anyhow::Result<CatalogCache> {
    let repos = PostgresRepositories::new(pool)
        .create_registry_repositories()
        .await?;
    let cache = CatalogCache::default();
    let refreshed = cache
        .refresh(&*repos.site_repository, &*repos.region_repository)
        .await;
    repos.rollback().await?;
    refreshed?;
    Ok(cache)
}

/// Rows are numbered from 1 in file order.
fn read_rows(path: &Path) -> anyhow::Result<Vec<ImportRow>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("could not read {}", path.display()))?;
    let rows: Vec<HashMap<String, String>> = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a JSON array of objects", path.display()))?;
    Ok(rows
        .into_iter()
        .enumerate()
        .map(|(index, columns)| ImportRow::new(index + 1, columns))
        .collect())
}

fn print_json<T: Serialize>(report: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}
