use std::path::PathBuf;

use clap::{Parser, Subcommand};
use momo_server::{telemetry, ServerConfig};
use momo_storage::{DbPool, SqliteMessageStore};
use tracing::info;

#[derive(Parser)]
#[command(name = "momo-server")]
#[command(about = "Mobile money SMS dashboard", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Seed the database if empty, then serve the API and dashboard
    Serve,
    /// Import an SMS backup XML file into the database
    Import {
        /// Path to the backup file
        path: PathBuf,
    },
    /// Classify one message body and print the result as JSON
    Classify {
        body: String,
    },
}

async fn open_db(config: &ServerConfig) -> anyhow::Result<DbPool> {
    if let Some(parent) = config.database_path().as_deref().and_then(|p| p.parent()) {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    info!("Opening database: {}", config.database_url);
    Ok(momo_storage::create_db(&config.database_url).await?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = ServerConfig::load(cli.config.as_deref())?;
    telemetry::init(config.log_format)?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            let db = open_db(&config).await?;
            if let Some(summary) = momo_server::seed_if_empty(&db, &config.data_file).await? {
                info!(
                    processed = summary.processed,
                    skipped = summary.skipped,
                    "Seeded database from {}",
                    config.data_file.display()
                );
            }
            momo_server::serve(config, db).await?;
        }
        Commands::Import { path } => {
            let db = open_db(&config).await?;
            let store = SqliteMessageStore::new(db);
            let summary = momo_import::load_file(&path, &store).await?;
            println!(
                "Imported {} messages ({} skipped)",
                summary.processed, summary.skipped
            );
        }
        Commands::Classify { body } => {
            let (category, fields) = momo_extract::classify(&body);
            let output = serde_json::json!({
                "category": category,
                "fields": momo_server::api::FieldsView::from(fields),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
