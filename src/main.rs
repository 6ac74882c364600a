//! najdict CLI - serve and maintain the naj dictionary

use clap::{Parser, Subcommand};
use najdict::config::{self, NajdictConfig};
use najdict::storage::DictionaryStore;
use najdict::ui::{self, Icons};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "najdict")]
#[command(version)]
#[command(about = "Naj-English dictionary service")]
#[command(long_about = r#"
najdict serves a naj-English dictionary stored in a SQLite file:
  GET  /naj/{pattern}          regex search over naj lemmas
  GET  /naj-classes            list naj word classes
  POST /add/naj-class/{name}   append a naj word class
  GET  /stop                   stop the server

Example usage:
  najdict init
  najdict serve --port 8080
  najdict stats --database dictionary.db
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server
    Serve {
        /// Path to the config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Path to the database file
        #[arg(short, long)]
        database: Option<String>,

        /// Directory served for unmatched paths
        #[arg(short, long)]
        www: Option<String>,
    },

    /// Write a default config file and create the database
    Init {
        /// Path to the config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Overwrite an existing config file
        #[arg(short, long)]
        force: bool,
    },

    /// Show row counts for every table
    Stats {
        /// Path to the database file
        #[arg(short, long, default_value = config::DEFAULT_DATABASE)]
        database: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    if let Err(e) = run(cli.command).await {
        tracing::error!("{:#}", e);
        ui::error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

async fn run(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Serve { config: config_path, host, port, database, www } => {
            let file = config::load_config(config_path.as_deref())?.unwrap_or_default();
            let overrides = NajdictConfig { host, port, database, www };
            let settings = file.merged_with(overrides).into_settings();

            ui::header("najdict");
            ui::info(Icons::DATABASE, "Database", &settings.database_path.display().to_string());
            najdict::server::start_server(settings).await
        }

        Commands::Init { config: config_path, force } => {
            let path = config_path.unwrap_or_else(config::default_config_path);
            let defaults = NajdictConfig::with_defaults();
            config::write_config(&path, &defaults, force)?;
            ui::success(&format!("Wrote {}", path.display()));

            let settings = defaults.into_settings();
            let (_, report) = DictionaryStore::open_and_sync(&settings.database_path)?;
            ui::info(
                Icons::DATABASE,
                "Database",
                &format!(
                    "{} ({} tables created)",
                    settings.database_path.display(),
                    report.created.len()
                ),
            );
            Ok(())
        }

        Commands::Stats { database } => {
            if !database.exists() {
                anyhow::bail!("database not found at {}", database.display());
            }
            let store = DictionaryStore::connect(&database)?;
            let stats = store.stats()?;

            ui::header(&format!("Statistics for {}", database.display()));
            for (label, count) in stats.rows() {
                ui::summary_row(label, &count.to_string());
            }
            Ok(())
        }
    }
}
