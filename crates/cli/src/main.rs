use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pagelog_db::config::DbConfig;

mod commands;

/// Inspect and record page revisions.
#[derive(Debug, Parser)]
#[command(name = "pagelog", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply pending database migrations.
    Migrate,

    /// Record a new revision of a page. The body is read from stdin unless
    /// `--file` is given.
    Save {
        /// Page path the revision belongs to.
        #[arg(long)]
        path: String,
        /// Id of the acting user.
        #[arg(long)]
        author: Option<i64>,
        /// Content format (default: markdown).
        #[arg(long)]
        format: Option<String>,
        /// Read the body from this file.
        #[arg(long)]
        file: Option<std::path::PathBuf>,
    },

    /// Show the most recent revision of a page.
    Latest { path: String },

    /// Show one revision by id.
    Show { id: i64 },

    /// Show several revisions given a JSON array of ids, e.g. `[3, 7]`.
    Many { ids: String },

    /// Print the full history of a page, newest first.
    History {
        path: String,
        /// Fold the history into edit sessions.
        #[arg(long)]
        grouped: bool,
        /// Session gap in milliseconds (only with `--grouped`).
        #[arg(long, requires = "grouped", value_parser = clap::value_parser!(i64).range(1..))]
        gap_ms: Option<i64>,
    },

    /// Move every revision of a page to a new path.
    Rename { from: String, to: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pagelog=info,pagelog_db=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = DbConfig::from_env()?;
    let pool = pagelog_db::create_pool(&config).await?;
    tracing::debug!(max_connections = config.max_connections, "Database connection pool created");

    pagelog_db::health_check(&pool).await?;

    commands::run(&pool, cli.command).await
}
