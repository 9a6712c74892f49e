mod cli;
mod config;
mod output;

use anyhow::Context;
use clap::Parser;
use cli::{Cli, Command, SelectMode};
use config::{Overrides, Settings};
use dynq::DynamicQuery;
use tracing_subscriber::EnvFilter;

pub async fn run(args: Vec<String>) -> anyhow::Result<()> {
    let cli = match Cli::try_parse_from(&args) {
        Ok(cli) => cli,
        Err(e) => e.exit(),
    };

    let _ = dotenvy::dotenv();
    init_tracing();

    let settings = Settings::resolve(Overrides {
        config: cli.config,
        database: cli.database,
        format: cli.format,
    })?;
    tracing::debug!(
        target: "dynq.cli",
        max_connections = settings.pool.max_size,
        recycling = ?settings.pool.recycling,
        format = ?settings.format,
        "settings resolved"
    );

    let pool = dynq::create_pool_with_config(&settings.database_url, settings.pool)
        .context("failed to create connection pool")?;
    let dq = DynamicQuery::new(pool);

    let rendered = match cli.command {
        Command::Select(args) => {
            let rows = match args.mode()? {
                SelectMode::All => dq.query_table(&args.table, &args.columns).await?,
                SelectMode::Where(groups) => {
                    dq.query_with_conditions(&args.table, &args.columns, &groups)
                        .await?
                }
                SelectMode::Page { offset, limit } => {
                    dq.query_with_pagination(&args.table, &args.columns, offset, limit)
                        .await?
                }
            };
            output::render_rows(&rows, settings.format)?
        }
        Command::Count(args) => {
            let count = dq.get_total_count(&args.table).await?;
            output::render_count(count, settings.format)?
        }
    };

    println!("{rendered}");
    Ok(())
}

/// Logs go to stderr so `--format json` output stays machine-readable.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .try_init();
}
