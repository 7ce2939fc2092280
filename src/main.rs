use std::fs::OpenOptions;
use std::sync::Mutex;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use geez_corpus::app::AppContext;
use geez_corpus::cli::{commands, Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let file_layer = match &cli.log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            Some(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        }
        None => None,
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut ctx = AppContext::new(cli.config)?;
    if cli.headful {
        ctx.config.scraper.headless = false;
    }

    match cli.command {
        Commands::Scrape { url, output } => {
            commands::scrape(&ctx, &url, output).await?;
        }
        Commands::Batch { manifest } => {
            commands::batch(&ctx, &manifest).await?;
        }
        Commands::Merge { dir, output } => {
            commands::merge(&dir, &output)?;
        }
        Commands::Clean { input, output } => {
            commands::clean(&ctx, &input, &output)?;
        }
    }

    Ok(())
}
