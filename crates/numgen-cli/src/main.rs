#![doc = include_str!("../README.md")]

mod commands;
mod config;
mod telemetry;

use clap::Parser;
use config::{Action, AppConfig, CliArgs};
use telemetry::init_telemetry;

// Using mimalloc for better performance under contention: every producer
// thread allocates while holding or racing for the buffer lock.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = AppConfig::try_from(args)?;

    init_telemetry()?;

    if cfg!(debug_assertions) {
        tracing::debug!("Starting with full config: {:#?}", config);
    }

    match config.action {
        Action::Generate {
            generation,
            seed,
            save,
            json,
        } => {
            let report =
                commands::generate(generation, seed, save.then_some(&*config.database_url))
                    .await?;
            commands::print_report(&report, json)?;
        }
        Action::Show { count } => commands::show(&config.database_url, count).await?,
        Action::Stats => commands::stats(&config.database_url).await?,
        Action::Purge => commands::purge(&config.database_url).await?,
    }

    Ok(())
}
