//! Jobtrail CLI - track a job search from the terminal.

mod cli;
mod commands;
mod config;
mod error;

use clap::Parser;

use crate::cli::{Cli, Commands};
use crate::commands::common::CliContext;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("jobtrail=info".parse().expect("valid directive")),
        )
        .init();

    let cli = Cli::parse();
    let ctx = CliContext::resolve(&cli)?;

    match cli.command {
        Commands::App { command } => commands::records::run_app(command, &ctx).await?,
        Commands::Prep { command } => commands::records::run_prep(command, &ctx).await?,
        Commands::Company { command } => commands::records::run_company(command, &ctx).await?,
        Commands::Contact { command } => commands::records::run_contact(command, &ctx).await?,
        Commands::Story { command } => commands::records::run_story(command, &ctx).await?,
        Commands::Goal { command } => commands::records::run_goal(command, &ctx).await?,
        Commands::Import { collection, file } => {
            commands::transfer::run_import(collection, &file, &ctx).await?;
        }
        Commands::Export {
            collection,
            format,
            output,
        } => {
            commands::transfer::run_export(collection, format, output.as_deref(), &ctx).await?;
        }
        Commands::Stats { json } => commands::stats::run_stats(json, &ctx).await?,
        Commands::Streak { json } => commands::stats::run_streak(json, &ctx).await?,
        Commands::Watch { collection, take } => {
            commands::watch::run_watch(collection, take, &ctx).await?;
        }
        Commands::Sync => commands::sync_cmd::run_sync(&ctx).await?,
        Commands::Config { command } => commands::config_cmd::run_config(command, &ctx)?,
        Commands::Completions { shell, output } => {
            commands::completions::run_completions(shell, output.as_deref())?;
        }
    }

    Ok(())
}
