use anyhow::Context;
use clap::{Parser, Subcommand};

mod cloudflare;
mod commands;
mod config;
mod domains;
mod error;
mod reconcile;

#[derive(Parser)]
#[command(
    name = "site-infra",
    version,
    about = "Reconcile the marketing site's Cloudflare DNS, Pages domains and redirect Worker"
)]
struct Cli {
    #[arg(short, long, global = true, help = "Log every API request")]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[clap(about = "Create or update every managed Cloudflare resource")]
    Apply(commands::ApplyArgs),
    #[clap(about = "Resolve and print the ID of every managed zone")]
    Zones,
    #[clap(about = "Output shell completion for the provided shell")]
    Completion(commands::CompletionArgs),
}

fn init_logging(verbose: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.format_timestamp(None).init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    match &cli.command {
        Commands::Apply(args) => commands::apply(args)
            .await
            .context("reconciliation aborted")?,
        Commands::Zones => commands::zones()
            .await
            .context("zone resolution failed")?,
        Commands::Completion(args) => commands::completion(args),
    }

    Ok(())
}
