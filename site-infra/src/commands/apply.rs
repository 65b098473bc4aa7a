use colored::Colorize;

use crate::cloudflare::CloudflareApi;
use crate::config::InfraConfig;
use crate::error::InfraError;
use crate::reconcile::plan::DesiredState;
use crate::reconcile::worker::WorkerModule;
use crate::reconcile::zones::ZoneIds;
use crate::reconcile::{reconcile, ReconcileNotifier};

use super::cloudflare_api;
use super::console_notify::ConsoleNotifier;

#[derive(clap::Args)]
pub struct ApplyArgs {
    #[arg(
        long,
        help = "Resolve zones and print the desired state without changing anything"
    )]
    dry_run: bool,
}

pub async fn apply(args: &ApplyArgs) -> Result<(), InfraError> {
    // Everything local is validated before the first request goes out.
    let config = InfraConfig::from_env()?;
    let module = WorkerModule::from_config(&config.worker)?;
    let api = cloudflare_api(&config)?;

    apply_config(&config, &module, &api, &ConsoleNotifier::new(), args.dry_run).await
}

async fn apply_config(
    config: &InfraConfig,
    module: &WorkerModule,
    api: &impl CloudflareApi,
    notifier: &impl ReconcileNotifier,
    dry_run: bool,
) -> Result<(), InfraError> {
    let state = DesiredState::from_config(config);

    if dry_run {
        ZoneIds::resolve_all(api, &config.zone_overrides, &state.zones).await?;
        println!("{}", "Dry run, no changes made. Desired state:".bold());
        print!("{}", state);
        return Ok(());
    }

    log::info!(
        "Reconciling {} DNS records, {} Pages domains and {} Worker routes",
        state.dns_records.len(),
        state.pages_domains.len(),
        state.routes.len()
    );

    reconcile(&state, module, &config.zone_overrides, api, notifier).await?;
    notifier.notify("Cloudflare infrastructure is up to date.");

    Ok(())
}
