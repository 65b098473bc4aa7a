use std::fmt;

use crate::cloudflare::CloudflareApi;
use crate::error::InfraError;

pub mod dns;
#[cfg(test)]
pub(crate) mod fake;
pub mod pages;
pub mod plan;
pub mod worker;
pub mod zones;

use dns::upsert_cname;
use pages::{ensure_pages_domain, DomainOutcome};
use plan::DesiredState;
use worker::{deploy_worker_script, upsert_route, WorkerModule};
use zones::{ZoneIds, ZoneOverrides};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated,
}

impl fmt::Display for UpsertOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpsertOutcome::Created => write!(f, "created"),
            UpsertOutcome::Updated => write!(f, "updated"),
        }
    }
}

/// Receives one line per change so a run can be audited afterwards.
pub trait ReconcileNotifier {
    fn notify(&self, message: &str);
}

/// Drives Cloudflare towards `state`.
///
/// Stages run in order (zones, DNS, Pages domains, Worker, routes) and the
/// first failure aborts the run. Nothing already applied is rolled back.
pub async fn reconcile(
    state: &DesiredState,
    module: &WorkerModule,
    overrides: &ZoneOverrides,
    api: &impl CloudflareApi,
    notifier: &impl ReconcileNotifier,
) -> Result<(), InfraError> {
    let zones = ZoneIds::resolve_all(api, overrides, &state.zones).await?;

    for record in &state.dns_records {
        let zone_id = zones.id(&record.zone)?;
        let outcome = upsert_cname(api, zone_id, &record.name, &record.target).await?;
        notifier.notify(&format!(
            "{} DNS record {} -> {}",
            outcome, record.name, record.target
        ));
    }

    for target in &state.pages_domains {
        let message = match ensure_pages_domain(api, &target.project, &target.domain).await? {
            DomainOutcome::Added => format!(
                "added Pages domain {} to {}",
                target.domain, target.project
            ),
            DomainOutcome::AlreadyAttached => format!(
                "Pages domain {} already attached to {}",
                target.domain, target.project
            ),
        };
        notifier.notify(&message);
    }

    deploy_worker_script(
        api,
        &state.worker.name,
        module,
        &state.worker.compatibility_date,
        state.worker.bindings(),
    )
    .await?;
    notifier.notify(&format!(
        "deployed Worker {} ({})",
        state.worker.name, module.filename
    ));

    for route in &state.routes {
        let zone_id = zones.id(&route.zone)?;
        let outcome = upsert_route(api, zone_id, &route.pattern, &state.worker.name).await?;
        notifier.notify(&format!(
            "{} Worker route {} -> {}",
            outcome, route.pattern, state.worker.name
        ));
    }

    Ok(())
}
