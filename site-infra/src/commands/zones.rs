use crate::config::InfraConfig;
use crate::error::InfraError;
use crate::reconcile::plan::DesiredState;
use crate::reconcile::zones::ZoneIds;

use super::cloudflare_api;

/// Prints the ID of every zone the reconciler manages, and where it came
/// from, so operators can pin them in `CLOUDFLARE_ZONE_IDS_JSON`.
pub async fn zones() -> Result<(), InfraError> {
    let config = InfraConfig::from_env()?;
    let state = DesiredState::from_config(&config);
    let api = cloudflare_api(&config)?;

    let zones = ZoneIds::resolve_all(&api, &config.zone_overrides, &state.zones).await?;

    for zone in zones.iter() {
        println!("{:<32} {:<34} {}", zone.name, zone.id, zone.source);
    }

    Ok(())
}
