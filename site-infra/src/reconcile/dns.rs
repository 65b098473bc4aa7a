use crate::cloudflare::{CloudflareApi, DnsRecordSpec};
use crate::error::InfraError;

use super::UpsertOutcome;

/// Points `fqdn` at `target_host` with a proxied, auto-TTL CNAME.
///
/// Performs one lookup and exactly one write. When several CNAMEs already
/// share the name only the first is updated; the others are left in place.
pub async fn upsert_cname(
    api: &impl CloudflareApi,
    zone_id: &str,
    fqdn: &str,
    target_host: &str,
) -> Result<UpsertOutcome, InfraError> {
    let record = DnsRecordSpec::proxied_cname(fqdn, target_host);
    let existing = api.list_cname_records(zone_id, fqdn).await?;

    if existing.len() > 1 {
        log::warn!(
            "Found {} CNAME records named {}; only {} will be updated",
            existing.len(),
            fqdn,
            existing[0].id
        );
    }

    match existing.first() {
        Some(current) => {
            log::debug!(
                "Updating CNAME {} ({} -> {}, proxied {:?}, ttl {:?})",
                fqdn,
                current.content,
                target_host,
                current.proxied,
                current.ttl
            );
            api.update_dns_record(zone_id, &current.id, &record).await?;
            Ok(UpsertOutcome::Updated)
        }
        None => {
            api.create_dns_record(zone_id, &record).await?;
            Ok(UpsertOutcome::Created)
        }
    }
}
