use crate::cloudflare::CloudflareApi;
use crate::error::InfraError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainOutcome {
    Added,
    AlreadyAttached,
}

/// Attaches `domain` to a Pages project unless it is already attached.
pub async fn ensure_pages_domain(
    api: &impl CloudflareApi,
    project: &str,
    domain: &str,
) -> Result<DomainOutcome, InfraError> {
    let domains = api.list_pages_domains(project).await?;

    if let Some(existing) = domains.iter().find(|d| d.name == domain) {
        log::debug!(
            "Pages domain {} on {} has status {}",
            domain,
            project,
            existing.status.as_deref().unwrap_or("unknown")
        );
        return Ok(DomainOutcome::AlreadyAttached);
    }

    api.add_pages_domain(project, domain).await?;

    Ok(DomainOutcome::Added)
}
