use std::collections::HashMap;
use std::fmt;

use crate::cloudflare::CloudflareApi;
use crate::domains::zone_env_key;
use crate::error::InfraError;

/// Where a zone ID came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneIdSource {
    JsonMap,
    EnvOverride,
    Api,
}

impl fmt::Display for ZoneIdSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZoneIdSource::JsonMap => write!(f, "zone ID map"),
            ZoneIdSource::EnvOverride => write!(f, "environment override"),
            ZoneIdSource::Api => write!(f, "Cloudflare API lookup"),
        }
    }
}

/// Operator-pinned zone IDs.
#[derive(Debug, Clone, Default)]
pub struct ZoneOverrides {
    /// Zone name to ID, from the JSON map.
    map: HashMap<String, String>,
    /// `CLOUDFLARE_ZONE_ID_*` variables, keyed by variable name.
    env: HashMap<String, String>,
}

impl ZoneOverrides {
    pub fn new(map: HashMap<String, String>, env: HashMap<String, String>) -> Self {
        Self { map, env }
    }

    /// Looks up a pinned ID, the JSON map taking precedence over the
    /// environment.
    pub fn lookup(&self, zone_name: &str) -> Option<(String, ZoneIdSource)> {
        let zone = zone_name.trim().trim_end_matches('.').to_lowercase();

        let non_empty = |id: &&String| !id.trim().is_empty();

        if let Some(id) = self.map.get(&zone).filter(non_empty) {
            return Some((id.trim().to_string(), ZoneIdSource::JsonMap));
        }

        self.env
            .get(&zone_env_key(&zone))
            .filter(non_empty)
            .map(|id| (id.trim().to_string(), ZoneIdSource::EnvOverride))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedZone {
    pub name: String,
    pub id: String,
    pub source: ZoneIdSource,
}

/// Resolves a zone name to its ID: JSON map, then env override, then the
/// first result of an API lookup by exact name.
pub async fn resolve_zone_id(
    api: &impl CloudflareApi,
    overrides: &ZoneOverrides,
    zone_name: &str,
) -> Result<ResolvedZone, InfraError> {
    let (id, source) = match overrides.lookup(zone_name) {
        Some(pinned) => pinned,
        None => match api.find_zone_id(zone_name).await? {
            Some(id) => (id, ZoneIdSource::Api),
            None => return Err(InfraError::ZoneNotFound(zone_name.to_string())),
        },
    };

    log::info!("Zone {} resolved to {} via {}", zone_name, id, source);

    Ok(ResolvedZone {
        name: zone_name.to_string(),
        id,
        source,
    })
}

/// The zone IDs resolved during a single run. Each zone is resolved once.
#[derive(Debug, Default)]
pub struct ZoneIds {
    zones: Vec<ResolvedZone>,
}

impl ZoneIds {
    pub async fn resolve_all(
        api: &impl CloudflareApi,
        overrides: &ZoneOverrides,
        zone_names: &[String],
    ) -> Result<Self, InfraError> {
        let mut resolved = Self::default();

        for zone_name in zone_names {
            if resolved.find(zone_name).is_some() {
                continue;
            }
            let zone = resolve_zone_id(api, overrides, zone_name).await?;
            resolved.zones.push(zone);
        }

        Ok(resolved)
    }

    fn find(&self, zone_name: &str) -> Option<&ResolvedZone> {
        self.zones.iter().find(|zone| zone.name == zone_name)
    }

    pub fn id(&self, zone_name: &str) -> Result<&str, InfraError> {
        self.find(zone_name)
            .map(|zone| zone.id.as_str())
            .ok_or_else(|| InfraError::ZoneNotFound(zone_name.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResolvedZone> {
        self.zones.iter()
    }
}
