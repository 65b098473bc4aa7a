use std::collections::HashMap;
use std::path::PathBuf;

use chrono::NaiveDate;
use url::Url;

use crate::domains::{bare_host, normalize_domain, parse_extra_domains};
use crate::error::InfraError;
use crate::reconcile::zones::ZoneOverrides;

pub const CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4";

pub const ENV_API_TOKEN: &str = "CLOUDFLARE_API_TOKEN";
pub const ENV_ACCOUNT_ID: &str = "CLOUDFLARE_ACCOUNT_ID";
pub const ENV_API_BASE_URL: &str = "CLOUDFLARE_API_BASE_URL";
pub const ENV_ZONE_IDS_JSON: &str = "CLOUDFLARE_ZONE_IDS_JSON";
pub const ENV_ZONE_ID_PREFIX: &str = "CLOUDFLARE_ZONE_ID_";
pub const ENV_PRIMARY_DOMAIN: &str = "SITE_PRIMARY_DOMAIN";
pub const ENV_ALIAS_DOMAIN: &str = "SITE_ALIAS_DOMAIN";
pub const ENV_EXTRA_DOMAINS: &str = "SITE_EXTRA_DOMAINS";
pub const ENV_MARKETING_PROJECT: &str = "MARKETING_PAGES_PROJECT";
pub const ENV_MARKETING_HOST: &str = "MARKETING_PAGES_HOST";
pub const ENV_DOCS_PROJECT: &str = "DOCS_PAGES_PROJECT";
pub const ENV_DOCS_HOST: &str = "DOCS_PAGES_HOST";
pub const ENV_DOCS_HOSTNAME: &str = "DOCS_HOSTNAME";
pub const ENV_WORKER_NAME: &str = "REDIRECT_WORKER_NAME";
pub const ENV_WORKER_COMPAT_DATE: &str = "REDIRECT_WORKER_COMPAT_DATE";
pub const ENV_WORKER_MODULE: &str = "REDIRECT_WORKER_MODULE";

const DEFAULT_PRIMARY_DOMAIN: &str = "tyrum.ai";
const DEFAULT_MARKETING_PROJECT: &str = "tyrum-marketing";
const DEFAULT_DOCS_PROJECT: &str = "tyrum-docs";
const DEFAULT_WORKER_NAME: &str = "tyrum-redirect";
const DEFAULT_WORKER_COMPAT_DATE: &str = "2024-09-23";

/// Everything a reconciliation run needs, validated up front.
#[derive(Clone)]
pub struct InfraConfig {
    pub api_token: String,
    pub account_id: String,
    pub api_base_url: String,
    pub zone_overrides: ZoneOverrides,
    pub primary_domain: String,
    pub alias_domain: Option<String>,
    pub extra_domains: Vec<String>,
    pub marketing: PagesSite,
    pub docs: PagesSite,
    pub worker: WorkerConfig,
}

/// A Pages project and the custom hostname it is served on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagesSite {
    pub project: String,
    pub pages_host: String,
    pub hostname: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerConfig {
    pub name: String,
    pub compatibility_date: String,
    /// Module file overriding the bundled redirect module.
    pub module_path: Option<PathBuf>,
}

struct EnvVars {
    vars: HashMap<String, String>,
    missing: Vec<String>,
}

impl EnvVars {
    fn new<I>(vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let vars = vars
            .into_iter()
            .map(|(key, value)| (key, value.trim().to_string()))
            .filter(|(_, value)| !value.is_empty())
            .collect();

        Self {
            vars,
            missing: Vec::new(),
        }
    }

    fn optional(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }

    fn or_default(&self, key: &str, default: impl Into<String>) -> String {
        self.optional(key).unwrap_or_else(|| default.into())
    }

    /// A hostname that is used verbatim, so it must already be bare.
    fn host(&self, key: &str, default: impl Into<String>) -> Result<String, InfraError> {
        let raw = self.or_default(key, default);
        bare_host(&raw).ok_or_else(|| {
            InfraError::InvalidConfig(format!(
                "{} '{}' must be a bare hostname without scheme or path",
                key, raw
            ))
        })
    }

    fn required(&mut self, key: &str) -> String {
        match self.optional(key) {
            Some(value) => value,
            None => {
                self.missing.push(key.to_string());
                String::new()
            }
        }
    }

    fn with_prefix(&self, prefix: &str) -> HashMap<String, String> {
        self.vars
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }
}

impl InfraConfig {
    pub fn from_env() -> Result<Self, InfraError> {
        Self::from_vars(std::env::vars())
    }

    pub fn from_vars<I>(vars: I) -> Result<Self, InfraError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut env = EnvVars::new(vars);

        let api_token = env.required(ENV_API_TOKEN);
        let account_id = env.required(ENV_ACCOUNT_ID);
        if !env.missing.is_empty() {
            return Err(InfraError::MissingConfig(env.missing));
        }

        let api_base_url = env.or_default(ENV_API_BASE_URL, CLOUDFLARE_API_BASE);
        Url::parse(&api_base_url).map_err(|e| {
            InfraError::InvalidConfig(format!(
                "{} '{}' is not a valid URL: {}",
                ENV_API_BASE_URL, api_base_url, e
            ))
        })?;
        let api_base_url = api_base_url.trim_end_matches('/').to_string();

        let zone_map = match env.optional(ENV_ZONE_IDS_JSON) {
            Some(raw) => parse_zone_map(&raw)?,
            None => HashMap::new(),
        };
        let zone_overrides = ZoneOverrides::new(zone_map, env.with_prefix(ENV_ZONE_ID_PREFIX));

        let raw_primary = env.or_default(ENV_PRIMARY_DOMAIN, DEFAULT_PRIMARY_DOMAIN);
        let primary_domain = normalize_domain(&raw_primary).ok_or_else(|| {
            InfraError::InvalidConfig(format!(
                "{} '{}' is not a domain",
                ENV_PRIMARY_DOMAIN, raw_primary
            ))
        })?;

        let alias_domain = match env.optional(ENV_ALIAS_DOMAIN) {
            Some(raw) => Some(normalize_domain(&raw).ok_or_else(|| {
                InfraError::InvalidConfig(format!("{} '{}' is not a domain", ENV_ALIAS_DOMAIN, raw))
            })?),
            None => None,
        };
        if alias_domain.as_deref() == Some(primary_domain.as_str()) {
            return Err(InfraError::InvalidConfig(format!(
                "{} must differ from {} ({})",
                ENV_ALIAS_DOMAIN, ENV_PRIMARY_DOMAIN, primary_domain
            )));
        }

        let mut explicit = vec![primary_domain.as_str()];
        if let Some(alias) = &alias_domain {
            explicit.push(alias);
        }
        let extra_domains = env
            .optional(ENV_EXTRA_DOMAINS)
            .map(|raw| parse_extra_domains(&raw, &explicit))
            .unwrap_or_default();

        let marketing_project = env.or_default(ENV_MARKETING_PROJECT, DEFAULT_MARKETING_PROJECT);
        let marketing = PagesSite {
            pages_host: env.host(ENV_MARKETING_HOST, format!("{}.pages.dev", marketing_project))?,
            project: marketing_project,
            hostname: primary_domain.clone(),
        };

        let docs_project = env.or_default(ENV_DOCS_PROJECT, DEFAULT_DOCS_PROJECT);
        let docs_hostname = env.host(ENV_DOCS_HOSTNAME, format!("docs.{}", primary_domain))?;
        if !docs_hostname.ends_with(&format!(".{}", primary_domain)) {
            return Err(InfraError::InvalidConfig(format!(
                "{} '{}' must be a subdomain of {}",
                ENV_DOCS_HOSTNAME, docs_hostname, primary_domain
            )));
        }
        let docs = PagesSite {
            pages_host: env.host(ENV_DOCS_HOST, format!("{}.pages.dev", docs_project))?,
            project: docs_project,
            hostname: docs_hostname,
        };

        let compatibility_date = env.or_default(ENV_WORKER_COMPAT_DATE, DEFAULT_WORKER_COMPAT_DATE);
        NaiveDate::parse_from_str(&compatibility_date, "%Y-%m-%d").map_err(|_| {
            InfraError::InvalidConfig(format!(
                "{} '{}' is not a YYYY-MM-DD date",
                ENV_WORKER_COMPAT_DATE, compatibility_date
            ))
        })?;
        let worker = WorkerConfig {
            name: env.or_default(ENV_WORKER_NAME, DEFAULT_WORKER_NAME),
            compatibility_date,
            module_path: env.optional(ENV_WORKER_MODULE).map(PathBuf::from),
        };

        Ok(Self {
            api_token,
            account_id,
            api_base_url,
            zone_overrides,
            primary_domain,
            alias_domain,
            extra_domains,
            marketing,
            docs,
            worker,
        })
    }

    /// Domains that redirect to the primary domain: the alias first, then
    /// the extra domains.
    pub fn redirect_domains(&self) -> Vec<String> {
        self.alias_domain
            .iter()
            .chain(self.extra_domains.iter())
            .cloned()
            .collect()
    }

    pub fn canonical_origin(&self) -> String {
        format!("https://{}", self.primary_domain)
    }
}

fn parse_zone_map(raw: &str) -> Result<HashMap<String, String>, InfraError> {
    let map: HashMap<String, String> = serde_json::from_str(raw).map_err(|e| {
        InfraError::InvalidConfig(format!(
            "{} must be a JSON object of zone name to zone ID: {}",
            ENV_ZONE_IDS_JSON, e
        ))
    })?;

    Ok(map
        .into_iter()
        .map(|(zone, id)| {
            (
                zone.trim().trim_end_matches('.').to_lowercase(),
                id.trim().to_string(),
            )
        })
        .filter(|(_, id)| !id.is_empty())
        .collect())
}
