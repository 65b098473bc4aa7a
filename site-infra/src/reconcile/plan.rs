use std::fmt;

use crate::cloudflare::WorkerBinding;
use crate::config::InfraConfig;

pub const CANONICAL_ORIGIN_BINDING: &str = "CANONICAL_ORIGIN";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetCname {
    pub zone: String,
    pub name: String,
    pub target: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetPagesDomain {
    pub project: String,
    pub domain: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetWorker {
    pub name: String,
    pub compatibility_date: String,
    pub canonical_origin: String,
}

impl TargetWorker {
    pub fn bindings(&self) -> Vec<WorkerBinding> {
        vec![WorkerBinding::PlainText {
            name: CANONICAL_ORIGIN_BINDING.to_string(),
            text: self.canonical_origin.clone(),
        }]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetWorkerRoute {
    pub zone: String,
    pub pattern: String,
}

/// Everything the reconciler should leave behind in Cloudflare.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesiredState {
    /// Zones to resolve, in first-use order, without duplicates.
    pub zones: Vec<String>,
    pub dns_records: Vec<TargetCname>,
    pub pages_domains: Vec<TargetPagesDomain>,
    pub worker: TargetWorker,
    pub routes: Vec<TargetWorkerRoute>,
}

impl DesiredState {
    pub fn from_config(config: &InfraConfig) -> Self {
        let primary = config.primary_domain.as_str();
        let marketing_host = config.marketing.pages_host.as_str();

        let cname = |zone: &str, name: String, target: &str| TargetCname {
            zone: zone.to_string(),
            name,
            target: target.to_string(),
        };
        let route = |zone: &str, host: String| TargetWorkerRoute {
            zone: zone.to_string(),
            pattern: format!("{}/*", host),
        };

        let mut zones = vec![primary.to_string()];
        let mut dns_records = vec![
            cname(primary, primary.to_string(), marketing_host),
            cname(primary, format!("www.{}", primary), marketing_host),
            cname(primary, config.docs.hostname.clone(), config.docs.pages_host.as_str()),
        ];
        let pages_domains = vec![
            TargetPagesDomain {
                project: config.marketing.project.clone(),
                domain: config.marketing.hostname.clone(),
            },
            TargetPagesDomain {
                project: config.docs.project.clone(),
                domain: config.docs.hostname.clone(),
            },
        ];
        let mut routes = vec![route(primary, format!("www.{}", primary))];

        for domain in config.redirect_domains() {
            if !zones.contains(&domain) {
                zones.push(domain.clone());
            }
            let zone = domain.as_str();
            dns_records.push(cname(zone, domain.clone(), marketing_host));
            dns_records.push(cname(zone, format!("www.{}", domain), marketing_host));
            routes.push(route(zone, domain.clone()));
            routes.push(route(zone, format!("www.{}", domain)));
        }

        Self {
            zones,
            dns_records,
            pages_domains,
            worker: TargetWorker {
                name: config.worker.name.clone(),
                compatibility_date: config.worker.compatibility_date.clone(),
                canonical_origin: config.canonical_origin(),
            },
            routes,
        }
    }
}

impl fmt::Display for DesiredState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Zones:")?;
        for zone in &self.zones {
            writeln!(f, "  {}", zone)?;
        }
        writeln!(f, "DNS records (proxied CNAME):")?;
        for record in &self.dns_records {
            writeln!(f, "  {} -> {}", record.name, record.target)?;
        }
        writeln!(f, "Pages custom domains:")?;
        for domain in &self.pages_domains {
            writeln!(f, "  {} <- {}", domain.project, domain.domain)?;
        }
        writeln!(
            f,
            "Worker: {} (compatibility date {}, redirecting to {})",
            self.worker.name, self.worker.compatibility_date, self.worker.canonical_origin
        )?;
        writeln!(f, "Worker routes:")?;
        for route in &self.routes {
            writeln!(f, "  {} -> {}", route.pattern, self.worker.name)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(extra: &[(&str, &str)]) -> InfraConfig {
        let mut vars = vec![
            ("CLOUDFLARE_API_TOKEN".to_string(), "token".to_string()),
            ("CLOUDFLARE_ACCOUNT_ID".to_string(), "account".to_string()),
        ];
        vars.extend(extra.iter().map(|(k, v)| (k.to_string(), v.to_string())));
        InfraConfig::from_vars(vars).unwrap()
    }

    #[test]
    fn test_primary_site_only() {
        let state = DesiredState::from_config(&config(&[]));

        assert_eq!(state.zones, vec!["tyrum.ai"]);
        let names: Vec<_> = state.dns_records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["tyrum.ai", "www.tyrum.ai", "docs.tyrum.ai"]);
        assert_eq!(state.dns_records[2].target, "tyrum-docs.pages.dev");
        assert_eq!(
            state.pages_domains,
            vec![
                TargetPagesDomain {
                    project: "tyrum-marketing".to_string(),
                    domain: "tyrum.ai".to_string(),
                },
                TargetPagesDomain {
                    project: "tyrum-docs".to_string(),
                    domain: "docs.tyrum.ai".to_string(),
                },
            ]
        );
        assert_eq!(
            state.routes,
            vec![TargetWorkerRoute {
                zone: "tyrum.ai".to_string(),
                pattern: "www.tyrum.ai/*".to_string(),
            }]
        );
        assert_eq!(state.worker.canonical_origin, "https://tyrum.ai");
    }

    #[test]
    fn test_redirect_domains_get_records_and_routes() {
        let state = DesiredState::from_config(&config(&[
            ("SITE_ALIAS_DOMAIN", "tyrum.com"),
            ("SITE_EXTRA_DOMAINS", "gettyrum.io, tyrum.com"),
        ]));

        assert_eq!(state.zones, vec!["tyrum.ai", "tyrum.com", "gettyrum.io"]);
        assert_eq!(state.dns_records.len(), 7);
        assert!(state.dns_records.iter().any(|r| r.zone == "gettyrum.io"
            && r.name == "www.gettyrum.io"
            && r.target == "tyrum-marketing.pages.dev"));
        let patterns: Vec<_> = state.routes.iter().map(|r| r.pattern.as_str()).collect();
        assert_eq!(
            patterns,
            vec![
                "www.tyrum.ai/*",
                "tyrum.com/*",
                "www.tyrum.com/*",
                "gettyrum.io/*",
                "www.gettyrum.io/*",
            ]
        );
    }

    #[test]
    fn test_display_lists_every_resource() {
        let state = DesiredState::from_config(&config(&[]));

        let rendered = state.to_string();

        assert!(rendered.contains("docs.tyrum.ai -> tyrum-docs.pages.dev"));
        assert!(rendered.contains("tyrum-marketing <- tyrum.ai"));
        assert!(rendered.contains("www.tyrum.ai/* -> tyrum-redirect"));
    }
}
