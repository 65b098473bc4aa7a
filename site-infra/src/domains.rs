//! Normalisation of operator-supplied domain names.

/// Reduces a user-supplied host or URL to a bare apex domain.
///
/// `"HTTPS://WWW.Example.COM/path"` becomes `"example.com"`. Returns `None`
/// when nothing is left after stripping.
pub fn normalize_domain(raw: &str) -> Option<String> {
    let lowered = raw.trim().to_lowercase();

    let without_scheme = lowered
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(lowered.as_str());

    let host = without_scheme
        .split('/')
        .next()
        .unwrap_or_default()
        .trim_end_matches('.');
    let host = host.strip_prefix("www.").unwrap_or(host);

    if host.is_empty() {
        None
    } else {
        Some(host.to_string())
    }
}

/// Checks that `raw` is a bare hostname and returns it lower-cased without
/// a trailing dot.
///
/// Unlike [`normalize_domain`] nothing is stripped: a scheme, a path or a
/// character outside `[a-z0-9.-]` makes it `None`. A leading `www.` is kept.
pub fn bare_host(raw: &str) -> Option<String> {
    let host = raw.trim().trim_end_matches('.').to_lowercase();

    let valid = !host.is_empty()
        && host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
        && host.split('.').all(|label| !label.is_empty());

    if valid {
        Some(host)
    } else {
        None
    }
}

/// Parses a comma/whitespace separated list of extra apex domains.
///
/// The result keeps first-seen order, contains no duplicates and never
/// contains any of the `exclude` domains (which are compared after
/// normalisation too).
pub fn parse_extra_domains(raw: &str, exclude: &[&str]) -> Vec<String> {
    let excluded: Vec<String> = exclude.iter().filter_map(|d| normalize_domain(d)).collect();

    let mut domains: Vec<String> = Vec::new();
    for token in raw.split(|c: char| c == ',' || c.is_whitespace()) {
        let Some(domain) = normalize_domain(token) else {
            continue;
        };

        if excluded.contains(&domain) || domains.contains(&domain) {
            continue;
        }

        domains.push(domain);
    }

    domains
}

/// Name of the environment variable that pins the ID of `zone_name`.
///
/// `tyrum.ai` maps to `CLOUDFLARE_ZONE_ID_TYRUM_AI`.
pub fn zone_env_key(zone_name: &str) -> String {
    let normalized: String = zone_name
        .trim()
        .chars()
        .map(|c| match c {
            '.' | '-' => '_',
            other => other.to_ascii_uppercase(),
        })
        .collect();

    format!("CLOUDFLARE_ZONE_ID_{}", normalized)
}
