#[derive(thiserror::Error, Debug)]
pub enum InfraError {
    #[error("missing required configuration: {}", .0.join(", "))]
    MissingConfig(Vec<String>),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("could not resolve a zone ID for '{0}' (no JSON map entry, no env override, no API match)")]
    ZoneNotFound(String),
    #[error("Cloudflare API call {method} {endpoint} failed with status {status}: {body}")]
    RemoteCallFailed {
        method: String,
        endpoint: String,
        status: u16,
        body: String,
    },
    #[error("{0}")]
    LocalPrecondition(String),
    #[error("Cloudflare API request failed: {0}")]
    Transport(#[from] reqwest::Error),
}
