use std::fmt;

use serde::{Deserialize, Serialize};

pub const WORKER_MODULE_CONTENT_TYPE: &str = "application/javascript+module";

/// Envelope wrapped around every Cloudflare v4 response.
#[derive(Deserialize, Debug)]
pub(crate) struct ApiEnvelope<T> {
    pub success: bool,
    #[serde(default)]
    pub errors: Vec<ApiErrorInfo>,
    pub result: Option<T>,
}

#[derive(Deserialize, Debug)]
pub(crate) struct ApiErrorInfo {
    pub code: Option<u32>,
    pub message: String,
}

impl fmt::Display for ApiErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "[{}] {}", code, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct Zone {
    pub id: String,
    pub name: String,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DnsRecord {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub record_type: String,
    pub content: String,
    pub proxied: Option<bool>,
    pub ttl: Option<u32>,
}

/// Body sent when creating or overwriting a DNS record.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct DnsRecordSpec {
    #[serde(rename = "type")]
    pub record_type: String,
    pub name: String,
    pub content: String,
    /// `1` means "automatic".
    pub ttl: u32,
    pub proxied: bool,
}

impl DnsRecordSpec {
    /// A proxied CNAME with automatic TTL.
    pub fn proxied_cname(name: &str, target: &str) -> Self {
        Self {
            record_type: "CNAME".to_string(),
            name: name.to_string(),
            content: target.to_string(),
            ttl: 1,
            proxied: true,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct PagesDomain {
    pub name: String,
    pub status: Option<String>,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct WorkerRoute {
    pub id: String,
    pub pattern: String,
    pub script: Option<String>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct WorkerRouteSpec {
    pub pattern: String,
    pub script: String,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct WorkerMetadata {
    pub main_module: String,
    pub compatibility_date: String,
    pub bindings: Vec<WorkerBinding>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkerBinding {
    PlainText { name: String, text: String },
}

#[derive(Clone)]
pub struct WorkerScriptPart {
    pub name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl fmt::Debug for WorkerScriptPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerScriptPart")
            .field("name", &self.name)
            .field("content_type", &self.content_type)
            .field("len", &self.data.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_binding_serializes_with_type_tag() {
        let metadata = WorkerMetadata {
            main_module: "redirect.js".to_string(),
            compatibility_date: "2024-09-23".to_string(),
            bindings: vec![WorkerBinding::PlainText {
                name: "CANONICAL_ORIGIN".to_string(),
                text: "https://tyrum.ai".to_string(),
            }],
        };

        let value = serde_json::to_value(&metadata).unwrap();

        assert_eq!(
            value,
            serde_json::json!({
                "main_module": "redirect.js",
                "compatibility_date": "2024-09-23",
                "bindings": [
                    {"type": "plain_text", "name": "CANONICAL_ORIGIN", "text": "https://tyrum.ai"}
                ]
            })
        );
    }

    #[test]
    fn test_envelope_tolerates_missing_errors_and_null_result() {
        let envelope: ApiEnvelope<Vec<Zone>> =
            serde_json::from_str(r#"{"success": true, "result": null}"#).unwrap();

        assert!(envelope.success);
        assert!(envelope.errors.is_empty());
        assert!(envelope.result.is_none());
    }
}
