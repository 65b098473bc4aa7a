mod api;
mod auth;
mod types;

pub use api::{AccountCloudflareApi, CloudflareApi};
pub use auth::CloudflareTokenAuth;
pub use types::{
    DnsRecord, DnsRecordSpec, PagesDomain, WorkerBinding, WorkerMetadata, WorkerRoute,
    WorkerRouteSpec, WorkerScriptPart, WORKER_MODULE_CONTENT_TYPE,
};
