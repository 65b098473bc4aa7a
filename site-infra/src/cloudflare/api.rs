use std::time::Duration;

use reqwest::{multipart, Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::json;
use url::Url;

use crate::error::InfraError;

use super::{
    auth::CloudflareApiAuth,
    types::{
        ApiEnvelope, DnsRecord, DnsRecordSpec, PagesDomain, WorkerMetadata, WorkerRoute,
        WorkerRouteSpec, WorkerScriptPart, Zone,
    },
};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// The slice of the Cloudflare v4 API the reconciler talks to.
///
/// Lookups return typed "not found" (`None` or an empty list); only calls
/// the API reports as failed are errors.
pub trait CloudflareApi {
    async fn find_zone_id(&self, zone_name: &str) -> Result<Option<String>, InfraError>;

    async fn list_cname_records(
        &self,
        zone_id: &str,
        name: &str,
    ) -> Result<Vec<DnsRecord>, InfraError>;
    async fn create_dns_record(
        &self,
        zone_id: &str,
        record: &DnsRecordSpec,
    ) -> Result<(), InfraError>;
    async fn update_dns_record(
        &self,
        zone_id: &str,
        record_id: &str,
        record: &DnsRecordSpec,
    ) -> Result<(), InfraError>;

    async fn list_pages_domains(&self, project: &str) -> Result<Vec<PagesDomain>, InfraError>;
    async fn add_pages_domain(&self, project: &str, domain: &str) -> Result<(), InfraError>;

    async fn upload_worker_script(
        &self,
        script_name: &str,
        metadata: &WorkerMetadata,
        parts: Vec<WorkerScriptPart>,
    ) -> Result<(), InfraError>;

    async fn list_worker_routes(&self, zone_id: &str) -> Result<Vec<WorkerRoute>, InfraError>;
    async fn create_worker_route(
        &self,
        zone_id: &str,
        route: &WorkerRouteSpec,
    ) -> Result<(), InfraError>;
    async fn update_worker_route(
        &self,
        zone_id: &str,
        route_id: &str,
        route: &WorkerRouteSpec,
    ) -> Result<(), InfraError>;
}

pub struct AccountCloudflareApi {
    base_url: String,
    account_id: String,
    api_auth: Box<dyn CloudflareApiAuth>,
    client: Client,
}

impl AccountCloudflareApi {
    pub fn new(
        base_url: String,
        account_id: String,
        api_auth: Box<dyn CloudflareApiAuth>,
    ) -> Result<Self, InfraError> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            account_id,
            api_auth,
            client,
        })
    }

    /// Appends `segments` to the base URL path, percent-encoding each one
    /// (`/` included).
    fn endpoint_url(&self, segments: &[&str]) -> Result<Url, InfraError> {
        let mut url = Url::parse(&self.base_url).map_err(|e| {
            InfraError::InvalidConfig(format!(
                "bad Cloudflare API base URL {}: {}",
                self.base_url, e
            ))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                InfraError::InvalidConfig(format!(
                    "Cloudflare API base URL {} cannot take a path",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(segments);

        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder, InfraError> {
        self.request_with_query(method, segments, &[])
    }

    fn request_with_query(
        &self,
        method: Method,
        segments: &[&str],
        query: &[(&str, &str)],
    ) -> Result<RequestBuilder, InfraError> {
        let mut url = self.endpoint_url(segments)?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }

        Ok(self
            .client
            .request(method, url)
            .headers(self.api_auth.headers()))
    }

    /// Sends the request and unwraps the response envelope.
    ///
    /// A non-2xx status, an undecodable body or `success: false` all become
    /// `RemoteCallFailed` carrying the raw body.
    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<Option<T>, InfraError> {
        let request = request.build()?;
        let method = request.method().to_string();
        let endpoint = request.url().path().to_string();
        log::debug!("{} {}", method, request.url());

        let resp = self.client.execute(request).await?;
        let status = resp.status();
        let body = resp.text().await?;
        log::debug!("{} {} -> {}", method, endpoint, status);

        let failed = |body: String| InfraError::RemoteCallFailed {
            method: method.clone(),
            endpoint: endpoint.clone(),
            status: status.as_u16(),
            body,
        };

        if !status.is_success() {
            return Err(failed(body));
        }

        let envelope: ApiEnvelope<T> = match serde_json::from_str(&body) {
            Ok(envelope) => envelope,
            Err(e) => {
                log::error!("Could not decode response of {} {}: {}", method, endpoint, e);
                return Err(failed(body));
            }
        };

        if !envelope.success {
            for error in &envelope.errors {
                log::error!("{} {}: {}", method, endpoint, error);
            }
            return Err(failed(body));
        }

        Ok(envelope.result)
    }
}

impl CloudflareApi for AccountCloudflareApi {
    async fn find_zone_id(&self, zone_name: &str) -> Result<Option<String>, InfraError> {
        let request = self.request_with_query(Method::GET, &["zones"], &[("name", zone_name)])?;

        let zones: Option<Vec<Zone>> = self.send(request).await?;

        Ok(zones
            .unwrap_or_default()
            .into_iter()
            .next()
            .map(|zone| {
                log::debug!("Zone {} has ID {}", zone.name, zone.id);
                zone.id
            })
            .filter(|id| !id.trim().is_empty()))
    }

    async fn list_cname_records(
        &self,
        zone_id: &str,
        name: &str,
    ) -> Result<Vec<DnsRecord>, InfraError> {
        let request = self.request_with_query(
            Method::GET,
            &["zones", zone_id, "dns_records"],
            &[("type", "CNAME"), ("name", name)],
        )?;

        let records: Option<Vec<DnsRecord>> = self.send(request).await?;

        Ok(records.unwrap_or_default())
    }

    async fn create_dns_record(
        &self,
        zone_id: &str,
        record: &DnsRecordSpec,
    ) -> Result<(), InfraError> {
        let request = self
            .request(Method::POST, &["zones", zone_id, "dns_records"])?
            .json(record);

        let _: Option<DnsRecord> = self.send(request).await?;

        Ok(())
    }

    async fn update_dns_record(
        &self,
        zone_id: &str,
        record_id: &str,
        record: &DnsRecordSpec,
    ) -> Result<(), InfraError> {
        let request = self
            .request(Method::PUT, &["zones", zone_id, "dns_records", record_id])?
            .json(record);

        let _: Option<DnsRecord> = self.send(request).await?;

        Ok(())
    }

    async fn list_pages_domains(&self, project: &str) -> Result<Vec<PagesDomain>, InfraError> {
        let request = self.request(
            Method::GET,
            &["accounts", self.account_id.as_str(), "pages", "projects", project, "domains"],
        )?;

        let domains: Option<Vec<PagesDomain>> = self.send(request).await?;

        Ok(domains.unwrap_or_default())
    }

    async fn add_pages_domain(&self, project: &str, domain: &str) -> Result<(), InfraError> {
        let request = self
            .request(
                Method::POST,
                &["accounts", self.account_id.as_str(), "pages", "projects", project, "domains"],
            )?
            .json(&json!({ "name": domain }));

        let _: Option<serde_json::Value> = self.send(request).await?;

        Ok(())
    }

    async fn upload_worker_script(
        &self,
        script_name: &str,
        metadata: &WorkerMetadata,
        parts: Vec<WorkerScriptPart>,
    ) -> Result<(), InfraError> {
        let metadata_json = serde_json::to_string(metadata).map_err(|e| {
            InfraError::InvalidConfig(format!("could not encode worker metadata: {}", e))
        })?;

        let mut form = multipart::Form::new().part(
            "metadata",
            multipart::Part::text(metadata_json).mime_str("application/json")?,
        );

        for part in parts {
            form = form.part(
                part.name.clone(),
                multipart::Part::bytes(part.data)
                    .file_name(part.name)
                    .mime_str(&part.content_type)?,
            );
        }

        let request = self
            .request(
                Method::PUT,
                &["accounts", self.account_id.as_str(), "workers", "scripts", script_name],
            )?
            .multipart(form);

        let _: Option<serde_json::Value> = self.send(request).await?;

        Ok(())
    }

    async fn list_worker_routes(&self, zone_id: &str) -> Result<Vec<WorkerRoute>, InfraError> {
        let request = self.request(Method::GET, &["zones", zone_id, "workers", "routes"])?;

        let routes: Option<Vec<WorkerRoute>> = self.send(request).await?;

        Ok(routes.unwrap_or_default())
    }

    async fn create_worker_route(
        &self,
        zone_id: &str,
        route: &WorkerRouteSpec,
    ) -> Result<(), InfraError> {
        let request = self
            .request(Method::POST, &["zones", zone_id, "workers", "routes"])?
            .json(route);

        let _: Option<serde_json::Value> = self.send(request).await?;

        Ok(())
    }

    async fn update_worker_route(
        &self,
        zone_id: &str,
        route_id: &str,
        route: &WorkerRouteSpec,
    ) -> Result<(), InfraError> {
        let request = self
            .request(Method::PUT, &["zones", zone_id, "workers", "routes", route_id])?
            .json(route);

        let _: Option<serde_json::Value> = self.send(request).await?;

        Ok(())
    }
}
