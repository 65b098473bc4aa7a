//! In-memory Cloudflare used by the reconciler tests.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use crate::cloudflare::{
    CloudflareApi, DnsRecord, DnsRecordSpec, PagesDomain, WorkerMetadata, WorkerRoute,
    WorkerRouteSpec, WorkerScriptPart,
};
use crate::error::InfraError;

pub struct FakeCloudflareApi {
    zones: HashMap<String, String>,
    next_id: Cell<usize>,
    calls: RefCell<Vec<String>>,

    pub dns_records: RefCell<Vec<(String, DnsRecord)>>,
    pub pages_domains: RefCell<HashMap<String, Vec<String>>>,
    pub uploads: RefCell<Vec<(String, WorkerMetadata, Vec<WorkerScriptPart>)>>,
    pub routes: RefCell<Vec<(String, WorkerRoute)>>,
    pub fail_uploads: Cell<bool>,
}

impl FakeCloudflareApi {
    pub fn new() -> Self {
        Self {
            zones: HashMap::new(),
            next_id: Cell::new(0),
            calls: RefCell::new(vec![]),
            dns_records: RefCell::new(vec![]),
            pages_domains: RefCell::new(HashMap::new()),
            uploads: RefCell::new(vec![]),
            routes: RefCell::new(vec![]),
            fail_uploads: Cell::new(false),
        }
    }

    pub fn with_zone(mut self, name: &str, id: &str) -> Self {
        self.zones.insert(name.to_string(), id.to_string());
        self
    }

    pub fn with_cname(self, zone_id: &str, name: &str, content: &str) -> Self {
        let id = self.new_id("rec");
        self.dns_records.borrow_mut().push((
            zone_id.to_string(),
            DnsRecord {
                id,
                name: name.to_string(),
                record_type: "CNAME".to_string(),
                content: content.to_string(),
                proxied: Some(false),
                ttl: Some(300),
            },
        ));
        self
    }

    pub fn with_route(self, zone_id: &str, pattern: &str, script: &str) -> Self {
        let id = self.new_id("route");
        self.routes.borrow_mut().push((
            zone_id.to_string(),
            WorkerRoute {
                id,
                pattern: pattern.to_string(),
                script: Some(script.to_string()),
            },
        ));
        self
    }

    /// Every call made so far, as `"<METHOD> <resource> <key>"`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    pub fn writes(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|call| !call.starts_with("GET "))
            .collect()
    }

    fn record(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }

    fn new_id(&self, prefix: &str) -> String {
        let next = self.next_id.get() + 1;
        self.next_id.set(next);
        format!("{}-{}", prefix, next)
    }
}

impl CloudflareApi for FakeCloudflareApi {
    async fn find_zone_id(&self, zone_name: &str) -> Result<Option<String>, InfraError> {
        self.record(format!("GET zones {}", zone_name));
        Ok(self.zones.get(zone_name).cloned())
    }

    async fn list_cname_records(
        &self,
        zone_id: &str,
        name: &str,
    ) -> Result<Vec<DnsRecord>, InfraError> {
        self.record(format!("GET dns_records {}", name));
        Ok(self
            .dns_records
            .borrow()
            .iter()
            .filter(|(z, r)| z == zone_id && r.record_type == "CNAME" && r.name == name)
            .map(|(_, r)| r.clone())
            .collect())
    }

    async fn create_dns_record(
        &self,
        zone_id: &str,
        record: &DnsRecordSpec,
    ) -> Result<(), InfraError> {
        self.record(format!("POST dns_records {}", record.name));
        let id = self.new_id("rec");
        self.dns_records.borrow_mut().push((
            zone_id.to_string(),
            DnsRecord {
                id,
                name: record.name.clone(),
                record_type: record.record_type.clone(),
                content: record.content.clone(),
                proxied: Some(record.proxied),
                ttl: Some(record.ttl),
            },
        ));
        Ok(())
    }

    async fn update_dns_record(
        &self,
        zone_id: &str,
        record_id: &str,
        record: &DnsRecordSpec,
    ) -> Result<(), InfraError> {
        self.record(format!("PUT dns_records {}", record.name));
        let mut records = self.dns_records.borrow_mut();
        let (_, existing) = records
            .iter_mut()
            .find(|(z, r)| z == zone_id && r.id == record_id)
            .ok_or_else(|| InfraError::RemoteCallFailed {
                method: "PUT".to_string(),
                endpoint: format!("/zones/{}/dns_records/{}", zone_id, record_id),
                status: 404,
                body: "record not found".to_string(),
            })?;
        existing.name = record.name.clone();
        existing.record_type = record.record_type.clone();
        existing.content = record.content.clone();
        existing.proxied = Some(record.proxied);
        existing.ttl = Some(record.ttl);
        Ok(())
    }

    async fn list_pages_domains(&self, project: &str) -> Result<Vec<PagesDomain>, InfraError> {
        self.record(format!("GET pages_domains {}", project));
        Ok(self
            .pages_domains
            .borrow()
            .get(project)
            .map(|domains| {
                domains
                    .iter()
                    .map(|name| PagesDomain {
                        name: name.clone(),
                        status: Some("active".to_string()),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn add_pages_domain(&self, project: &str, domain: &str) -> Result<(), InfraError> {
        self.record(format!("POST pages_domains {}", domain));
        self.pages_domains
            .borrow_mut()
            .entry(project.to_string())
            .or_default()
            .push(domain.to_string());
        Ok(())
    }

    async fn upload_worker_script(
        &self,
        script_name: &str,
        metadata: &WorkerMetadata,
        parts: Vec<WorkerScriptPart>,
    ) -> Result<(), InfraError> {
        self.record(format!("PUT worker_script {}", script_name));
        if self.fail_uploads.get() {
            return Err(InfraError::RemoteCallFailed {
                method: "PUT".to_string(),
                endpoint: format!("/accounts/test/workers/scripts/{}", script_name),
                status: 400,
                body: r#"{"success":false,"errors":[{"code":10021,"message":"Uncaught SyntaxError"}]}"#
                    .to_string(),
            });
        }
        self.uploads
            .borrow_mut()
            .push((script_name.to_string(), metadata.clone(), parts));
        Ok(())
    }

    async fn list_worker_routes(&self, zone_id: &str) -> Result<Vec<WorkerRoute>, InfraError> {
        self.record(format!("GET worker_routes {}", zone_id));
        Ok(self
            .routes
            .borrow()
            .iter()
            .filter(|(z, _)| z == zone_id)
            .map(|(_, r)| r.clone())
            .collect())
    }

    async fn create_worker_route(
        &self,
        zone_id: &str,
        route: &WorkerRouteSpec,
    ) -> Result<(), InfraError> {
        self.record(format!("POST worker_routes {}", route.pattern));
        let id = self.new_id("route");
        self.routes.borrow_mut().push((
            zone_id.to_string(),
            WorkerRoute {
                id,
                pattern: route.pattern.clone(),
                script: Some(route.script.clone()),
            },
        ));
        Ok(())
    }

    async fn update_worker_route(
        &self,
        zone_id: &str,
        route_id: &str,
        route: &WorkerRouteSpec,
    ) -> Result<(), InfraError> {
        self.record(format!("PUT worker_routes {}", route.pattern));
        let mut routes = self.routes.borrow_mut();
        let (_, existing) = routes
            .iter_mut()
            .find(|(z, r)| z == zone_id && r.id == route_id)
            .ok_or_else(|| InfraError::RemoteCallFailed {
                method: "PUT".to_string(),
                endpoint: format!("/zones/{}/workers/routes/{}", zone_id, route_id),
                status: 404,
                body: "route not found".to_string(),
            })?;
        existing.pattern = route.pattern.clone();
        existing.script = Some(route.script.clone());
        Ok(())
    }
}
