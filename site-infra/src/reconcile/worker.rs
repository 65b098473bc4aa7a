use std::fs;
use std::path::Path;

use crate::cloudflare::{
    CloudflareApi, WorkerBinding, WorkerMetadata, WorkerRouteSpec, WorkerScriptPart,
    WORKER_MODULE_CONTENT_TYPE,
};
use crate::config::WorkerConfig;
use crate::error::InfraError;

use super::UpsertOutcome;

pub const REDIRECT_MODULE_FILENAME: &str = "redirect.js";
const BUNDLED_REDIRECT_MODULE: &str = include_str!("../../worker/redirect.js");

/// A single ES module uploaded as the Worker's entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerModule {
    pub filename: String,
    pub body: Vec<u8>,
}

impl WorkerModule {
    /// The redirect module shipped with this binary.
    pub fn bundled() -> Self {
        Self {
            filename: REDIRECT_MODULE_FILENAME.to_string(),
            body: BUNDLED_REDIRECT_MODULE.as_bytes().to_vec(),
        }
    }

    pub fn load(path: &Path) -> Result<Self, InfraError> {
        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                InfraError::LocalPrecondition(format!(
                    "Worker module path {} has no file name",
                    path.display()
                ))
            })?
            .to_string();

        let body = fs::read(path).map_err(|e| {
            InfraError::LocalPrecondition(format!(
                "could not read Worker module {}: {}",
                path.display(),
                e
            ))
        })?;

        Ok(Self { filename, body })
    }

    pub fn from_config(config: &WorkerConfig) -> Result<Self, InfraError> {
        match &config.module_path {
            Some(path) => Self::load(path),
            None => Ok(Self::bundled()),
        }
    }
}

/// Uploads `module` as the whole content of the named Worker.
///
/// Always writes, whatever the Worker currently runs.
pub async fn deploy_worker_script(
    api: &impl CloudflareApi,
    script_name: &str,
    module: &WorkerModule,
    compatibility_date: &str,
    bindings: Vec<WorkerBinding>,
) -> Result<(), InfraError> {
    let metadata = WorkerMetadata {
        main_module: module.filename.clone(),
        compatibility_date: compatibility_date.to_string(),
        bindings,
    };
    let parts = vec![WorkerScriptPart {
        name: module.filename.clone(),
        content_type: WORKER_MODULE_CONTENT_TYPE.to_string(),
        data: module.body.clone(),
    }];

    log::debug!(
        "Uploading Worker {} ({} bytes, compatibility date {})",
        script_name,
        module.body.len(),
        compatibility_date
    );

    api.upload_worker_script(script_name, &metadata, parts).await
}

/// Binds `pattern` to `script_name`, reusing the first route in the zone
/// whose pattern is exactly `pattern`.
pub async fn upsert_route(
    api: &impl CloudflareApi,
    zone_id: &str,
    pattern: &str,
    script_name: &str,
) -> Result<UpsertOutcome, InfraError> {
    let route = WorkerRouteSpec {
        pattern: pattern.to_string(),
        script: script_name.to_string(),
    };
    let routes = api.list_worker_routes(zone_id).await?;

    let mut matching = routes.iter().filter(|r| r.pattern == pattern);
    let existing = matching.next();
    let duplicates = matching.count();
    if duplicates > 0 {
        log::warn!(
            "Found {} extra Worker routes with pattern {}; leaving them untouched",
            duplicates,
            pattern
        );
    }

    match existing {
        Some(current) => {
            log::debug!(
                "Rebinding route {} from {} to {}",
                pattern,
                current.script.as_deref().unwrap_or("no script"),
                script_name
            );
            api.update_worker_route(zone_id, &current.id, &route).await?;
            Ok(UpsertOutcome::Updated)
        }
        None => {
            api.create_worker_route(zone_id, &route).await?;
            Ok(UpsertOutcome::Created)
        }
    }
}
