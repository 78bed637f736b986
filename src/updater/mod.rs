use std::path::PathBuf;

use log::{info, warn};

use crate::fetch;
use crate::manifest::{self, Manifest};
use crate::resolver::{self, ClientState, DownloadPlan};
use crate::storage::{self, DownloadStore, VersionTable};
use crate::version::AppVersion;

/// Inputs for one update check.
#[derive(Debug, Clone)]
pub struct UpdateRequest {
    /// Local path or `http(s)` URL of the manifest document.
    pub manifest_source: String,
    pub app_version: AppVersion,
    pub is_test_client: bool,
    pub build_versions: PathBuf,
    pub download_state: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateStatus {
    UpToDate,
    DownloadsPending(DownloadPlan),
    CheckFailed(String),
}

/// Fetch the manifest and work out which data files this client needs.
pub async fn check_for_updates(request: &UpdateRequest) -> UpdateStatus {
    match try_check(request).await {
        Ok(plan) if plan.is_empty() => {
            info!("update check: all data files up to date");
            UpdateStatus::UpToDate
        }
        Ok(plan) => {
            info!("update check: {} file(s) to download", plan.len());
            UpdateStatus::DownloadsPending(plan)
        }
        Err(err) => {
            warn!("update check failed: {err}");
            UpdateStatus::CheckFailed(err)
        }
    }
}

async fn try_check(request: &UpdateRequest) -> Result<DownloadPlan, String> {
    let document = fetch::load_document(&request.manifest_source).await?;
    let manifest = manifest::parse_manifest(&document).map_err(|e| e.to_string())?;
    info!(
        "update check: manifest lists {} file(s), app version {}, test client={}",
        manifest.len(),
        request.app_version,
        request.is_test_client
    );

    let build_versions = storage::load_build_versions(&request.build_versions).await?;
    let downloaded = DownloadStore::at(&request.download_state)
        .read_versions()
        .await?;
    Ok(plan_for(&manifest, request, build_versions, downloaded))
}

fn plan_for(
    manifest: &Manifest,
    request: &UpdateRequest,
    build_versions: VersionTable,
    downloaded_versions: VersionTable,
) -> DownloadPlan {
    let state = ClientState {
        app_version: request.app_version,
        is_test_client: request.is_test_client,
        build_versions,
        downloaded_versions,
    };
    resolver::resolve(manifest, &state)
}
