//! Decide which file revisions a client should download next.

use log::debug;
use serde::Serialize;

use crate::manifest::{Manifest, VersionDescriptor};
use crate::version::AppVersion;

/// Per-file version source supplied by the host (build contents, download history).
///
/// Implementations must be total: a file they know nothing about reports 0.
pub trait VersionLookup {
    fn version_of(&self, file_name: &str) -> u32;
}

impl<F> VersionLookup for F
where
    F: Fn(&str) -> u32,
{
    fn version_of(&self, file_name: &str) -> u32 {
        self(file_name)
    }
}

/// Everything the resolver needs to know about the running client.
#[derive(Clone, Debug)]
pub struct ClientState<B, D> {
    pub app_version: AppVersion,
    pub is_test_client: bool,
    /// Versions baked into the installed build.
    pub build_versions: B,
    /// Versions this client already downloaded.
    pub downloaded_versions: D,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PlannedDownload {
    pub file_name: String,
    pub version_number: u32,
}

/// Files to fetch, at most one entry per file, in manifest order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DownloadPlan {
    downloads: Vec<PlannedDownload>,
}

impl DownloadPlan {
    pub fn len(&self) -> usize {
        self.downloads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.downloads.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PlannedDownload> {
        self.downloads.iter()
    }

    pub fn get(&self, file_name: &str) -> Option<u32> {
        self.downloads
            .iter()
            .find(|d| d.file_name == file_name)
            .map(|d| d.version_number)
    }
}

impl IntoIterator for DownloadPlan {
    type Item = PlannedDownload;
    type IntoIter = std::vec::IntoIter<PlannedDownload>;

    fn into_iter(self) -> Self::IntoIter {
        self.downloads.into_iter()
    }
}

impl<'a> IntoIterator for &'a DownloadPlan {
    type Item = &'a PlannedDownload;
    type IntoIter = std::slice::Iter<'a, PlannedDownload>;

    fn into_iter(self) -> Self::IntoIter {
        self.downloads.iter()
    }
}

/// Build the download plan for `state` from `manifest`.
///
/// For each file the LAST listed descriptor that passes every check wins, even
/// when an earlier one carries a higher version number. List order is the
/// server's precedence; do not sort it.
pub fn resolve<B, D>(manifest: &Manifest, state: &ClientState<B, D>) -> DownloadPlan
where
    B: VersionLookup,
    D: VersionLookup,
{
    let mut downloads = Vec::new();
    for entry in manifest {
        if entry.versions.is_empty() {
            continue;
        }
        let local_version = state.build_versions.version_of(&entry.file_name);
        let downloaded_version = state.downloaded_versions.version_of(&entry.file_name);

        let selected = entry.versions.iter().rev().find(|v| {
            is_eligible(v, state.app_version, state.is_test_client, local_version, downloaded_version)
        });

        match selected {
            Some(v) => {
                debug!(
                    "resolve: {} -> {} (local {}, downloaded {})",
                    entry.file_name,
                    v.version_number(),
                    local_version,
                    downloaded_version
                );
                downloads.push(PlannedDownload {
                    file_name: entry.file_name.clone(),
                    version_number: v.version_number(),
                });
            }
            None => debug!(
                "resolve: {} has no eligible version (local {}, downloaded {})",
                entry.file_name, local_version, downloaded_version
            ),
        }
    }
    DownloadPlan { downloads }
}

fn is_eligible(
    v: &VersionDescriptor,
    app_version: AppVersion,
    is_test_client: bool,
    local_version: u32,
    downloaded_version: u32,
) -> bool {
    let app_version_ok = v.min_app_version() <= app_version;
    let newer_than_downloaded = downloaded_version < v.version_number();
    let newer_than_local = local_version < v.version_number();
    let test_ok = is_test_client || !v.is_test();
    app_version_ok && newer_than_downloaded && newer_than_local && test_ok
}
