use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::Utc;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::env;
use crate::resolver::VersionLookup;

/// File name to version number; files that are not listed are at version 0.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionTable(BTreeMap<String, u32>);

impl VersionTable {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl VersionLookup for VersionTable {
    fn version_of(&self, file_name: &str) -> u32 {
        self.0.get(file_name).copied().unwrap_or(0)
    }
}

impl FromIterator<(String, u32)> for VersionTable {
    fn from_iter<I: IntoIterator<Item = (String, u32)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Read the versions embedded in the installed build.
///
/// A build without a version file ships no embedded copies.
pub async fn load_build_versions(path: &Path) -> Result<VersionTable, String> {
    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            debug!("no build version file at {}", path.display());
            return Ok(VersionTable::default());
        }
        Err(err) => return Err(format!("failed to read build versions: {err}")),
    };
    serde_json::from_slice(&bytes).map_err(|e| format!("failed to parse build versions: {e}"))
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadRecord {
    pub version: u32,
    pub downloaded_at: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct DownloadState {
    #[serde(default)]
    files: BTreeMap<String, DownloadRecord>,
}

/// Versions this client has already fetched, persisted as JSON.
#[derive(Clone)]
pub struct DownloadStore {
    path: PathBuf,
}

impl DownloadStore {
    pub fn new() -> Self {
        Self::at(env::download_state_file())
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn read_versions(&self) -> Result<VersionTable, String> {
        let state = self.load().await?;
        Ok(state
            .files
            .into_iter()
            .map(|(name, record)| (name, record.version))
            .collect())
    }

    pub async fn entries(&self) -> Result<Vec<(String, DownloadRecord)>, String> {
        Ok(self.load().await?.files.into_iter().collect())
    }

    /// Record that `file_name` was fetched at `version`.
    pub async fn record(&self, file_name: &str, version: u32) -> Result<(), String> {
        let mut state = self.load().await?;
        state.files.insert(
            file_name.to_owned(),
            DownloadRecord {
                version,
                downloaded_at: Utc::now().to_rfc3339(),
            },
        );
        self.save(&state).await?;
        info!("recorded {} at version {}", file_name, version);
        Ok(())
    }

    /// Drop the record for `file_name`. Returns false when there was none.
    pub async fn forget(&self, file_name: &str) -> Result<bool, String> {
        let mut state = self.load().await?;
        if state.files.remove(file_name).is_none() {
            return Ok(false);
        }
        self.save(&state).await?;
        info!("cleared download record for {}", file_name);
        Ok(true)
    }

    async fn load(&self) -> Result<DownloadState, String> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(DownloadState::default());
            }
            Err(err) => return Err(format!("failed to read download state: {err}")),
        };
        serde_json::from_slice(&bytes).map_err(|e| format!("failed to parse download state: {e}"))
    }

    async fn save(&self, state: &DownloadState) -> Result<(), String> {
        let bytes = serde_json::to_vec_pretty(state)
            .map_err(|e| format!("failed to serialize download state: {e}"))?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| format!("unable to create state dir: {e}"))?;
        }
        // Write beside the real file and rename over it so a cut-short write
        // never leaves truncated JSON behind.
        let tmp_path = self.path.with_extension("tmp");
        fs::write(&tmp_path, &bytes)
            .await
            .map_err(|e| format!("unable to persist download state: {e}"))?;
        fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|e| format!("unable to replace download state: {e}"))
    }
}
