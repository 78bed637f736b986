use serde::Serialize;

use crate::version::AppVersion;

/// One revision of a data file and the clients allowed to receive it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct VersionDescriptor {
    min_app_version: AppVersion,
    version_number: u32,
    is_test: bool,
}

impl VersionDescriptor {
    pub fn new(min_app_version: AppVersion, version_number: u32, is_test: bool) -> Self {
        Self {
            min_app_version,
            version_number,
            is_test,
        }
    }

    pub fn min_app_version(&self) -> AppVersion {
        self.min_app_version
    }

    pub fn version_number(&self) -> u32 {
        self.version_number
    }

    pub fn is_test(&self) -> bool {
        self.is_test
    }
}

/// A file and its version history, in the order the server listed it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FileEntry {
    pub file_name: String,
    pub versions: Vec<VersionDescriptor>,
}

/// Validated server manifest. File order and per-file version order are kept
/// exactly as received.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Manifest {
    files: Vec<FileEntry>,
}

impl Manifest {
    pub(crate) fn from_entries(files: Vec<FileEntry>) -> Self {
        Self { files }
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FileEntry> {
        self.files.iter()
    }

    pub fn versions_of(&self, file_name: &str) -> Option<&[VersionDescriptor]> {
        self.files
            .iter()
            .find(|entry| entry.file_name == file_name)
            .map(|entry| entry.versions.as_slice())
    }
}

impl<'a> IntoIterator for &'a Manifest {
    type Item = &'a FileEntry;
    type IntoIter = std::slice::Iter<'a, FileEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.iter()
    }
}
