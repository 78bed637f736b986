//! Server manifest parsing.
//!
//! The document is a JSON array of `{ fileName, versions: [{ minAppVersion,
//! versionNumber, test }] }` objects. Parsing is all-or-nothing: the first
//! invalid element rejects the whole document.

use std::collections::HashSet;

use log::error;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::version::AppVersion;

pub mod models;

pub use models::{FileEntry, Manifest, VersionDescriptor};

const FIELD_FILE_NAME: &str = "fileName";
const FIELD_VERSIONS: &str = "versions";
const FIELD_MIN_APP_VERSION: &str = "minAppVersion";
const FIELD_VERSION_NUMBER: &str = "versionNumber";
const FIELD_TEST: &str = "test";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("manifest is not valid JSON: {0}")]
    InvalidJson(String),
    #[error("manifest root must be a JSON array")]
    NotAnArray,
    #[error("manifest contains no files")]
    EmptyDocument,
    #[error("element {index} is not an object")]
    MalformedElement { index: usize },
    #[error("element {index}: field \"fileName\" is missing or empty")]
    MissingFileName { index: usize },
    #[error("element {index}: field \"fileName\" has invalid value {value}")]
    InvalidFileName { index: usize, value: String },
    #[error("{file}: listed more than once")]
    DuplicateFile { file: String },
    #[error("{file}: file version list is missing")]
    MissingVersions { file: String },
    #[error("{file}: version entry {index} is not an object")]
    MalformedEntry { file: String, index: usize },
    #[error("{file}: field \"{field}\" is missing")]
    MissingField { file: String, field: &'static str },
    #[error("{file}: field \"{field}\" has invalid value {value}")]
    InvalidField {
        file: String,
        field: &'static str,
        value: String,
    },
}

impl ParseError {
    /// File the error was found in, when the element had a usable name.
    pub fn file(&self) -> Option<&str> {
        match self {
            ParseError::DuplicateFile { file }
            | ParseError::MissingVersions { file }
            | ParseError::MalformedEntry { file, .. }
            | ParseError::MissingField { file, .. }
            | ParseError::InvalidField { file, .. } => Some(file.as_str()),
            _ => None,
        }
    }

    pub fn field(&self) -> Option<&'static str> {
        match self {
            ParseError::MissingFileName { .. }
            | ParseError::InvalidFileName { .. }
            | ParseError::DuplicateFile { .. } => Some(FIELD_FILE_NAME),
            ParseError::MissingVersions { .. } | ParseError::MalformedEntry { .. } => {
                Some(FIELD_VERSIONS)
            }
            ParseError::MissingField { field, .. } | ParseError::InvalidField { field, .. } => {
                Some(*field)
            }
            _ => None,
        }
    }
}

/// Parse and validate a raw manifest document.
///
/// # Errors
/// Returns the first structural problem found; no partial manifest is produced.
pub fn parse_manifest(raw: &str) -> Result<Manifest, ParseError> {
    parse_document(raw).inspect_err(|err| error!("manifest rejected: {err}"))
}

fn parse_document(raw: &str) -> Result<Manifest, ParseError> {
    let document: Value =
        serde_json::from_str(raw).map_err(|e| ParseError::InvalidJson(e.to_string()))?;
    let Value::Array(elements) = document else {
        return Err(ParseError::NotAnArray);
    };
    if elements.is_empty() {
        return Err(ParseError::EmptyDocument);
    }

    let mut seen = HashSet::with_capacity(elements.len());
    let mut files = Vec::with_capacity(elements.len());
    for (index, element) in elements.iter().enumerate() {
        let Value::Object(fields) = element else {
            return Err(ParseError::MalformedElement { index });
        };
        let file_name = match fields.get(FIELD_FILE_NAME) {
            None | Some(Value::Null) => return Err(ParseError::MissingFileName { index }),
            Some(Value::String(name)) if name.is_empty() => {
                return Err(ParseError::MissingFileName { index });
            }
            Some(Value::String(name)) => name.as_str(),
            Some(other) => {
                return Err(ParseError::InvalidFileName {
                    index,
                    value: other.to_string(),
                });
            }
        };
        if !seen.insert(file_name) {
            return Err(ParseError::DuplicateFile {
                file: file_name.to_owned(),
            });
        }
        files.push(parse_file_entry(file_name, element)?);
    }

    Ok(Manifest::from_entries(files))
}

fn parse_file_entry(file_name: &str, element: &Value) -> Result<FileEntry, ParseError> {
    let versions = match element.get(FIELD_VERSIONS) {
        None | Some(Value::Null) => {
            return Err(ParseError::MissingVersions {
                file: file_name.to_owned(),
            });
        }
        Some(Value::Array(versions)) => versions,
        Some(other) => return Err(invalid(file_name, FIELD_VERSIONS, other)),
    };

    let versions = versions
        .iter()
        .enumerate()
        .map(|(index, entry)| match entry {
            Value::Object(fields) => parse_version(file_name, fields),
            _ => Err(ParseError::MalformedEntry {
                file: file_name.to_owned(),
                index,
            }),
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(FileEntry {
        file_name: file_name.to_owned(),
        versions,
    })
}

fn parse_version(
    file_name: &str,
    fields: &Map<String, Value>,
) -> Result<VersionDescriptor, ParseError> {
    let min_app_version = match required(file_name, fields, FIELD_MIN_APP_VERSION)? {
        Value::String(raw) if raw.is_empty() => {
            return Err(missing(file_name, FIELD_MIN_APP_VERSION));
        }
        Value::String(raw) => AppVersion::parse(raw)
            .map_err(|_| invalid(file_name, FIELD_MIN_APP_VERSION, &Value::from(raw.as_str())))?,
        other => return Err(invalid(file_name, FIELD_MIN_APP_VERSION, other)),
    };

    let number = required(file_name, fields, FIELD_VERSION_NUMBER)?;
    let version_number = number
        .as_u64()
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| invalid(file_name, FIELD_VERSION_NUMBER, number))?;

    let test = required(file_name, fields, FIELD_TEST)?;
    let is_test = test
        .as_bool()
        .ok_or_else(|| invalid(file_name, FIELD_TEST, test))?;

    Ok(VersionDescriptor::new(
        min_app_version,
        version_number,
        is_test,
    ))
}

fn required<'a>(
    file_name: &str,
    fields: &'a Map<String, Value>,
    field: &'static str,
) -> Result<&'a Value, ParseError> {
    match fields.get(field) {
        None | Some(Value::Null) => Err(missing(file_name, field)),
        Some(value) => Ok(value),
    }
}

fn missing(file_name: &str, field: &'static str) -> ParseError {
    ParseError::MissingField {
        file: file_name.to_owned(),
        field,
    }
}

fn invalid(file_name: &str, field: &'static str, value: &Value) -> ParseError {
    ParseError::InvalidField {
        file: file_name.to_owned(),
        field,
        value: value.to_string(),
    }
}
