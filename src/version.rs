use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Dotted numeric application version (`major.minor[.build[.revision]]`).
///
/// Ordering is component-wise. An absent component sorts below any present one,
/// so `1.0 < 1.0.0 < 1.0.0.0`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AppVersion {
    major: u32,
    minor: u32,
    build: Option<u32>,
    revision: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionParseError {
    #[error("version must have 2 to 4 components, got {0}")]
    ComponentCount(usize),
    #[error("invalid version component {component:?}")]
    InvalidComponent { component: String },
}

impl AppVersion {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self {
            major,
            minor,
            build: None,
            revision: None,
        }
    }

    #[must_use]
    pub const fn with_build(mut self, build: u32) -> Self {
        self.build = Some(build);
        self
    }

    #[must_use]
    pub const fn with_revision(mut self, revision: u32) -> Self {
        self.revision = Some(revision);
        self
    }

    pub fn parse(version: &str) -> Result<Self, VersionParseError> {
        let parts = parse_version_parts(version.trim())?;
        match parts.as_slice() {
            [major, minor] => Ok(Self::new(*major, *minor)),
            [major, minor, build] => Ok(Self::new(*major, *minor).with_build(*build)),
            [major, minor, build, revision] => Ok(Self::new(*major, *minor)
                .with_build(*build)
                .with_revision(*revision)),
            other => Err(VersionParseError::ComponentCount(other.len())),
        }
    }

    pub fn major(&self) -> u32 {
        self.major
    }

    pub fn minor(&self) -> u32 {
        self.minor
    }

    pub fn build(&self) -> Option<u32> {
        self.build
    }

    pub fn revision(&self) -> Option<u32> {
        self.revision
    }
}

/// Split "1.2.3" into `[1, 2, 3]`, rejecting empty or non-numeric parts.
fn parse_version_parts(version: &str) -> Result<Vec<u32>, VersionParseError> {
    version
        .split('.')
        .map(|part| {
            // `u32::from_str` accepts a leading '+', which is not a version digit.
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(VersionParseError::InvalidComponent {
                    component: part.to_owned(),
                });
            }
            part.parse::<u32>()
                .map_err(|_| VersionParseError::InvalidComponent {
                    component: part.to_owned(),
                })
        })
        .collect()
}

impl FromStr for AppVersion {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for AppVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)?;
        if let Some(build) = self.build {
            write!(f, ".{build}")?;
        }
        if let Some(revision) = self.revision {
            write!(f, ".{revision}")?;
        }
        Ok(())
    }
}

impl Serialize for AppVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AppVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> AppVersion {
        AppVersion::parse(s).unwrap()
    }

    #[test]
    fn parses_version_parts_correctly() {
        assert_eq!(v("0.1.5"), AppVersion::new(0, 1).with_build(5));
        assert_eq!(v("10.0"), AppVersion::new(10, 0));
        assert_eq!(
            v("1.2.3.4"),
            AppVersion::new(1, 2).with_build(3).with_revision(4)
        );
        assert_eq!(v("  1.2.3  "), AppVersion::new(1, 2).with_build(3));
    }

    #[test]
    fn rejects_malformed_versions() {
        assert_eq!(
            AppVersion::parse("1"),
            Err(VersionParseError::ComponentCount(1))
        );
        assert_eq!(
            AppVersion::parse("1.2.3.4.5"),
            Err(VersionParseError::ComponentCount(5))
        );
        assert!(AppVersion::parse("").is_err());
        assert!(AppVersion::parse("1..2").is_err());
        assert!(AppVersion::parse("1.x").is_err());
        assert!(AppVersion::parse("v1.2").is_err());
        assert!(AppVersion::parse("1.+2").is_err());
        assert!(AppVersion::parse("1.-2").is_err());
        assert!(AppVersion::parse("1.99999999999").is_err());
    }

    #[test]
    fn compares_versions_numerically() {
        assert!(v("0.1.6") > v("0.1.5"));
        assert!(v("0.2.0") > v("0.1.5"));
        assert!(v("1.0.0") > v("0.9.9"));
        assert!(v("1.10.0") > v("1.9.0"));
        assert_eq!(v("0.1.5"), v("0.1.5"));
        assert!(v("0.1.4") < v("0.1.5"));
    }

    #[test]
    fn absent_components_sort_lower() {
        assert!(v("1.0") < v("1.0.0"));
        assert!(v("1.0.0") < v("1.0.0.0"));
        assert!(v("1.0") < v("1.0.0.0"));
        assert!(v("1.1") > v("1.0.9"));
    }

    #[test]
    fn displays_present_components_only() {
        assert_eq!(v("1.2").to_string(), "1.2");
        assert_eq!(v("01.2.3").to_string(), "1.2.3");
        assert_eq!(v("1.2.3.4").to_string(), "1.2.3.4");
    }

    #[test]
    fn serializes_as_string() {
        let json = serde_json::to_string(&v("2.0.1")).unwrap();
        assert_eq!(json, "\"2.0.1\"");
        let back: AppVersion = serde_json::from_str(&json).unwrap();
        assert_eq!(back, v("2.0.1"));
        assert!(serde_json::from_str::<AppVersion>("\"nope\"").is_err());
    }
}
