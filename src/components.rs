//! Readers for the `KEY=VALUE` version manifests.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{VersionError, VersionResult};

/// Key of the product base major version in the product manifest.
pub const PRODUCT_MAJOR_KEY: &str = "HONEYCOMB_MAJOR";

/// Ordered key/value pairs read from a manifest file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VersionComponents {
    path: PathBuf,
    entries: Vec<(String, String)>,
}

impl VersionComponents {
    pub fn parse(path: impl Into<PathBuf>, source: &str) -> Self {
        let mut entries: Vec<(String, String)> = Vec::new();
        for line in source.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim().to_string();
            let value = value.trim().to_string();
            // Later definitions win but keep the original position.
            match entries.iter_mut().find(|(existing, _)| *existing == key) {
                Some(entry) => entry.1 = value,
                None => entries.push((key, value)),
            }
        }
        Self {
            path: path.into(),
            entries,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn require_u32(&self, key: &str) -> VersionResult<u32> {
        let value = self
            .get(key)
            .ok_or_else(|| VersionError::MissingComponent {
                key: key.to_string(),
                path: self.path.clone(),
            })?;
        value
            .parse::<u32>()
            .map_err(|_| VersionError::InvalidComponent {
                key: key.to_string(),
                value: value.to_string(),
                path: self.path.clone(),
            })
    }
}

/// Reads a manifest. A missing file means a broken checkout and is fatal.
pub fn read_version_file(path: &Path) -> VersionResult<VersionComponents> {
    if !path.is_file() {
        return Err(VersionError::MissingManifest(path.to_path_buf()));
    }
    let source = fs::read_to_string(path)?;
    Ok(VersionComponents::parse(path, &source))
}

/// Upstream platform version, e.g. `74.0.3729.6`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PlatformVersion {
    pub major: u32,
    pub minor: u32,
    pub build: u32,
    pub patch: u32,
}

impl PlatformVersion {
    pub fn from_components(components: &VersionComponents) -> VersionResult<Self> {
        Ok(Self {
            major: components.require_u32("MAJOR")?,
            minor: components.require_u32("MINOR")?,
            build: components.require_u32("BUILD")?,
            patch: components.require_u32("PATCH")?,
        })
    }

    pub fn load(path: &Path) -> VersionResult<Self> {
        Self::from_components(&read_version_file(path)?)
    }

    /// The four fields joined with `.`.
    pub fn dotted(&self) -> String {
        format!(
            "{}.{}.{}.{}",
            self.major, self.minor, self.build, self.patch
        )
    }

    /// Name of the release branch cut for this upstream build.
    pub fn release_branch(&self) -> String {
        self.build.to_string()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ProductVersion {
    pub major: u32,
}

impl ProductVersion {
    pub fn from_components(components: &VersionComponents) -> VersionResult<Self> {
        Ok(Self {
            major: components.require_u32(PRODUCT_MAJOR_KEY)?,
        })
    }

    pub fn load(path: &Path) -> VersionResult<Self> {
        Self::from_components(&read_version_file(path)?)
    }
}
