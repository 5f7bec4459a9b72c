//! Checkout layout and formatting defaults.
//!
//! Values come from `VersionConfig::default()`, an optional TOML file and
//! finally the `HONEYCOMB_*` environment variables, in that order.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{VersionError, VersionResult};

pub const ENV_OLD_VERSION_FORMAT: &str = "HONEYCOMB_OLD_VERSION_FORMAT";
pub const ENV_SRC_PATH: &str = "HONEYCOMB_SRC_PATH";
pub const ENV_GIT_REMOTE: &str = "HONEYCOMB_GIT_REMOTE";
pub const ENV_GIT_EXECUTABLE: &str = "HONEYCOMB_GIT";

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct VersionConfig {
    /// Source root holding the upstream manifest and the product checkout.
    pub src_path: PathBuf,
    /// Product sub-checkout, relative to `src_path`.
    pub product_dir: PathBuf,
    /// Upstream platform manifest, relative to `src_path`.
    pub upstream_manifest: PathBuf,
    /// Product base manifest, relative to the product checkout.
    pub product_manifest: PathBuf,
    /// Any changed path containing this substring advances the feature counter.
    pub marker_file: String,
    pub remote: String,
    /// Ref the branch accumulator diffs against. Defaults to `<remote>/master`.
    pub mainline_ref: Option<String>,
    pub git_executable: String,
    pub old_format_default: bool,
}

impl Default for VersionConfig {
    fn default() -> Self {
        Self {
            src_path: PathBuf::from("."),
            product_dir: PathBuf::from("honey"),
            upstream_manifest: Path::new("chrome").join("VERSION"),
            product_manifest: PathBuf::from("VERSION.in"),
            marker_file: "honey_api_hash.h".to_string(),
            remote: "upstream".to_string(),
            mainline_ref: None,
            git_executable: "git".to_string(),
            old_format_default: false,
        }
    }
}

impl VersionConfig {
    pub fn new(src_path: impl Into<PathBuf>) -> Self {
        Self {
            src_path: src_path.into(),
            ..Self::default()
        }
    }

    /// Loads a TOML config file. Missing keys keep their defaults.
    pub fn load_from(path: &Path) -> VersionResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }

    /// Applies overrides from the process environment.
    pub fn with_env(self) -> VersionResult<Self> {
        self.with_env_from(|key| std::env::var(key).ok())
    }

    pub fn with_env_from<F>(mut self, lookup: F) -> VersionResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_OLD_VERSION_FORMAT) {
            let value: i64 = raw.trim().parse().map_err(|_| {
                VersionError::InvalidConfig(format!(
                    "{ENV_OLD_VERSION_FORMAT} must be an integer, got `{raw}`"
                ))
            })?;
            self.old_format_default = value != 0;
        }
        if let Some(path) = lookup(ENV_SRC_PATH).filter(|value| !value.is_empty()) {
            self.src_path = PathBuf::from(path);
        }
        if let Some(remote) = lookup(ENV_GIT_REMOTE).filter(|value| !value.is_empty()) {
            self.remote = remote;
        }
        if let Some(git) = lookup(ENV_GIT_EXECUTABLE).filter(|value| !value.is_empty()) {
            self.git_executable = git;
        }
        Ok(self)
    }

    pub fn product_path(&self) -> PathBuf {
        self.src_path.join(&self.product_dir)
    }

    pub fn upstream_manifest_path(&self) -> PathBuf {
        self.src_path.join(&self.upstream_manifest)
    }

    pub fn product_manifest_path(&self) -> PathBuf {
        self.product_path().join(&self.product_manifest)
    }

    pub fn mainline_ref(&self) -> String {
        match &self.mainline_ref {
            Some(reference) => reference.clone(),
            None => format!("{}/master", self.remote),
        }
    }

    /// Fails hard when the source root or the product checkout is missing.
    pub fn validate_layout(&self) -> VersionResult<()> {
        if !self.src_path.is_dir() {
            return Err(VersionError::MissingCheckout(self.src_path.clone()));
        }
        let product = self.product_path();
        if !product.is_dir() {
            return Err(VersionError::MissingCheckout(product));
        }
        Ok(())
    }
}
