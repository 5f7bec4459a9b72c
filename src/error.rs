use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

pub type VersionResult<T> = Result<T, VersionError>;

/// Hard failures. Repository queries never produce these; they degrade to
/// sentinel values instead.
#[derive(Debug, Error, Diagnostic)]
pub enum VersionError {
    #[error("checkout directory not found at {0}")]
    #[diagnostic(
        code("version.missing_checkout"),
        help("pass the path of the source root that contains the product checkout")
    )]
    MissingCheckout(PathBuf),

    #[error("version manifest not found at {0}")]
    #[diagnostic(code("version.missing_manifest"))]
    MissingManifest(PathBuf),

    #[error("version component `{key}` missing from {path}")]
    #[diagnostic(code("version.missing_component"))]
    MissingComponent { key: String, path: PathBuf },

    #[error("version component `{key}` in {path} is not a non-negative integer: `{value}`")]
    #[diagnostic(code("version.invalid_component"))]
    InvalidComponent {
        key: String,
        value: String,
        path: PathBuf,
    },

    #[error("invalid configuration: {0}")]
    #[diagnostic(code("version.invalid_config"))]
    InvalidConfig(String),

    #[error("failed to parse configuration: {0}")]
    #[diagnostic(code("version.config_parse"))]
    ConfigParse(#[from] toml::de::Error),

    #[error("io error: {0}")]
    #[diagnostic(code("version.io"))]
    Io(#[from] std::io::Error),
}
