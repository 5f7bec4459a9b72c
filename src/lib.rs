//! Product version numbers computed from the state of a git checkout.
//!
//! No counter is stored anywhere: the version is a function of two version
//! manifests and the commit history of the product checkout. See
//! [`VersionFormatter`] for the formats.

mod branch;
mod components;
mod config;
mod error;
mod formatter;
mod render;
mod repo;

pub use branch::{compute_branch_version, touches_marker, BranchVersion};
pub use components::{
    read_version_file, PlatformVersion, ProductVersion, VersionComponents, PRODUCT_MAJOR_KEY,
};
pub use config::{
    VersionConfig, ENV_GIT_EXECUTABLE, ENV_GIT_REMOTE, ENV_OLD_VERSION_FORMAT, ENV_SRC_PATH,
};
pub use error::{VersionError, VersionResult};
pub use formatter::{
    CommitIdentity, ResolvedVersion, VersionFormat, VersionFormatter, VersionShape,
};
pub use render::{dylib_version_string, plist_version_string, VersionParts, DYLIB_COMPONENT_MAX};
pub use repo::{
    is_checkout, last_decoration, parse_cherry, ChangeSet, GitRepository, RepositoryQuery,
    UNKNOWN,
};
