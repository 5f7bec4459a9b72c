//! Version strings derived from checkout state.
//!
//! Two formats are supported:
//!
//! - Legacy, `X.YYYY.N.gHHHHHHH`: product major version, upstream build,
//!   commit count and abbreviated hash. Example: `3.3729.1921.g62d140e`.
//! - Current, which depends on where `HEAD` sits:
//!   - `X.Y.Z+gHHHHHHH+upstream-A.B.C.D` on a release branch, where `Y` and
//!     `Z` come from [`BranchVersion`]. Example:
//!     `74.0.1+g62d140e+upstream-74.0.3729.6`.
//!   - `X.0.0-<branch>.N+gHHHHHHH+upstream-A.B.C.D` anywhere else. Example:
//!     `74.0.0-master.1920+g725ed88+upstream-74.0.3729.0`.
//!
//! Everything is computed lazily and cached until [`VersionFormatter::reset`].

use serde::Serialize;
use tracing::{debug, instrument};

use crate::branch::{compute_branch_version, BranchVersion};
use crate::components::{PlatformVersion, ProductVersion};
use crate::config::VersionConfig;
use crate::error::VersionResult;
use crate::render::{self, VersionParts};
use crate::repo::{GitRepository, RepositoryQuery};

const HEAD: &str = "HEAD";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionFormat {
    Current,
    Legacy,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionShape {
    Legacy,
    Release,
    Development,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CommitIdentity {
    pub hash: String,
    pub number: u32,
}

impl CommitIdentity {
    /// `g` followed by the first seven characters of the hash.
    pub fn short_hash(&self) -> String {
        let abbrev: String = self.hash.chars().take(7).collect();
        format!("g{abbrev}")
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ResolvedVersion {
    pub parts: VersionParts,
    pub display: String,
    pub shape: VersionShape,
}

/// Memoized values. Replaced wholesale on reset.
#[derive(Debug, Default)]
struct VersionCache {
    platform: Option<PlatformVersion>,
    product: Option<ProductVersion>,
    commit: Option<CommitIdentity>,
    branch: Option<BranchVersion>,
    legacy: Option<ResolvedVersion>,
    current: Option<ResolvedVersion>,
}

pub struct VersionFormatter<R> {
    config: VersionConfig,
    repo: R,
    cache: VersionCache,
}

impl VersionFormatter<GitRepository> {
    /// Queries the product checkout under `config.src_path` with git.
    pub fn open(config: VersionConfig) -> VersionResult<Self> {
        let repo = GitRepository::with_executable(config.product_path(), &config.git_executable);
        Self::new(config, repo)
    }
}

impl<R: RepositoryQuery> VersionFormatter<R> {
    /// Fails if the source root or the product checkout does not exist.
    pub fn new(config: VersionConfig, repo: R) -> VersionResult<Self> {
        config.validate_layout()?;
        Ok(Self {
            config,
            repo,
            cache: VersionCache::default(),
        })
    }

    pub fn config(&self) -> &VersionConfig {
        &self.config
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Drops every cached value; the next access recomputes from scratch.
    pub fn reset(&mut self) {
        self.cache = VersionCache::default();
    }

    pub fn platform_version(&mut self) -> VersionResult<PlatformVersion> {
        if let Some(platform) = self.cache.platform {
            return Ok(platform);
        }
        let platform = PlatformVersion::load(&self.config.upstream_manifest_path())?;
        Ok(*self.cache.platform.insert(platform))
    }

    pub fn product_version(&mut self) -> VersionResult<ProductVersion> {
        if let Some(product) = self.cache.product {
            return Ok(product);
        }
        let product = ProductVersion::load(&self.config.product_manifest_path())?;
        Ok(*self.cache.product.insert(product))
    }

    pub fn commit_identity(&mut self) -> &CommitIdentity {
        let commit = match self.cache.commit.take() {
            Some(commit) => commit,
            None => CommitIdentity {
                hash: self.repo.resolve_hash(HEAD),
                number: self.repo.count_commits(HEAD),
            },
        };
        &*self.cache.commit.insert(commit)
    }

    /// Feature/change counters for `HEAD` relative to the mainline ref.
    pub fn branch_version(&mut self) -> BranchVersion {
        if let Some(branch) = self.cache.branch {
            return branch;
        }
        let branch = compute_branch_version(
            &self.repo,
            HEAD,
            &self.config.mainline_ref(),
            &self.config.marker_file,
        );
        *self.cache.branch.insert(branch)
    }

    /// Upstream version as `A.B.C.D`.
    pub fn upstream_version_string(&mut self) -> VersionResult<String> {
        Ok(self.platform_version()?.dotted())
    }

    pub fn resolved(&mut self, format: Option<VersionFormat>) -> VersionResult<&ResolvedVersion> {
        match self.select(format) {
            VersionFormat::Legacy => {
                let resolved = match self.cache.legacy.take() {
                    Some(resolved) => resolved,
                    None => self.compute_legacy()?,
                };
                Ok(&*self.cache.legacy.insert(resolved))
            }
            VersionFormat::Current => {
                let resolved = match self.cache.current.take() {
                    Some(resolved) => resolved,
                    None => self.compute_current()?,
                };
                Ok(&*self.cache.current.insert(resolved))
            }
        }
    }

    pub fn version_string(&mut self, format: Option<VersionFormat>) -> VersionResult<String> {
        Ok(self.resolved(format)?.display.clone())
    }

    pub fn version_parts(&mut self, format: Option<VersionFormat>) -> VersionResult<VersionParts> {
        Ok(self.resolved(format)?.parts)
    }

    pub fn plist_version_string(
        &mut self,
        format: Option<VersionFormat>,
    ) -> VersionResult<String> {
        Ok(render::plist_version_string(&self.version_parts(format)?))
    }

    pub fn dylib_version_string(
        &mut self,
        format: Option<VersionFormat>,
    ) -> VersionResult<String> {
        Ok(render::dylib_version_string(&self.version_parts(format)?))
    }

    fn select(&self, format: Option<VersionFormat>) -> VersionFormat {
        format.unwrap_or(if self.config.old_format_default {
            VersionFormat::Legacy
        } else {
            VersionFormat::Current
        })
    }

    #[instrument(level = "debug", skip(self))]
    fn compute_legacy(&mut self) -> VersionResult<ResolvedVersion> {
        let platform = self.platform_version()?;
        let product = self.product_version()?;
        let commit = self.commit_identity().clone();

        let version = format!(
            "{}.{}.{}.{}",
            product.major,
            platform.build,
            commit.number,
            commit.short_hash()
        );
        debug!(%version, "legacy version");
        Ok(ResolvedVersion {
            parts: VersionParts::new(product.major, platform.build, commit.number),
            display: version,
            shape: VersionShape::Legacy,
        })
    }

    #[instrument(level = "debug", skip(self))]
    fn compute_current(&mut self) -> VersionResult<ResolvedVersion> {
        let platform = self.platform_version()?;
        let commit = self.commit_identity().clone();
        let upstream = format!("upstream-{}", platform.dotted());

        // Are we on the product branch cut for this upstream build, locally
        // or on the remote?
        let release_branch = platform.release_branch();
        let remote_release_branch = format!("{}/{}", self.config.remote, release_branch);
        let on_release_branch = self.repo.is_ancestor(HEAD, &release_branch)
            || self.repo.is_ancestor(HEAD, &remote_release_branch);

        let resolved = if on_release_branch {
            let branch = self.branch_version();
            ResolvedVersion {
                parts: VersionParts::new(platform.major, branch.feature, branch.change),
                display: format!(
                    "{}.{}.{}+{}+{}",
                    platform.major,
                    branch.feature,
                    branch.change,
                    commit.short_hash(),
                    upstream
                ),
                shape: VersionShape::Release,
            }
        } else {
            let branch_name = self.repo.resolve_branch_name(HEAD);
            let branch_name = branch_name.rsplit('/').next().unwrap_or(&branch_name);
            ResolvedVersion {
                parts: VersionParts::new(platform.major, 0, 0),
                display: format!(
                    "{}.0.0-{}.{}+{}+{}",
                    platform.major,
                    branch_name,
                    commit.number,
                    commit.short_hash(),
                    upstream
                ),
                shape: VersionShape::Development,
            }
        };
        debug!(version = %resolved.display, shape = ?resolved.shape, "current version");
        Ok(resolved)
    }
}
