//! Read-only queries against a version-control checkout.
//!
//! Every query is best-effort. A failed command yields a sentinel (`"Unknown"`,
//! `0` or an empty list) so that version display degrades instead of breaking
//! the build.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, warn};

/// Returned by string queries that could not be answered.
pub const UNKNOWN: &str = "Unknown";

/// What `changed_files` should diff.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChangeSet<'a> {
    /// Working tree against the index.
    Unstaged,
    /// Index against `HEAD`.
    Staged,
    Commit(&'a str),
}

impl<'a> ChangeSet<'a> {
    /// Maps the `unstaged` and `staged` pseudo-refs; anything else is a commit.
    pub fn parse(reference: &'a str) -> Self {
        match reference {
            "unstaged" => ChangeSet::Unstaged,
            "staged" => ChangeSet::Staged,
            commit => ChangeSet::Commit(commit),
        }
    }
}

pub trait RepositoryQuery {
    /// True iff `ancestor` is reachable from `descendant` through parent links.
    fn is_ancestor(&self, ancestor: &str, descendant: &str) -> bool;

    /// Full commit id for `reference`, or [`UNKNOWN`].
    fn resolve_hash(&self, reference: &str) -> String;

    /// Best-effort symbolic name for `reference`, or [`UNKNOWN`].
    fn resolve_branch_name(&self, reference: &str) -> String;

    /// Number of commits reachable from `reference`, `0` on failure.
    fn count_commits(&self, reference: &str) -> u32;

    fn changed_files(&self, change: ChangeSet<'_>) -> Vec<String>;

    /// Commits on `branch` that are not on `upstream`, oldest first.
    fn branch_commits(&self, branch: &str, upstream: &str) -> Vec<String>;

    fn remote_url(&self, _remote: &str) -> String {
        UNKNOWN.to_string()
    }
}

/// Returns true if `path` is the root of a git checkout.
pub fn is_checkout(path: &Path) -> bool {
    path.join(".git").exists()
}

/// [`RepositoryQuery`] backed by the `git` command line.
#[derive(Clone, Debug)]
pub struct GitRepository {
    path: PathBuf,
    git: String,
}

struct GitOutput {
    success: bool,
    stdout: String,
}

impl GitRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_executable(path, "git")
    }

    pub fn with_executable(path: impl Into<PathBuf>, git: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            git: git.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn run(&self, args: &[&str]) -> Option<GitOutput> {
        debug!(path = %self.path.display(), ?args, "git");
        let output = match Command::new(&self.git)
            .args(args)
            .current_dir(&self.path)
            .output()
        {
            Ok(output) => output,
            Err(err) => {
                warn!(git = %self.git, error = %err, "failed to spawn git");
                return None;
            }
        };
        Some(GitOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).replace("\r\n", "\n"),
        })
    }

    /// Trimmed stdout, or `None` when the command failed or produced nothing.
    fn stdout(&self, args: &[&str]) -> Option<String> {
        let output = self.run(args)?;
        if !output.success {
            return None;
        }
        let trimmed = output.stdout.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }
}

impl RepositoryQuery for GitRepository {
    fn is_ancestor(&self, ancestor: &str, descendant: &str) -> bool {
        self.run(&["merge-base", "--is-ancestor", ancestor, descendant])
            .map(|output| output.success)
            .unwrap_or(false)
    }

    fn resolve_hash(&self, reference: &str) -> String {
        match self.stdout(&["rev-parse", reference]) {
            Some(hash) => hash,
            None => {
                warn!(reference, "could not resolve commit hash");
                UNKNOWN.to_string()
            }
        }
    }

    fn resolve_branch_name(&self, reference: &str) -> String {
        if let Some(name) = self.stdout(&["rev-parse", "--abbrev-ref", reference]) {
            if name != "HEAD" {
                return name;
            }
        }
        // Detached HEAD: take the last ref decorating the commit instead.
        self.stdout(&["log", "-n", "1", "--pretty=%d", reference])
            .and_then(|decoration| last_decoration(&decoration))
            .unwrap_or_else(|| {
                warn!(reference, "could not resolve branch name");
                UNKNOWN.to_string()
            })
    }

    fn count_commits(&self, reference: &str) -> u32 {
        self.stdout(&["rev-list", "--count", reference])
            .and_then(|count| count.parse().ok())
            .unwrap_or_else(|| {
                warn!(reference, "could not count commits");
                0
            })
    }

    fn changed_files(&self, change: ChangeSet<'_>) -> Vec<String> {
        let output = match change {
            ChangeSet::Unstaged => self.stdout(&["diff", "--name-only"]),
            ChangeSet::Staged => self.stdout(&["diff", "--name-only", "--cached"]),
            ChangeSet::Commit(hash) => {
                self.stdout(&["diff-tree", "--no-commit-id", "--name-only", "-r", hash])
            }
        };
        output
            .map(|files| files.lines().map(str::to_string).collect())
            .unwrap_or_default()
    }

    fn branch_commits(&self, branch: &str, upstream: &str) -> Vec<String> {
        self.stdout(&["cherry", upstream, branch])
            .map(|listing| parse_cherry(&listing))
            .unwrap_or_default()
    }

    fn remote_url(&self, remote: &str) -> String {
        let key = format!("remote.{remote}.url");
        self.stdout(&["config", "--get", key.as_str()])
            .unwrap_or_else(|| UNKNOWN.to_string())
    }
}

/// Strips the `+ ` / `- ` markers from `git cherry` output, keeping order.
pub fn parse_cherry(listing: &str) -> Vec<String> {
    listing
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            line.strip_prefix("+ ")
                .or_else(|| line.strip_prefix("- "))
                .unwrap_or(line)
                .to_string()
        })
        .collect()
}

/// Last entry of a `%d` decoration such as `(HEAD, origin/3729, 3729)`.
pub fn last_decoration(decoration: &str) -> Option<String> {
    let inner = decoration
        .trim()
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))?;
    inner
        .rsplit(", ")
        .next()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}
