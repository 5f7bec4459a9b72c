//! Release-branch version counters.
//!
//! Builds on a release branch are ordered by `(feature, change)`. `feature`
//! advances whenever a commit touches the API marker file, which also resets
//! `change`; every other commit bumps `change`. Two builds with the same
//! `feature` are API-compatible.

use serde::Serialize;
use tracing::debug;

use crate::repo::{ChangeSet, RepositoryQuery};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BranchVersion {
    pub feature: u32,
    pub change: u32,
}

impl BranchVersion {
    /// Applies one commit.
    pub fn advance(self, touches_marker: bool) -> Self {
        if touches_marker {
            Self {
                feature: self.feature + 1,
                change: 0,
            }
        } else {
            Self {
                feature: self.feature,
                change: self.change + 1,
            }
        }
    }

    /// Folds `commits` (oldest first) starting from `(0, 0)`.
    pub fn accumulate<I, F>(commits: I, mut touches_marker: F) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
        F: FnMut(&str) -> bool,
    {
        commits
            .into_iter()
            .fold(Self::default(), |state, commit| {
                state.advance(touches_marker(commit.as_ref()))
            })
    }
}

/// Substring match, so renamed or nested copies of the marker count too.
pub fn touches_marker<I>(files: I, marker: &str) -> bool
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    files.into_iter().any(|file| file.as_ref().contains(marker))
}

/// Walks the commits on `branch` that are not on `upstream`.
pub fn compute_branch_version<R>(
    repo: &R,
    branch: &str,
    upstream: &str,
    marker: &str,
) -> BranchVersion
where
    R: RepositoryQuery + ?Sized,
{
    let commits = repo.branch_commits(branch, upstream);
    let version = BranchVersion::accumulate(&commits, |commit| {
        touches_marker(repo.changed_files(ChangeSet::Commit(commit)), marker)
    });
    debug!(
        branch,
        upstream,
        commits = commits.len(),
        feature = version.feature,
        change = version.change,
        "branch version"
    );
    version
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_branch_is_zero() {
        let commits: [&str; 0] = [];
        assert_eq!(
            BranchVersion::accumulate(commits, |_| true),
            BranchVersion::default()
        );
    }

    #[test]
    fn plain_commits_only_bump_change() {
        let commits = ["a", "b", "c", "d"];
        let version = BranchVersion::accumulate(commits, |_| false);
        assert_eq!(version, BranchVersion { feature: 0, change: 4 });
    }

    #[test]
    fn marker_commit_resets_change() {
        let marked = ["b", "e"];
        let commits = ["a", "b", "c", "d", "e"];
        let is_marked = |commit: &str| marked.iter().any(|candidate| *candidate == commit);
        let version = BranchVersion::accumulate(commits, is_marked);
        assert_eq!(version, BranchVersion { feature: 2, change: 0 });

        let version = BranchVersion::accumulate(&commits[..4], is_marked);
        assert_eq!(version, BranchVersion { feature: 1, change: 2 });
    }

    #[test]
    fn counters_follow_the_predicate_step_by_step() {
        let flags = [false, true, false, false, true, true, false];
        let mut state = BranchVersion::default();
        for (index, flag) in flags.iter().copied().enumerate() {
            let next = state.advance(flag);
            assert!(next.feature >= state.feature, "feature decreased at {index}");
            if flag {
                assert_eq!(next.change, 0, "change not reset at {index}");
                assert_eq!(next.feature, state.feature + 1);
            } else {
                assert_eq!(next.change, state.change + 1);
                assert_eq!(next.feature, state.feature);
            }
            state = next;
        }
        assert_eq!(state, BranchVersion { feature: 3, change: 1 });
    }

    #[test]
    fn marker_match_is_a_substring_test() {
        let marker = "honey_api_hash.h";
        assert!(touches_marker(["include/honey_api_hash.h"], marker));
        assert!(touches_marker(
            ["README.md", "include/honey_api_hash.h.orig"],
            marker
        ));
        assert!(!touches_marker(["include/honey_version.h"], marker));
        assert!(!touches_marker(Vec::<String>::new(), marker));
    }
}
