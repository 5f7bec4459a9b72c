#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use honey_version::{ChangeSet, RepositoryQuery};
use tempfile::TempDir;

pub const UPSTREAM_74_0_3729_6: &str = "MAJOR=74\nMINOR=0\nBUILD=3729\nPATCH=6\n";
pub const UPSTREAM_74_0_3729_0: &str = "MAJOR=74\nMINOR=0\nBUILD=3729\nPATCH=0\n";
pub const PRODUCT_3: &str = "HONEYCOMB_MAJOR=3\n";

/// Repository double with fixed answers that records every query it serves.
#[derive(Debug, Default)]
pub struct FakeRepository {
    pub hash: String,
    pub commit_count: u32,
    pub branch_name: String,
    /// Refs that `HEAD` is an ancestor of.
    pub release_refs: Vec<String>,
    pub branch_commits: Vec<String>,
    pub changed: HashMap<String, Vec<String>>,
    queries: RefCell<Vec<String>>,
}

impl FakeRepository {
    pub fn new(hash: &str, commit_count: u32) -> Self {
        Self {
            hash: hash.to_string(),
            commit_count,
            branch_name: "HEAD".to_string(),
            ..Self::default()
        }
    }

    pub fn on_branch(mut self, name: &str) -> Self {
        self.branch_name = name.to_string();
        self
    }

    pub fn release_ref(mut self, reference: &str) -> Self {
        self.release_refs.push(reference.to_string());
        self
    }

    pub fn commit(mut self, hash: &str, files: &[&str]) -> Self {
        self.branch_commits.push(hash.to_string());
        self.changed.insert(
            hash.to_string(),
            files.iter().map(|file| file.to_string()).collect(),
        );
        self
    }

    pub fn query_count(&self) -> usize {
        self.queries.borrow().len()
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.borrow().clone()
    }

    pub fn count_of(&self, prefix: &str) -> usize {
        self.queries
            .borrow()
            .iter()
            .filter(|query| query.starts_with(prefix))
            .count()
    }

    fn record(&self, query: String) {
        self.queries.borrow_mut().push(query);
    }
}

impl RepositoryQuery for FakeRepository {
    fn is_ancestor(&self, ancestor: &str, descendant: &str) -> bool {
        self.record(format!("is_ancestor {ancestor} {descendant}"));
        ancestor == "HEAD" && self.release_refs.iter().any(|name| name == descendant)
    }

    fn resolve_hash(&self, reference: &str) -> String {
        self.record(format!("resolve_hash {reference}"));
        self.hash.clone()
    }

    fn resolve_branch_name(&self, reference: &str) -> String {
        self.record(format!("resolve_branch_name {reference}"));
        self.branch_name.clone()
    }

    fn count_commits(&self, reference: &str) -> u32 {
        self.record(format!("count_commits {reference}"));
        self.commit_count
    }

    fn changed_files(&self, change: ChangeSet<'_>) -> Vec<String> {
        self.record(format!("changed_files {change:?}"));
        match change {
            ChangeSet::Commit(hash) => self.changed.get(hash).cloned().unwrap_or_default(),
            ChangeSet::Staged | ChangeSet::Unstaged => Vec::new(),
        }
    }

    fn branch_commits(&self, branch: &str, upstream: &str) -> Vec<String> {
        self.record(format!("branch_commits {branch} {upstream}"));
        self.branch_commits.clone()
    }
}

/// Source root with `chrome/VERSION` and `honey/VERSION.in`.
/// `None` leaves the product manifest out.
pub fn checkout(upstream: &str, product: Option<&str>) -> TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    write_upstream(dir.path(), upstream);
    fs::create_dir_all(dir.path().join("honey")).expect("create product dir");
    if let Some(product) = product {
        fs::write(dir.path().join("honey").join("VERSION.in"), product)
            .expect("write product manifest");
    }
    dir
}

pub fn write_upstream(root: &Path, upstream: &str) {
    fs::create_dir_all(root.join("chrome")).expect("create chrome dir");
    fs::write(root.join("chrome").join("VERSION"), upstream).expect("write upstream manifest");
}
