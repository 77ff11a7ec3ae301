//! Parsed view of a repository's own git configuration: remotes with their
//! classified URLs, branches with their upstream wiring.

use crate::error::Result;
use crate::repo::url::RemoteParts;
use git2::{BranchType, Repository};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A named remote with its classified URL and fetch refspec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitConfigRemote {
    pub name: String,
    pub parts: RemoteParts,
    pub fetch: String,
}

impl GitConfigRemote {
    /// Whether `url` refers to the same repository as this remote.
    ///
    /// Scheme is deliberately excluded: an SSH remote and an HTTPS remote
    /// for the same host/org/repo are the same repository.
    pub fn is_match(&self, url: &str) -> Result<bool> {
        let other = RemoteParts::parse(url)?;
        Ok(other.host == self.parts.host
            && other.org == self.parts.org
            && other.repo_name == self.parts.repo_name)
    }
}

/// A local branch together with the remote it tracks.
///
/// `remote` holds the remote's name; resolve it through
/// [`GitConfig::remote`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitConfigBranch {
    pub name: String,
    pub remote: String,
    pub merge: String,
}

#[derive(Debug, Clone)]
pub struct GitConfig {
    pub filepath: PathBuf,
    pub options: BTreeMap<String, String>,
    pub remotes: Vec<GitConfigRemote>,
    pub branches: Vec<GitConfigBranch>,
}

impl GitConfig {
    /// Read the configuration of the repository at `repo_path`.
    ///
    /// Remotes whose URL does not classify as a known remote shape (for
    /// example `file://` fixtures) are skipped rather than failing the
    /// whole load.
    pub fn load(repo_path: &Path) -> Result<Self> {
        let repo = Repository::open(repo_path)?;
        let filepath = repo.path().join("config");
        let config = repo.config()?.snapshot()?;

        let mut options = BTreeMap::new();
        let mut entries = config.entries(None)?;
        while let Some(entry) = entries.next() {
            let entry = entry?;
            if let (Some(name), Some(value)) = (entry.name(), entry.value()) {
                options.insert(name.to_string(), value.to_string());
            }
        }

        let mut remotes = Vec::new();
        for name in repo.remotes()?.iter().flatten() {
            let remote = repo.find_remote(name)?;
            let Some(url) = remote.url() else {
                continue;
            };
            let parts = match RemoteParts::parse(url) {
                Ok(parts) => parts,
                Err(err) => {
                    debug!("skipping remote '{name}' with unclassifiable URL {url}: {err}");
                    continue;
                }
            };
            let fetch = remote
                .fetch_refspecs()?
                .iter()
                .flatten()
                .next()
                .unwrap_or_default()
                .to_string();
            remotes.push(GitConfigRemote { name: name.to_string(), parts, fetch });
        }

        let mut branches = Vec::new();
        for branch in repo.branches(Some(BranchType::Local))? {
            let (branch, _) = branch?;
            let Some(name) = branch.name()?.map(str::to_string) else {
                continue;
            };
            let remote = config.get_string(&format!("branch.{name}.remote")).ok();
            let merge = config.get_string(&format!("branch.{name}.merge")).ok();
            if let (Some(remote), Some(merge)) = (remote, merge) {
                branches.push(GitConfigBranch { name, remote, merge });
            }
        }

        Ok(Self { filepath, options, remotes, branches })
    }

    /// Look up a remote by name.
    pub fn remote(&self, name: &str) -> Option<&GitConfigRemote> {
        self.remotes.iter().find(|remote| remote.name == name)
    }
}
