//! Repository location: decide whether a locator names a local checkout or
//! a remote that needs cloning, and where the working tree lives.

use crate::error::{CiError, Result};
use git2::Repository;
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

/// How a repository was referenced. Determines which synchronization
/// strategy applies at session close.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepoType {
    Local,
    GithubSsh,
    GithubHttps,
}

impl fmt::Display for RepoType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Local => "local-path",
            Self::GithubSsh => "github-ssh",
            Self::GithubHttps => "github-https",
        };
        f.write_str(name)
    }
}

/// Resolve a repository locator to a working directory and [`RepoType`].
///
/// An existing path must already be a git working tree and is returned
/// unchanged. GitHub locators get a fresh unique temporary path that is not
/// created here; cloning happens when the session is acquired.
pub fn select_repo_type(repo_path: &str) -> Result<(PathBuf, RepoType)> {
    let path = Path::new(repo_path);
    if path.exists() {
        match Repository::open(path) {
            Ok(_) => Ok((path.to_path_buf(), RepoType::Local)),
            Err(err) => {
                debug!("opening {repo_path} as a git repository failed: {err}");
                Err(CiError::InvalidRepoPath(format!(
                    "{repo_path} is not a git repository"
                )))
            }
        }
    } else if repo_path.starts_with("git@github.com") {
        Ok((build_temp_repo_dir(), RepoType::GithubSsh))
    } else if repo_path.starts_with("https://github.com") {
        Ok((build_temp_repo_dir(), RepoType::GithubHttps))
    } else {
        debug!("{repo_path} does not exist on the local filesystem");
        Err(CiError::InvalidRepoPath(format!("{repo_path} does not exist")))
    }
}

fn build_temp_repo_dir() -> PathBuf {
    let nanos = SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_nanos()).unwrap_or(0);
    let pid = std::process::id();
    env::temp_dir().join(format!("nbcollection-ci-{pid}-{nanos}"))
}
