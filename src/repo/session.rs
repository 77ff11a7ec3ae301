//! Scoped repository session: clone on acquire, stage/commit/push on close.

use crate::error::{CiError, Result};
use crate::repo::locate::{select_repo_type, RepoType};
use git2::build::RepoBuilder;
use git2::{Cred, FetchOptions, PushOptions, RemoteCallbacks, Repository, Signature};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Provenance message used for commits created by the CI integration.
const SYNC_COMMIT_MESSAGE: &str =
    "Added by CircleCI Integration from https://github.com/adrn/nbcollection";

/// Which upstream the session diffs and pushes against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOptions {
    pub remote_name: String,
    pub branch: String,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self { remote_name: "origin".to_string(), branch: "main".to_string() }
    }
}

/// A repository held for the duration of one CI command.
///
/// Acquisition resolves the locator and clones remote repositories into a
/// fresh temporary directory. Work inside the scope records altered files;
/// [`RepoSession::close`] stages them and pushes a commit if anything
/// changed against the tracked upstream.
///
/// Local repositories are never auto-committed or pushed: closing a
/// `Local` session is a no-op by design, even when files were recorded.
pub struct RepoSession {
    path: PathBuf,
    url: Option<String>,
    repo_type: RepoType,
    altered_files: Vec<PathBuf>,
    options: SyncOptions,
    closed: bool,
}

impl RepoSession {
    /// Locate the repository named by `locator` and make it present locally,
    /// cloning if the locator is a GitHub URL.
    ///
    /// Clone failures are fatal and not retried; the temporary directory
    /// allocated for the clone is removed before the error is returned.
    pub fn acquire(locator: &str, options: SyncOptions) -> Result<Self> {
        let (path, repo_type) = select_repo_type(locator)?;
        let url = match repo_type {
            RepoType::Local => None,
            RepoType::GithubSsh | RepoType::GithubHttps => {
                info!("Cloning {locator} into {}", path.display());
                clone_repo(locator, &path)?;
                Some(locator.to_string())
            }
        };
        Ok(Self { path, url, repo_type, altered_files: Vec::new(), options, closed: false })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn repo_type(&self) -> RepoType {
        self.repo_type
    }

    pub fn altered_files(&self) -> &[PathBuf] {
        &self.altered_files
    }

    /// Record a working-tree path (relative to the repository root) that a
    /// collaborator created or modified during the scope.
    pub fn record_altered(&mut self, path: impl Into<PathBuf>) {
        self.altered_files.push(path.into());
    }

    /// Point the sync upstream at the branch the working tree has checked
    /// out. Useful after cloning a repository whose default branch is not
    /// the configured one.
    pub fn track_head_branch(&mut self) -> Result<()> {
        let repo = Repository::open(&self.path)?;
        let head = repo.head()?;
        if let Some(branch) = head.shorthand() {
            self.options.branch = branch.to_string();
        }
        Ok(())
    }

    /// Release the session, syncing recorded work back to the remote.
    ///
    /// For `Local` repositories this is a no-op. For GitHub repositories the
    /// recorded files are staged and, if the index differs from the tracked
    /// upstream or any files were recorded, exactly one commit is created
    /// and pushed. Push failures are fatal and leave the local commit in
    /// place for manual recovery.
    pub fn close(mut self) -> Result<()> {
        self.closed = true;
        match self.repo_type {
            RepoType::Local => Ok(()),
            RepoType::GithubSsh | RepoType::GithubHttps => {
                sync_repo_remote(&self.path, &self.altered_files, &self.options)
            }
        }
    }

    /// Installing dependencies is supplied by concrete collaborators; the
    /// base session only reports it as unimplemented.
    pub fn install(&self) -> Result<()> {
        Err(CiError::NotImplemented("install"))
    }

    pub fn uninstall(&self) -> Result<()> {
        Err(CiError::NotImplemented("uninstall"))
    }
}

impl Drop for RepoSession {
    fn drop(&mut self) {
        // Backstop for sessions leaked without close(), e.g. a panic in
        // the scope. No network I/O here; the leaked working tree keeps
        // its local changes for manual recovery.
        if !self.closed && self.repo_type != RepoType::Local {
            warn!(
                "repository session for {} dropped without close(); changes were not pushed",
                self.path.display()
            );
        }
    }
}

#[cfg(test)]
impl RepoSession {
    /// Build a session over an existing working tree without going through
    /// the locator, so remote-type sync behavior is testable offline.
    pub(crate) fn for_tests(path: PathBuf, repo_type: RepoType, options: SyncOptions) -> Self {
        let url = match repo_type {
            RepoType::Local => None,
            RepoType::GithubSsh | RepoType::GithubHttps => {
                Some("https://github.com/org/repo".to_string())
            }
        };
        Self { path, url, repo_type, altered_files: Vec::new(), options, closed: false }
    }
}

fn clone_repo(url: &str, dest: &Path) -> Result<()> {
    let mut callbacks = RemoteCallbacks::new();
    callbacks.credentials(|_url, username_from_url, _allowed_types| {
        Cred::ssh_key_from_agent(username_from_url.unwrap_or("git"))
    });
    let mut fetch_options = FetchOptions::new();
    fetch_options.remote_callbacks(callbacks);

    let mut builder = RepoBuilder::new();
    builder.fetch_options(fetch_options);

    if let Err(source) = builder.clone(url, dest) {
        let _ = std::fs::remove_dir_all(dest);
        return Err(CiError::CloneFailed { url: url.to_string(), source });
    }
    Ok(())
}

/// Stage `altered_files`, then commit and push if the index differs from
/// `<remote>/<branch>` or any files were recorded.
fn sync_repo_remote(path: &Path, altered_files: &[PathBuf], options: &SyncOptions) -> Result<()> {
    let repo = Repository::open(path)?;
    let mut index = repo.index()?;
    for file in altered_files {
        index.add_path(file)?;
    }
    index.write()?;

    let upstream = format!("refs/remotes/{}/{}", options.remote_name, options.branch);
    let upstream_tree = repo.find_reference(&upstream)?.peel_to_tree()?;
    let diff = repo.diff_tree_to_index(Some(&upstream_tree), Some(&index), None)?;
    let delta_count = diff.deltas().count();

    if delta_count == 0 && altered_files.is_empty() {
        debug!("nothing to sync against {upstream}");
        return Ok(());
    }

    info!("Syncing {delta_count} staged change(s) back to '{}'", options.remote_name);
    let signature = Signature::now("nbcollection-ci", "nbcollection-ci@noreply.github.com")?;
    let tree = repo.find_tree(index.write_tree()?)?;
    let parent = repo.head()?.peel_to_commit()?;
    repo.commit(Some("HEAD"), &signature, &signature, SYNC_COMMIT_MESSAGE, &tree, &[&parent])?;

    let head = repo.head()?;
    let branch = head.shorthand().unwrap_or(&options.branch);
    let refspec = format!("refs/heads/{branch}:refs/heads/{branch}");

    let mut callbacks = RemoteCallbacks::new();
    callbacks.credentials(|_url, username_from_url, _allowed_types| {
        Cred::ssh_key_from_agent(username_from_url.unwrap_or("git"))
    });
    let mut push_options = PushOptions::new();
    push_options.remote_callbacks(callbacks);

    let mut remote = repo.find_remote(&options.remote_name)?;
    remote.push(&[refspec.as_str()], Some(&mut push_options)).map_err(|source| {
        CiError::PushFailed { remote: options.remote_name.clone(), source }
    })?;
    Ok(())
}
