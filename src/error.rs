//! Error kinds surfaced by the CI core.

use crate::repo::RepoType;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CiError {
    #[error("invalid repository path: {0}")]
    InvalidRepoPath(String),

    #[error("unrecognized repository URL format: {0}")]
    UnrecognizedUrlFormat(String),

    #[error("unsupported scheme '{scheme}' in URL {url}")]
    UnsupportedScheme { url: String, scheme: String },

    #[error("malformed repository path in {0}: expected org/repo")]
    MalformedPath(String),

    #[error("unable to parse pull request number from '{0}'")]
    AmbiguousPullRequestPath(String),

    #[error("unsupported URL shape: {0}")]
    UnsupportedUrlShape(String),

    #[error("unsupported repository type: {0}")]
    UnsupportedRepoType(RepoType),

    #[error("failed cloning {url}")]
    CloneFailed { url: String, source: git2::Error },

    #[error("failed pushing to remote '{remote}'")]
    PushFailed { remote: String, source: git2::Error },

    #[error("'{0}' is not implemented for the base repository session")]
    NotImplemented(&'static str),

    #[error("git error: {0}")]
    Git(#[from] git2::Error),
}

pub type Result<T> = std::result::Result<T, CiError>;
