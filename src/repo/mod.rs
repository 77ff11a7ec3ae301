//! Repository classification, location, and the session lifecycle.

pub mod git_config;
pub mod locate;
pub mod session;
pub mod url;

pub use git_config::{GitConfig, GitConfigBranch, GitConfigRemote};
pub use locate::{select_repo_type, RepoType};
pub use session::{RepoSession, SyncOptions};
pub use url::{select_url_type, RemoteParts, RemoteScheme, UrlParts, UrlType};
