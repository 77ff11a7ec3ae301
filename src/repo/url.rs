//! Repository URL classification.
//!
//! Repository locators arrive in several textual shapes (SSH shorthand,
//! HTTPS clone URL, HTTPS browse URL, HTTPS pull-request URL). Normalizing
//! them into [`RemoteParts`] / [`UrlParts`] lets the rest of the tool
//! compare repositories by identity instead of string equality.

use crate::error::{CiError, Result};
use crate::repo::RepoType;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteScheme {
    Git,
    Http,
    Https,
}

impl RemoteScheme {
    fn from_url_scheme(scheme: &str, url: &str) -> Result<Self> {
        match scheme {
            "http" => Ok(Self::Http),
            "https" => Ok(Self::Https),
            other => Err(CiError::UnsupportedScheme {
                url: url.to_string(),
                scheme: other.to_string(),
            }),
        }
    }
}

/// Canonical identity of a remote repository, regardless of how it was
/// spelled (SSH shorthand vs HTTPS URL).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteParts {
    pub scheme: RemoteScheme,
    pub host: String,
    pub org: String,
    pub repo_name: String,
}

impl RemoteParts {
    /// Parse an arbitrary remote locator into its structured parts.
    ///
    /// Accepts `git@host:org/repo[.git]`, `http(s)://host/org/repo.git`
    /// and `http(s)://host/org/repo/pull/N...` (the pull-request suffix is
    /// discarded here; callers needing the PR number use
    /// [`select_url_type`]).
    pub fn parse(url: &str) -> Result<Self> {
        if let Some(rest) = url.strip_prefix("git@") {
            let (host, path) = rest
                .rsplit_once(':')
                .ok_or_else(|| CiError::UnrecognizedUrlFormat(url.to_string()))?;
            let path = path.strip_suffix(".git").unwrap_or(path);
            let (org, repo_name) = path
                .split_once('/')
                .ok_or_else(|| CiError::MalformedPath(url.to_string()))?;
            Ok(Self {
                scheme: RemoteScheme::Git,
                host: host.to_string(),
                org: org.to_string(),
                repo_name: repo_name.to_string(),
            })
        } else if url.starts_with("http") && url.ends_with(".git") {
            let parsed = parse_standard_url(url)?;
            let scheme = RemoteScheme::from_url_scheme(parsed.scheme(), url)?;
            let host = host_of(&parsed, url)?;
            let path = parsed.path().trim_matches('/');
            let path = path.strip_suffix(".git").unwrap_or(path);
            let mut segments = path.split('/');
            match (segments.next(), segments.next(), segments.next()) {
                (Some(org), Some(repo_name), None) if !org.is_empty() && !repo_name.is_empty() => {
                    Ok(Self {
                        scheme,
                        host,
                        org: org.to_string(),
                        repo_name: repo_name.to_string(),
                    })
                }
                _ => Err(CiError::MalformedPath(url.to_string())),
            }
        } else if url.starts_with("http") && url.contains("pull/") {
            let parsed = parse_standard_url(url)?;
            let scheme = RemoteScheme::from_url_scheme(parsed.scheme(), url)?;
            let host = host_of(&parsed, url)?;
            let path = parsed.path().trim_matches('/');
            let mut segments = path.splitn(3, '/');
            match (segments.next(), segments.next(), segments.next()) {
                (Some(org), Some(repo_name), Some(_rest)) => Ok(Self {
                    scheme,
                    host,
                    org: org.to_string(),
                    repo_name: repo_name.to_string(),
                }),
                _ => Err(CiError::MalformedPath(url.to_string())),
            }
        } else {
            Err(CiError::UnrecognizedUrlFormat(url.to_string()))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlType {
    GithubRepoUrl,
    GithubPullRequest,
}

/// Parsed view of a repository or pull-request browse URL.
///
/// `pull_request_number` is meaningful only when `url_type` is
/// [`UrlType::GithubPullRequest`]; otherwise it is zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlParts {
    pub url_type: UrlType,
    pub org: String,
    pub repo_name: String,
    pub pull_request_number: u64,
}

/// Classify a repository or pull-request URL for the given repository type.
///
/// Only remote repository types are supported; anything else fails with
/// [`CiError::UnsupportedRepoType`].
pub fn select_url_type(url: &str, repo_type: RepoType) -> Result<UrlParts> {
    if !matches!(repo_type, RepoType::GithubSsh | RepoType::GithubHttps) {
        return Err(CiError::UnsupportedRepoType(repo_type));
    }

    let path = url_path(url)?;
    let path = path.trim_matches('/');
    let mut segments = path.splitn(3, '/');
    let (Some(org), Some(repo_name)) = (segments.next(), segments.next()) else {
        return Err(CiError::MalformedPath(url.to_string()));
    };
    let repo_name = repo_name.strip_suffix(".git").unwrap_or(repo_name);

    match segments.next() {
        None => Ok(UrlParts {
            url_type: UrlType::GithubRepoUrl,
            org: org.to_string(),
            repo_name: repo_name.to_string(),
            pull_request_number: 0,
        }),
        Some(rest) if rest.starts_with("pull") => {
            // Explicit prefix removal: `pull/125/files` keeps its trailing
            // path and is rejected below as ambiguous.
            let after = rest
                .strip_prefix("pull/")
                .ok_or_else(|| CiError::UnsupportedUrlShape(url.to_string()))?;
            let digits_end =
                after.find(|c: char| !c.is_ascii_digit()).unwrap_or(after.len());
            let (digits, remainder) = after.split_at(digits_end);
            if digits.is_empty() || remainder.contains('/') {
                return Err(CiError::AmbiguousPullRequestPath(after.to_string()));
            }
            let pull_request_number = digits
                .parse()
                .map_err(|_| CiError::AmbiguousPullRequestPath(after.to_string()))?;
            Ok(UrlParts {
                url_type: UrlType::GithubPullRequest,
                org: org.to_string(),
                repo_name: repo_name.to_string(),
                pull_request_number,
            })
        }
        Some(_) => Err(CiError::UnsupportedUrlShape(url.to_string())),
    }
}

/// Extract the org/repo path component from either URL spelling.
fn url_path(url: &str) -> Result<String> {
    if url.starts_with("http") {
        Ok(parse_standard_url(url)?.path().to_string())
    } else if url.starts_with("git@") {
        match url.rsplit_once(':') {
            Some((_, path)) => Ok(path.to_string()),
            None => Err(CiError::UnrecognizedUrlFormat(url.to_string())),
        }
    } else {
        Err(CiError::UnrecognizedUrlFormat(url.to_string()))
    }
}

fn parse_standard_url(url: &str) -> Result<Url> {
    Url::parse(url).map_err(|_| CiError::UnrecognizedUrlFormat(url.to_string()))
}

fn host_of(parsed: &Url, url: &str) -> Result<String> {
    parsed
        .host_str()
        .map(str::to_string)
        .ok_or_else(|| CiError::MalformedPath(url.to_string()))
}
