//! Replicate subcommand: clone a repository or pull request locally and
//! report its parsed identity. The working tree is left in place for the
//! surrounding CI harness.

use anyhow::{Context, Result};
use clap::Args;

use super::SessionArgs;
use crate::repo::{select_repo_type, select_url_type, RepoSession, RepoType, UrlType};

#[derive(Args)]
pub struct ReplicateArgs {
    #[command(flatten)]
    pub session: SessionArgs,
}

pub fn run(args: ReplicateArgs) -> Result<()> {
    let defaults = args.session.defaults()?;
    let options = args.session.sync_options(&defaults);

    let (_, repo_type) = select_repo_type(&args.session.repo)
        .with_context(|| format!("Failed classifying {}", args.session.repo))?;
    let parts = select_url_type(&args.session.repo, repo_type)
        .with_context(|| format!("Failed parsing {}", args.session.repo))?;

    // Browse and pull-request URLs are not clone URLs; rebuild the clone
    // locator from the parsed identity.
    let clone_url = match repo_type {
        RepoType::GithubSsh => format!("git@github.com:{}/{}.git", parts.org, parts.repo_name),
        _ => format!("https://github.com/{}/{}.git", parts.org, parts.repo_name),
    };

    let session = RepoSession::acquire(&clone_url, options)
        .with_context(|| format!("Failed cloning {clone_url}"))?;

    super::with_session(session, |session| {
        // Without an explicit --branch the upstream follows whatever
        // branch the clone checked out, not the configured default.
        if args.session.branch.is_none() {
            session.track_head_branch()?;
        }

        match parts.url_type {
            UrlType::GithubRepoUrl => println!(
                "Replicated {}/{} into {}",
                parts.org,
                parts.repo_name,
                session.path().display()
            ),
            UrlType::GithubPullRequest => println!(
                "Replicated {}/{} (pull request #{}) into {}",
                parts.org,
                parts.repo_name,
                parts.pull_request_number,
                session.path().display()
            ),
        }
        Ok(())
    })
}
