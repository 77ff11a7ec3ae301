//! Command-line interface for nbcollection-ci
//!
//! Provides the `install`, `uninstall`, `venv`, and `replicate` subcommands.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::{load_defaults, Defaults};
use crate::repo::{RepoSession, SyncOptions};

mod install;
mod replicate;
mod uninstall;
mod venv;

/// Manage notebook repositories for CI: install, uninstall, venv, replicate
#[derive(Parser)]
#[command(name = "nbcollection-ci")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (sets log level to DEBUG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Install notebook dependencies into the repository's environment
    Install(install::InstallArgs),

    /// Remove notebook dependencies from the repository's environment
    Uninstall(uninstall::UninstallArgs),

    /// Create a virtual environment for the repository
    Venv(venv::VenvArgs),

    /// Clone a repository or pull request locally and report its identity
    Replicate(replicate::ReplicateArgs),
}

/// Arguments shared by every subcommand that opens a repository session.
#[derive(Args)]
pub struct SessionArgs {
    /// Local path or GitHub URL of the notebook repository
    #[arg(value_name = "REPO")]
    pub repo: String,

    /// Remote generated files are pushed to
    #[arg(long, value_name = "NAME", env = "NBCOLLECTION_CI_REMOTE")]
    pub remote_name: Option<String>,

    /// Branch the push is diffed against
    #[arg(long, value_name = "BRANCH", env = "NBCOLLECTION_CI_BRANCH")]
    pub branch: Option<String>,

    /// Path to a defaults file (nbcollection-ci.toml)
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl SessionArgs {
    fn defaults(&self) -> Result<Defaults> {
        load_defaults(Path::new("."), self.config.as_deref())
    }

    fn sync_options(&self, defaults: &Defaults) -> SyncOptions {
        SyncOptions {
            remote_name: self
                .remote_name
                .clone()
                .unwrap_or_else(|| defaults.remote_name.clone()),
            branch: self.branch.clone().unwrap_or_else(|| defaults.branch.clone()),
        }
    }
}

/// Run `work` inside an acquired session, then release the session on
/// every exit path.
///
/// Release still happens when the in-scope work fails, so partially
/// completed work is staged and pushed; a release-time failure is logged
/// rather than allowed to mask the original error.
pub(crate) fn with_session<F>(mut session: RepoSession, work: F) -> Result<()>
where
    F: FnOnce(&mut RepoSession) -> Result<()>,
{
    let work_result = work(&mut session);
    let close_result = session.close();
    match work_result {
        Ok(()) => Ok(close_result?),
        Err(err) => {
            if let Err(close_err) = close_result {
                tracing::error!("syncing the repository during release also failed: {close_err}");
            }
            Err(err)
        }
    }
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // Wire verbose flag to the tracing log level.
    // RUST_LOG in the environment always takes precedence; --verbose falls back to DEBUG.
    let filter = if cli.verbose {
        EnvFilter::from_default_env().add_directive(Level::DEBUG.into())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    match cli.command {
        Commands::Install(args) => install::run(args),
        Commands::Uninstall(args) => uninstall::run(args),
        Commands::Venv(args) => venv::run(args),
        Commands::Replicate(args) => replicate::run(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repo::RepoType;
    use git2::{Oid, Repository, Signature};
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    struct Fixture {
        _tmp: TempDir,
        work: PathBuf,
        origin: PathBuf,
        initial: Oid,
    }

    fn fixture() -> Fixture {
        let tmp = TempDir::new().expect("tmp");
        let work = tmp.path().join("work");
        let origin = tmp.path().join("origin.git");

        let mut init_opts = git2::RepositoryInitOptions::new();
        init_opts.initial_head("main");
        let repo = Repository::init_opts(&work, &init_opts).expect("init work");
        fs::write(work.join("README.md"), "notebooks\n").expect("write");
        let mut index = repo.index().expect("index");
        index.add_path(Path::new("README.md")).expect("add");
        index.write().expect("write index");
        let tree = repo.find_tree(index.write_tree().expect("tree id")).expect("tree");
        let signature = Signature::now("tester", "tester@example.com").expect("sig");
        let initial = repo
            .commit(Some("HEAD"), &signature, &signature, "initial", &tree, &[])
            .expect("commit");

        let mut bare_opts = git2::RepositoryInitOptions::new();
        bare_opts.bare(true).initial_head("main");
        Repository::init_opts(&origin, &bare_opts).expect("init origin");
        let origin_url = origin.to_str().expect("utf8 origin path").to_string();
        let mut remote = repo.remote("origin", &origin_url).expect("add origin");
        remote.push(&["refs/heads/main:refs/heads/main"], None).expect("seed push");
        repo.reference("refs/remotes/origin/main", initial, true, "test setup")
            .expect("tracking ref");

        Fixture { _tmp: tmp, work, origin, initial }
    }

    fn head_of(path: &Path) -> Oid {
        let repo = Repository::open(path).expect("open");
        repo.refname_to_id("refs/heads/main").expect("main")
    }

    #[test]
    fn failed_work_still_releases_and_syncs_the_session() {
        let fx = fixture();
        let session = RepoSession::for_tests(
            fx.work.clone(),
            RepoType::GithubHttps,
            SyncOptions::default(),
        );
        fs::write(fx.work.join("partial.ipynb"), "{}\n").expect("write notebook");

        let err = with_session(session, |session| {
            session.record_altered("partial.ipynb");
            anyhow::bail!("dependency install failed")
        })
        .unwrap_err();

        assert_eq!(err.to_string(), "dependency install failed");
        let pushed = head_of(&fx.origin);
        assert_ne!(pushed, fx.initial, "partial work must still be committed");
        assert_eq!(pushed, head_of(&fx.work), "and pushed to the remote");
    }

    #[test]
    fn release_failure_does_not_mask_the_in_scope_error() {
        let fx = fixture();
        let options =
            SyncOptions { remote_name: "origin".to_string(), branch: "missing".to_string() };
        let session = RepoSession::for_tests(fx.work.clone(), RepoType::GithubHttps, options);
        fs::write(fx.work.join("partial.ipynb"), "{}\n").expect("write notebook");

        let err = with_session(session, |session| {
            session.record_altered("partial.ipynb");
            anyhow::bail!("dependency install failed")
        })
        .unwrap_err();

        assert_eq!(err.to_string(), "dependency install failed");
    }

    #[test]
    fn release_failure_surfaces_when_work_succeeded() {
        let fx = fixture();
        let options =
            SyncOptions { remote_name: "origin".to_string(), branch: "missing".to_string() };
        let session = RepoSession::for_tests(fx.work.clone(), RepoType::GithubHttps, options);
        fs::write(fx.work.join("generated.ipynb"), "{}\n").expect("write notebook");

        let err = with_session(session, |session| {
            session.record_altered("generated.ipynb");
            Ok(())
        })
        .unwrap_err();

        assert!(err.to_string().contains("git error"), "got {err}");
    }

    #[test]
    fn local_sessions_release_as_a_no_op() {
        let fx = fixture();
        let session =
            RepoSession::for_tests(fx.work.clone(), RepoType::Local, SyncOptions::default());

        with_session(session, |session| {
            session.record_altered("partial.ipynb");
            Ok(())
        })
        .expect("release");

        assert_eq!(head_of(&fx.work), fx.initial);
        assert_eq!(head_of(&fx.origin), fx.initial);
    }
}
