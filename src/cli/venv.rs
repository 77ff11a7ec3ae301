//! Venv subcommand: create the repository's virtual environment.

use anyhow::{Context, Result};
use clap::Args;
use std::path::{Path, PathBuf};

use super::SessionArgs;
use crate::exec::CommandRunner;
use crate::repo::RepoSession;

#[derive(Args)]
pub struct VenvArgs {
    #[command(flatten)]
    pub session: SessionArgs,

    /// Directory for the virtual environment, relative to the working tree
    #[arg(long, value_name = "DIR")]
    pub venv_dir: Option<PathBuf>,
}

pub fn run(args: VenvArgs) -> Result<()> {
    let defaults = args.session.defaults()?;
    let options = args.session.sync_options(&defaults);
    let venv_dir = args.venv_dir.unwrap_or_else(|| PathBuf::from(&defaults.venv_dir));

    let session = RepoSession::acquire(&args.session.repo, options)
        .with_context(|| format!("Failed opening repository {}", args.session.repo))?;

    super::with_session(session, |session| {
        ensure_venv(&crate::exec::ProcessRunner, session.path(), &venv_dir)?;
        println!("Virtual environment ready at {}", session.path().join(&venv_dir).display());
        Ok(())
    })
}

/// Create the venv under `workdir` if it does not exist yet.
pub(crate) fn ensure_venv(
    runner: &dyn CommandRunner,
    workdir: &Path,
    venv_dir: &Path,
) -> Result<()> {
    if workdir.join(venv_dir).exists() {
        return Ok(());
    }
    let venv = venv_dir.to_string_lossy().into_owned();
    runner
        .run(workdir, "python3", &["-m", "venv", venv.as_str()])
        .context("Failed creating virtual environment")?;
    Ok(())
}

/// Path of a tool inside the venv, relative to the working tree.
pub(crate) fn venv_tool(venv_dir: &Path, tool: &str) -> String {
    venv_dir.join("bin").join(tool).to_string_lossy().into_owned()
}
