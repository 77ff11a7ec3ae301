//! Uninstall subcommand: remove notebook dependencies from the
//! repository's environment.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use super::venv::venv_tool;
use super::SessionArgs;
use crate::exec::{CommandRunner, ProcessRunner};
use crate::repo::RepoSession;

#[derive(Args)]
pub struct UninstallArgs {
    #[command(flatten)]
    pub session: SessionArgs,

    /// Requirements file to uninstall, relative to the working tree
    #[arg(long, value_name = "FILE")]
    pub requirements: Option<PathBuf>,

    /// Directory of the virtual environment, relative to the working tree
    #[arg(long, value_name = "DIR")]
    pub venv_dir: Option<PathBuf>,

    /// Generated files to sync back upstream, relative to the working tree
    /// (repeatable or comma-separated)
    #[arg(long = "record", value_name = "PATHS", value_delimiter = ',', num_args = 1..)]
    pub record: Vec<PathBuf>,
}

pub fn run(args: UninstallArgs) -> Result<()> {
    let defaults = args.session.defaults()?;
    let options = args.session.sync_options(&defaults);
    let venv_dir = args.venv_dir.unwrap_or_else(|| PathBuf::from(&defaults.venv_dir));
    let requirements = args
        .requirements
        .unwrap_or_else(|| PathBuf::from(&defaults.requirements))
        .to_string_lossy()
        .into_owned();

    let session = RepoSession::acquire(&args.session.repo, options)
        .with_context(|| format!("Failed opening repository {}", args.session.repo))?;

    super::with_session(session, |session| {
        let pip = venv_tool(&venv_dir, "pip");
        ProcessRunner
            .run(session.path(), &pip, &["uninstall", "-r", requirements.as_str(), "-y"])
            .with_context(|| format!("Failed uninstalling {requirements}"))?;
        for path in &args.record {
            session.record_altered(path);
        }
        println!("Uninstalled dependencies from {requirements}");
        Ok(())
    })
}
