//! Simple command-execution interface for the external tools the CI
//! commands orchestrate (python, pip). Keeping it behind a trait lets the
//! thin command layer be exercised without spawning real processes.

use anyhow::{Context, Result};
use std::path::Path;
use std::process::Command;
use tracing::debug;

#[derive(Debug)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

pub trait CommandRunner {
    fn run(&self, cwd: &Path, program: &str, args: &[&str]) -> Result<CommandOutput>;
}

/// Runs commands as blocking child processes.
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    fn run(&self, cwd: &Path, program: &str, args: &[&str]) -> Result<CommandOutput> {
        debug!("running {program} {} in {}", args.join(" "), cwd.display());
        let output = Command::new(program)
            .args(args)
            .current_dir(cwd)
            .output()
            .with_context(|| format!("Failed spawning {program}"))?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        if !output.status.success() {
            anyhow::bail!("{program} {} failed: {stderr}", args.join(" "));
        }
        Ok(CommandOutput { stdout, stderr })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn run_captures_stdout() {
        let tmp = TempDir::new().expect("tmp");
        let output = ProcessRunner.run(tmp.path(), "echo", &["hello"]).expect("run");
        assert_eq!(output.stdout.trim(), "hello");
    }

    #[test]
    fn run_reports_nonzero_exit_with_stderr() {
        let tmp = TempDir::new().expect("tmp");
        let err = ProcessRunner.run(tmp.path(), "ls", &["/no/such/path"]).unwrap_err();
        assert!(err.to_string().contains("ls"), "got {err}");
    }

    #[test]
    fn run_reports_missing_program() {
        let tmp = TempDir::new().expect("tmp");
        let err =
            ProcessRunner.run(tmp.path(), "definitely-not-a-real-tool", &[]).unwrap_err();
        assert!(err.to_string().contains("Failed spawning"), "got {err}");
    }
}
