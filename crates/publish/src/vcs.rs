//! Version control sync for the publish root.

use inkpipe_core::{AppError, AppResult};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Stages, commits and pushes published files.
pub trait VersionControl: Send + Sync {
    fn add(&self, paths: &[&Path]) -> AppResult<()>;
    fn commit(&self, message: &str) -> AppResult<()>;
    fn push(&self) -> AppResult<()>;
}

/// `VersionControl` backed by the `git` executable.
#[derive(Debug, Clone)]
pub struct GitCli {
    workdir: PathBuf,
}

impl GitCli {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
        }
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    fn run_git(&self, args: &[&str]) -> AppResult<String> {
        let subcommand = args.first().copied().unwrap_or("");
        tracing::debug!("git {} (in {:?})", args.join(" "), self.workdir);

        let output = Command::new("git")
            .current_dir(&self.workdir)
            .args(args)
            .output()
            .map_err(|e| AppError::Vcs(format!("failed to execute git {}: {}", subcommand, e)))?;

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if output.status.success() {
            return Ok(stdout);
        }

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        Err(AppError::Vcs(format!(
            "git {} failed (exit code {}): {}",
            subcommand,
            output.status.code().unwrap_or(-1),
            if stderr.is_empty() { stdout } else { stderr }
        )))
    }
}

impl VersionControl for GitCli {
    fn add(&self, paths: &[&Path]) -> AppResult<()> {
        let paths: Vec<String> = paths
            .iter()
            .map(|p| p.to_string_lossy().into_owned())
            .collect();
        let mut args = vec!["add", "--"];
        args.extend(paths.iter().map(String::as_str));
        self.run_git(&args).map(|_| ())
    }

    fn commit(&self, message: &str) -> AppResult<()> {
        self.run_git(&["commit", "-m", message]).map(|_| ())
    }

    fn push(&self) -> AppResult<()> {
        self.run_git(&["push"]).map(|_| ())
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_git_outside_repository_is_vcs_error() {
        let temp = TempDir::new().unwrap();
        let git = GitCli::new(temp.path());

        match git.add(&[temp.path()]) {
            Err(AppError::Vcs(msg)) => assert!(msg.contains("git add")),
            other => panic!("expected vcs error, got {:?}", other),
        }
    }

    #[test]
    fn test_recording_fake_fails_selected_op() {
        let vcs = fake::RecordingVcs::failing_on("push");
        vcs.add(&[Path::new("docs")]).unwrap();
        vcs.commit("msg").unwrap();
        assert!(matches!(vcs.push(), Err(AppError::Vcs(_))));
        assert_eq!(vcs.calls(), vec!["add docs", "commit msg", "push"]);
    }
}
