//! Best-effort git metadata queries.
//!
//! Everything here shells out to `git` and treats any failure — git not
//! installed, not a repository, no commits, no remote — as an empty
//! result rather than an error. Recording must never fail just because
//! a directory has no usable git metadata.

use std::path::{Path, PathBuf};
use std::process::Command;

/// Whether `dir` is inside a git repository.
pub fn is_repo(dir: &Path) -> bool {
    Command::new("git")
        .args(["rev-parse", "--git-dir"])
        .current_dir(dir)
        .output()
        .map(|out| out.status.success())
        .unwrap_or(false)
}

/// Top-level directory of the repository containing `dir`, symlinks
/// resolved when possible.
pub fn repo_root(dir: &Path) -> Option<PathBuf> {
    let out = run_git(dir, &["rev-parse", "--show-toplevel"])?;
    let root = PathBuf::from(out);
    Some(std::fs::canonicalize(&root).unwrap_or(root))
}

/// Current HEAD commit hash. `None` when `dir` is not a repository or
/// no commits exist yet.
pub fn head_hash(dir: &Path) -> Option<String> {
    run_git(dir, &["rev-parse", "HEAD"])
}

/// URL of the `origin` remote, if configured.
pub fn origin_url(dir: &Path) -> Option<String> {
    run_git(dir, &["remote", "get-url", "origin"])
}

fn run_git(dir: &Path, args: &[&str]) -> Option<String> {
    let out = match Command::new("git").args(args).current_dir(dir).output() {
        Ok(out) => out,
        Err(e) => {
            tracing::debug!("git {args:?} failed to spawn: {e}");
            return None;
        }
    };
    if !out.status.success() {
        return None;
    }
    let text = String::from_utf8_lossy(&out.stdout).trim().to_string();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}
