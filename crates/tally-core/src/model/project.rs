use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A deduplicated identity for a tracked codebase.
///
/// Keyed primarily by git remote origin, secondarily by canonical
/// directory path. The `id` is assigned once at creation and never
/// changes, even when the directory moves (re-clone to a new path).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: Uuid,
    /// Remote origin URL; `None` when the directory has no git remote.
    pub git_origin: Option<String>,
    /// Canonical absolute path, symlinks resolved.
    pub directory: PathBuf,
    pub created_at: DateTime<Utc>,
}

impl Project {
    pub fn new(directory: PathBuf, git_origin: Option<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            git_origin,
            directory,
            created_at: Utc::now(),
        }
    }

    /// Human-readable name: the directory basename.
    pub fn short_name(&self) -> String {
        self.directory
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string()
    }

    /// Cleaned-up origin for display:
    /// `git@github.com:user/repo.git` → `github.com/user/repo`.
    pub fn display_origin(&self) -> Option<String> {
        let origin = self.git_origin.as_deref()?;
        Some(clean_origin(origin))
    }
}

fn clean_origin(origin: &str) -> String {
    let mut s = origin.to_string();
    if let Some(rest) = s.strip_prefix("git@") {
        s = rest.replacen(':', "/", 1);
    }
    for prefix in ["https://", "http://", "ssh://"] {
        if let Some(rest) = s.strip_prefix(prefix) {
            s = rest.to_string();
        }
    }
    if let Some(rest) = s.strip_suffix(".git") {
        s = rest.to_string();
    }
    s
}
