//! Project identity resolution.
//!
//! Dedupes working directories into stable project identities. Matching
//! is origin-first with a directory fallback: a repository re-cloned to
//! a new path keeps its identity through the origin URL, while path
//! matching alone would have created a spurious duplicate. The two
//! lookups are independent because either key may be absent.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::gitx;
use crate::model::Project;
use crate::storage::SqliteStorage;

/// Canonical project directory and origin for a working directory.
///
/// Absolutizes the path and resolves symlinks, then substitutes the
/// repository root when inside a git repo, so subdirectories of one
/// repo all map to the same project.
pub fn resolve(cwd: &Path) -> (PathBuf, Option<String>) {
    let mut dir = canonical_dir(cwd);
    let mut origin = None;

    if gitx::is_repo(&dir) {
        if let Some(root) = gitx::repo_root(&dir) {
            dir = root;
        }
        origin = gitx::origin_url(&dir);
    }
    (dir, origin)
}

/// Find or create the project for `cwd`.
///
/// On an origin match whose stored directory differs from the freshly
/// resolved one, the directory is updated in place; the project id
/// never changes on a path move. At most one row is inserted or updated
/// per call, and nothing is ever deleted.
pub fn upsert(storage: &SqliteStorage, cwd: &Path) -> Result<Project> {
    let (dir, origin) = resolve(cwd);

    if let Some(origin) = &origin {
        if let Some(mut project) = storage.project_by_origin(origin)? {
            if project.directory != dir {
                storage.update_project_directory(project.id, &dir)?;
                tracing::debug!(
                    "project {} moved: {} -> {}",
                    project.id,
                    project.directory.display(),
                    dir.display()
                );
                project.directory = dir;
            }
            return Ok(project);
        }
    }

    if let Some(project) = storage.project_by_directory(&dir)? {
        return Ok(project);
    }

    let project = Project::new(dir, origin);
    storage.insert_project(&project)?;
    Ok(project)
}

/// Read-only lookup with the same origin-first precedence.
/// `Ok(None)` when the directory has never been tracked.
pub fn find(storage: &SqliteStorage, cwd: &Path) -> Result<Option<Project>> {
    let (dir, origin) = resolve(cwd);

    if let Some(origin) = &origin {
        if let Some(project) = storage.project_by_origin(origin)? {
            return Ok(Some(project));
        }
    }
    storage.project_by_directory(&dir)
}

/// Absolutize and resolve symlinks, best-effort. A vanished directory
/// falls back to its absolute form rather than erroring — resolution
/// must not fail merely because `stat` fails on a deleted path.
fn canonical_dir(path: &Path) -> PathBuf {
    let abs = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };
    std::fs::canonicalize(&abs).unwrap_or(abs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::Command;

    fn git(dir: &Path, args: &[&str]) {
        let out = Command::new("git")
            .args(args)
            .current_dir(dir)
            .output()
            .expect("failed to run git");
        assert!(
            out.status.success(),
            "git {args:?}: {}",
            String::from_utf8_lossy(&out.stderr)
        );
    }

    fn init_repo(dir: &Path, origin: Option<&str>) {
        git(dir, &["init"]);
        if let Some(url) = origin {
            git(dir, &["remote", "add", "origin", url]);
        }
    }

    #[test]
    fn upsert_then_find_same_identity() {
        let storage = SqliteStorage::open_in_memory().unwrap();
        let tmp = tempfile::tempdir().unwrap();

        let first = upsert(&storage, tmp.path()).unwrap();
        let second = upsert(&storage, tmp.path()).unwrap();
        assert_eq!(first.id, second.id);

        let found = find(&storage, tmp.path()).unwrap().expect("should exist");
        assert_eq!(found.id, first.id);
    }

    #[test]
    fn find_unknown_directory_is_none() {
        let storage = SqliteStorage::open_in_memory().unwrap();
        let tmp = tempfile::tempdir().unwrap();
        assert!(find(&storage, tmp.path()).unwrap().is_none());
    }

    #[test]
    fn subdirectories_share_one_identity() {
        let storage = SqliteStorage::open_in_memory().unwrap();
        let tmp = tempfile::tempdir().unwrap();
        init_repo(tmp.path(), None);
        let sub = tmp.path().join("src").join("deep");
        std::fs::create_dir_all(&sub).unwrap();

        let from_root = upsert(&storage, tmp.path()).unwrap();
        let from_sub = upsert(&storage, &sub).unwrap();
        assert_eq!(from_root.id, from_sub.id);
        assert_eq!(from_root.directory, from_sub.directory);
    }

    #[test]
    fn origin_match_survives_reclone() {
        let storage = SqliteStorage::open_in_memory().unwrap();
        let origin = "git@example.com:user/widget.git";

        let original = tempfile::tempdir().unwrap();
        init_repo(original.path(), Some(origin));
        let first = upsert(&storage, original.path()).unwrap();
        assert_eq!(first.git_origin.as_deref(), Some(origin));

        // Same repo cloned to a new path: identity survives, directory moves.
        let relocated = tempfile::tempdir().unwrap();
        init_repo(relocated.path(), Some(origin));
        let second = upsert(&storage, relocated.path()).unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(
            second.directory,
            std::fs::canonicalize(relocated.path()).unwrap()
        );

        let stored = storage.project_by_origin(origin).unwrap().unwrap();
        assert_eq!(stored.directory, second.directory);
    }

    #[test]
    fn find_matches_origin_before_directory() {
        let storage = SqliteStorage::open_in_memory().unwrap();
        let origin = "git@example.com:user/widget.git";

        let original = tempfile::tempdir().unwrap();
        init_repo(original.path(), Some(origin));
        let created = upsert(&storage, original.path()).unwrap();

        // A fresh clone at a path the store has never seen still finds
        // the project, without creating anything.
        let relocated = tempfile::tempdir().unwrap();
        init_repo(relocated.path(), Some(origin));
        let found = find(&storage, relocated.path()).unwrap().unwrap();
        assert_eq!(found.id, created.id);
        // Read-only: stored directory untouched.
        assert_eq!(
            found.directory,
            std::fs::canonicalize(original.path()).unwrap()
        );
    }

    #[test]
    fn vanished_directory_is_acceptable() {
        let storage = SqliteStorage::open_in_memory().unwrap();
        let tmp = tempfile::tempdir().unwrap();
        let gone = tmp.path().join("already-deleted");

        let project = upsert(&storage, &gone).unwrap();
        assert_eq!(project.directory, gone);

        let again = upsert(&storage, &gone).unwrap();
        assert_eq!(project.id, again.id);
    }
}
