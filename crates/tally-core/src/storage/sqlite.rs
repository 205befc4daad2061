use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::error::{Result, TallyError};
use crate::model::{Project, Prompt, Session};
use crate::report::{HistoryRow, ProjectStats};

/// SQLite-backed storage for projects, sessions, and prompts.
///
/// Each hook or CLI invocation is a short-lived process that opens its
/// own connection and releases it on drop, so the connection is held
/// directly with no sharing layer. Cross-invocation races are absorbed
/// at the storage layer: uniqueness constraints plus INSERT OR IGNORE,
/// with `busy_timeout` as the bounded wait for the write lock.
pub struct SqliteStorage {
    conn: Connection,
    path: PathBuf,
}

impl SqliteStorage {
    /// Open (or create) a file-backed SQLite database at `path`,
    /// creating parent directories as needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| TallyError::Storage(format!("failed to create db directory: {e}")))?;
        }
        let conn = Connection::open(&path)
            .map_err(|e| TallyError::Storage(format!("failed to open SQLite database: {e}")))?;

        Self::configure_and_init(conn, path)
    }

    /// Open an in-memory SQLite database (useful for tests).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| {
            TallyError::Storage(format!("failed to open in-memory SQLite database: {e}"))
        })?;

        Self::configure_and_init(conn, PathBuf::from(":memory:"))
    }

    /// Return the path this database was opened with (`:memory:` for in-memory).
    pub fn path(&self) -> &Path {
        &self.path
    }

    // ── helpers ────────────────────────────────────────────────────────

    /// Shared initialisation: pragmas + table creation.
    fn configure_and_init(conn: Connection, path: PathBuf) -> Result<Self> {
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA foreign_keys = ON;
             PRAGMA busy_timeout = 5000;",
        )
        .map_err(|e| TallyError::Storage(format!("failed to apply pragmas: {e}")))?;

        let storage = Self { conn, path };
        storage.create_tables()?;
        Ok(storage)
    }

    /// Create all tables and indexes (idempotent).
    fn create_tables(&self) -> Result<()> {
        self.conn
            .execute_batch(
                "
                CREATE TABLE IF NOT EXISTS projects (
                    id          TEXT PRIMARY KEY,
                    git_origin  TEXT,
                    directory   TEXT NOT NULL UNIQUE,
                    created_at  TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS sessions (
                    id          TEXT PRIMARY KEY,
                    project_id  TEXT NOT NULL REFERENCES projects(id),
                    agent_type  TEXT NOT NULL DEFAULT 'claude-code',
                    started_at  TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS prompts (
                    id              TEXT PRIMARY KEY,
                    session_id      TEXT NOT NULL REFERENCES sessions(id),
                    project_id      TEXT NOT NULL REFERENCES projects(id),
                    prompt_text     TEXT,
                    submitted_at    TEXT NOT NULL,
                    completed_at    TEXT,
                    git_hash_start  TEXT,
                    git_hash_end    TEXT,
                    agent_type      TEXT NOT NULL DEFAULT 'claude-code'
                );

                CREATE UNIQUE INDEX IF NOT EXISTS idx_projects_origin
                    ON projects(git_origin) WHERE git_origin IS NOT NULL;
                CREATE INDEX IF NOT EXISTS idx_prompts_session   ON prompts(session_id);
                CREATE INDEX IF NOT EXISTS idx_prompts_project   ON prompts(project_id);
                CREATE INDEX IF NOT EXISTS idx_prompts_submitted ON prompts(submitted_at);
                ",
            )
            .map_err(|e| TallyError::Storage(format!("failed to create tables: {e}")))?;

        Ok(())
    }

    // ── projects ───────────────────────────────────────────────────────

    pub fn insert_project(&self, project: &Project) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO projects (id, git_origin, directory, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    project.id.to_string(),
                    project.git_origin,
                    path_text(&project.directory),
                    timestamp_text(project.created_at),
                ],
            )
            .map_err(|e| TallyError::Storage(format!("insert project: {e}")))?;
        Ok(())
    }

    /// Update a project's directory in place. The identity never changes
    /// on a path move.
    pub fn update_project_directory(&self, id: Uuid, directory: &Path) -> Result<()> {
        self.conn
            .execute(
                "UPDATE projects SET directory = ?1 WHERE id = ?2",
                params![path_text(directory), id.to_string()],
            )
            .map_err(|e| TallyError::Storage(format!("update project directory: {e}")))?;
        Ok(())
    }

    pub fn project_by_origin(&self, origin: &str) -> Result<Option<Project>> {
        self.conn
            .query_row(
                "SELECT id, git_origin, directory, created_at
                 FROM projects WHERE git_origin = ?1",
                params![origin],
                project_from_row,
            )
            .optional()
            .map_err(|e| TallyError::Storage(format!("query project by origin: {e}")))
    }

    pub fn project_by_directory(&self, directory: &Path) -> Result<Option<Project>> {
        self.conn
            .query_row(
                "SELECT id, git_origin, directory, created_at
                 FROM projects WHERE directory = ?1",
                params![path_text(directory)],
                project_from_row,
            )
            .optional()
            .map_err(|e| TallyError::Storage(format!("query project by directory: {e}")))
    }

    // ── sessions ───────────────────────────────────────────────────────

    /// Idempotent session creation. A session id that already exists is
    /// left untouched: no duplicate row, no error. This single
    /// conditional insert (rather than check-then-insert) is what makes
    /// concurrent hook invocations for the same session safe.
    pub fn insert_session_if_absent(&self, session: &Session) -> Result<()> {
        self.conn
            .execute(
                "INSERT OR IGNORE INTO sessions (id, project_id, agent_type, started_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    session.id,
                    session.project_id.to_string(),
                    session.agent_type,
                    timestamp_text(session.started_at),
                ],
            )
            .map_err(|e| TallyError::Storage(format!("insert session: {e}")))?;
        Ok(())
    }

    // ── prompts ────────────────────────────────────────────────────────

    pub fn insert_prompt(&self, prompt: &Prompt) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO prompts
                     (id, session_id, project_id, prompt_text, submitted_at,
                      completed_at, git_hash_start, git_hash_end, agent_type)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    prompt.id.to_string(),
                    prompt.session_id,
                    prompt.project_id.to_string(),
                    prompt.prompt_text,
                    timestamp_text(prompt.submitted_at),
                    prompt.completed_at.map(timestamp_text),
                    prompt.git_hash_start,
                    prompt.git_hash_end,
                    prompt.agent_type,
                ],
            )
            .map_err(|e| TallyError::Storage(format!("insert prompt: {e}")))?;
        Ok(())
    }

    /// Close the most recently submitted open prompt in a session.
    ///
    /// Returns the number of rows updated: 1 when an open prompt was
    /// closed, 0 when the session had none (which callers treat as a
    /// silent no-op). If several prompts are somehow open at once, only
    /// the newest is closed.
    pub fn complete_latest_open_prompt(
        &self,
        session_id: &str,
        completed_at: DateTime<Utc>,
        git_hash_end: Option<&str>,
    ) -> Result<usize> {
        self.conn
            .execute(
                "UPDATE prompts
                 SET completed_at = ?1,
                     git_hash_end = ?2
                 WHERE id = (
                     SELECT id FROM prompts
                     WHERE session_id = ?3 AND completed_at IS NULL
                     ORDER BY submitted_at DESC
                     LIMIT 1
                 )",
                params![timestamp_text(completed_at), git_hash_end, session_id],
            )
            .map_err(|e| TallyError::Storage(format!("complete prompt: {e}")))
    }

    /// All prompts recorded for a session, oldest first.
    pub fn prompts_for_session(&self, session_id: &str) -> Result<Vec<Prompt>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, session_id, project_id, prompt_text, submitted_at,
                        completed_at, git_hash_start, git_hash_end, agent_type
                 FROM prompts
                 WHERE session_id = ?1
                 ORDER BY submitted_at ASC",
            )
            .map_err(|e| TallyError::Storage(format!("prepare session prompts: {e}")))?;
        let rows = stmt
            .query_map(params![session_id], prompt_from_row)
            .map_err(|e| TallyError::Storage(format!("query session prompts: {e}")))?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| TallyError::Storage(format!("read session prompts: {e}")))
    }

    // ── reports ────────────────────────────────────────────────────────

    /// Aggregate working-time statistics for a project.
    pub fn project_stats(&self, project_id: Uuid) -> Result<ProjectStats> {
        self.conn
            .query_row(
                "SELECT
                     COUNT(*),
                     COUNT(completed_at),
                     COUNT(DISTINCT session_id),
                     COALESCE(SUM(
                         CASE WHEN completed_at IS NOT NULL
                         THEN (julianday(completed_at) - julianday(submitted_at)) * 86400.0
                         ELSE 0 END
                     ), 0),
                     COALESCE(MIN(DATE(submitted_at)), ''),
                     COALESCE(MAX(DATE(submitted_at)), '')
                 FROM prompts
                 WHERE project_id = ?1",
                params![project_id.to_string()],
                |row| {
                    Ok(ProjectStats {
                        total_prompts: row.get(0)?,
                        completed_prompts: row.get(1)?,
                        sessions: row.get(2)?,
                        total_seconds: row.get(3)?,
                        first_submit: empty_to_none(row.get(4)?),
                        last_submit: empty_to_none(row.get(5)?),
                    })
                },
            )
            .map_err(|e| TallyError::Storage(format!("query stats: {e}")))
    }

    /// Recent prompts for a project, newest first. Duration is in whole
    /// seconds, `None` for in-flight prompts.
    pub fn prompt_history(&self, project_id: Uuid, limit: usize) -> Result<Vec<HistoryRow>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT
                     strftime('%Y-%m-%d %H:%M:%S', submitted_at),
                     CASE
                         WHEN completed_at IS NULL THEN NULL
                         ELSE CAST(ROUND(
                             (julianday(completed_at) - julianday(submitted_at)) * 86400
                         ) AS INTEGER)
                     END,
                     COALESCE(prompt_text, '')
                 FROM prompts
                 WHERE project_id = ?1
                 ORDER BY submitted_at DESC
                 LIMIT ?2",
            )
            .map_err(|e| TallyError::Storage(format!("prepare history: {e}")))?;
        let rows = stmt
            .query_map(params![project_id.to_string(), limit as i64], |row| {
                Ok(HistoryRow {
                    submitted_at: row.get(0)?,
                    duration_secs: row.get(1)?,
                    prompt_text: row.get(2)?,
                })
            })
            .map_err(|e| TallyError::Storage(format!("query history: {e}")))?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| TallyError::Storage(format!("read history: {e}")))
    }
}

/// RFC 3339 UTC text with fixed microsecond width, so lexicographic
/// ordering in SQL matches chronological ordering.
fn timestamp_text(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn path_text(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

fn empty_to_none(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

fn project_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Project> {
    Ok(Project {
        id: parse_uuid(row, 0)?,
        git_origin: row.get(1)?,
        directory: PathBuf::from(row.get::<_, String>(2)?),
        created_at: parse_timestamp(row, 3)?,
    })
}

fn prompt_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Prompt> {
    let completed_at: Option<String> = row.get(5)?;
    Ok(Prompt {
        id: parse_uuid(row, 0)?,
        session_id: row.get(1)?,
        project_id: parse_uuid(row, 2)?,
        prompt_text: row.get(3)?,
        submitted_at: parse_timestamp(row, 4)?,
        completed_at: completed_at
            .map(|s| parse_timestamp_text(&s, 5))
            .transpose()?,
        git_hash_start: row.get(6)?,
        git_hash_end: row.get(7)?,
        agent_type: row.get(8)?,
    })
}

fn parse_uuid(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<Uuid> {
    let raw: String = row.get(idx)?;
    Uuid::parse_str(&raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn parse_timestamp(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    parse_timestamp_text(&raw, idx)
}

fn parse_timestamp_text(raw: &str, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}
