mod sqlite;

pub use sqlite::SqliteStorage;

use std::path::PathBuf;

use crate::error::{Result, TallyError};

/// Default SQLite path: `~/.local/share/tally/tally.db`
pub fn default_db_path() -> Result<PathBuf> {
    dirs::data_dir()
        .map(|p| p.join("tally").join("tally.db"))
        .ok_or_else(|| TallyError::Config("cannot determine data directory".to_string()))
}
