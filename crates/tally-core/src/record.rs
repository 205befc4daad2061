//! Prompt lifecycle recording.
//!
//! Correlates paired start/end hook events into one prompt row per
//! conversational turn. The recorder keeps no state between invocations
//! — each call is a fresh process — so "which prompt does this end event
//! close" is an ordered query against the store, not an in-memory
//! pointer.

use chrono::Utc;

use crate::error::Result;
use crate::gitx;
use crate::model::{HookInput, Prompt, Session};
use crate::project;
use crate::storage::SqliteStorage;

/// Record a prompt-start event.
///
/// Resolves (or creates) the project for the event's working directory,
/// creates the session row if this session id is unseen, stamps the
/// current HEAD hash, and inserts a new open prompt row. Any storage
/// failure aborts the whole operation; every step is safe to re-run on
/// redelivery.
pub fn record_prompt_start(storage: &SqliteStorage, input: &HookInput) -> Result<()> {
    input.validate()?;

    let project = project::upsert(storage, &input.cwd)?;

    let session = Session::new(
        input.session_id.clone(),
        project.id,
        input.agent_type.clone(),
    );
    storage.insert_session_if_absent(&session)?;

    let git_hash_start = gitx::head_hash(&input.cwd);
    let prompt_text = input
        .prompt_text
        .clone()
        .filter(|text| !text.trim().is_empty());

    let prompt = Prompt::new(
        input.session_id.clone(),
        project.id,
        prompt_text,
        git_hash_start,
        input.agent_type.clone(),
    );
    storage.insert_prompt(&prompt)?;

    tracing::debug!(
        "opened prompt {} in session {} for project {}",
        prompt.id,
        prompt.session_id,
        project.short_name()
    );
    Ok(())
}

/// Record a prompt-end event.
///
/// Stamps the current HEAD hash and closes the most recently submitted
/// open prompt in the session. An end event with no open prompt —
/// session never started, or already closed — updates zero rows and is
/// success, not an error: the terminating hook fires unconditionally on
/// the agent side and must never make the caller fail.
pub fn record_prompt_end(storage: &SqliteStorage, input: &HookInput) -> Result<()> {
    input.validate()?;

    let git_hash_end = gitx::head_hash(&input.cwd);
    let updated =
        storage.complete_latest_open_prompt(&input.session_id, Utc::now(), git_hash_end.as_deref())?;

    if updated == 0 {
        tracing::debug!(
            "no open prompt in session {}, ignoring end event",
            input.session_id
        );
    }
    Ok(())
}
