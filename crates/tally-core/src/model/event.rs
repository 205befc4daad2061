use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TallyError};

/// Whether a hook event marks the start or the end of a prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    PromptStart,
    PromptEnd,
}

/// A hook event normalized from an agent's wire format.
///
/// Session id and working directory are mandatory; the hook parsers
/// reject payloads missing either before the recorder runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HookInput {
    pub session_id: String,
    pub cwd: PathBuf,
    /// Empty on prompt-end events.
    pub prompt_text: Option<String>,
    pub agent_type: String,
    pub kind: EventKind,
}

impl HookInput {
    pub fn validate(&self) -> Result<()> {
        if self.session_id.trim().is_empty() {
            return Err(TallyError::InvalidInput(
                "session id cannot be empty".into(),
            ));
        }
        if self.cwd.as_os_str().is_empty() {
            return Err(TallyError::InvalidInput(
                "working directory cannot be empty".into(),
            ));
        }
        Ok(())
    }
}
