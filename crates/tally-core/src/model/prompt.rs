use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One submit→complete cycle within a session.
///
/// Created on a prompt-start event and mutated exactly once on the
/// matching prompt-end event. A prompt whose end event never arrives
/// stays open indefinitely ("in-flight") and has no defined duration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prompt {
    pub id: Uuid,
    pub session_id: String,
    /// Denormalized so prompts can be queried without joining sessions.
    pub project_id: Uuid,
    /// Absent on rows recorded without prompt text.
    pub prompt_text: Option<String>,
    pub submitted_at: DateTime<Utc>,
    /// `None` while the prompt is open; set exactly once on completion.
    pub completed_at: Option<DateTime<Utc>>,
    /// HEAD commit at submit time; `None` outside a repo or before the
    /// first commit.
    pub git_hash_start: Option<String>,
    /// HEAD commit at completion time.
    pub git_hash_end: Option<String>,
    pub agent_type: String,
}

impl Prompt {
    pub fn new(
        session_id: String,
        project_id: Uuid,
        prompt_text: Option<String>,
        git_hash_start: Option<String>,
        agent_type: String,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            session_id,
            project_id,
            prompt_text,
            submitted_at: Utc::now(),
            completed_at: None,
            git_hash_start,
            git_hash_end: None,
            agent_type,
        }
    }

    /// Wall-clock duration in whole seconds, defined only once completed.
    /// Clock skew can make this negative; callers display that as "0s".
    pub fn duration_secs(&self) -> Option<i64> {
        self.completed_at
            .map(|done| (done - self.submitted_at).num_seconds())
    }
}
