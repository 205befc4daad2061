use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One continuous agent invocation, grouping zero or more prompts.
///
/// The id is supplied by the external agent (an opaque string, not
/// generated here). A session belongs to exactly one project, fixed at
/// creation; it is never deleted and never explicitly closed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub project_id: Uuid,
    /// Which hook parser produced this session, e.g. "claude-code".
    pub agent_type: String,
    pub started_at: DateTime<Utc>,
}

impl Session {
    pub fn new(id: String, project_id: Uuid, agent_type: String) -> Self {
        Self {
            id,
            project_id,
            agent_type,
            started_at: Utc::now(),
        }
    }
}
