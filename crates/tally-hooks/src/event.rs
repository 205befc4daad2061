use std::path::PathBuf;

use anyhow::{bail, Context};
use serde::Deserialize;
use tally_core::model::{EventKind, HookInput};

/// JSON payload Claude Code sends to hooks on stdin.
///
/// Fields vary by event type — `prompt` is only present on
/// UserPromptSubmit events.
#[derive(Debug, Clone, Deserialize)]
pub struct ClaudeCodePayload {
    pub session_id: String,
    pub cwd: String,
    pub hook_event_name: String,
    /// Present on UserPromptSubmit events — the user's prompt text.
    #[serde(default)]
    pub prompt: Option<String>,
    /// Present on Stop events; part of the wire format but unused here.
    #[serde(default)]
    #[allow(dead_code)]
    pub stop_hook_active: Option<bool>,
    #[serde(default)]
    #[allow(dead_code)]
    pub transcript_path: Option<String>,
}

/// Result of normalizing a raw hook payload.
pub enum EventIntent {
    /// A prompt boundary worth recording.
    Record(HookInput),
    /// Not a prompt boundary — ignore without touching the database.
    Skip { reason: String },
}

/// Normalize a raw payload for the named agent type.
/// Add new agents by writing a parser and registering it here.
pub fn parse_event(agent_type: &str, raw: &str) -> anyhow::Result<EventIntent> {
    match agent_type {
        "claude-code" => parse_claude_code(raw),
        other => bail!("unknown agent type {other:?}"),
    }
}

fn parse_claude_code(raw: &str) -> anyhow::Result<EventIntent> {
    let payload: ClaudeCodePayload =
        serde_json::from_str(raw).context("decode claude-code payload")?;

    if payload.session_id.is_empty() {
        bail!("missing session_id in hook payload");
    }
    if payload.cwd.is_empty() {
        bail!("missing cwd in hook payload");
    }

    let kind = match payload.hook_event_name.as_str() {
        "UserPromptSubmit" => EventKind::PromptStart,
        "Stop" => EventKind::PromptEnd,
        other => {
            return Ok(EventIntent::Skip {
                reason: format!("unhandled event type: {other}"),
            })
        }
    };

    let prompt_text = match kind {
        EventKind::PromptStart => payload.prompt,
        EventKind::PromptEnd => None,
    };

    Ok(EventIntent::Record(HookInput {
        session_id: payload.session_id,
        cwd: PathBuf::from(payload.cwd),
        prompt_text,
        agent_type: "claude-code".to_string(),
        kind,
    }))
}
