use std::path::PathBuf;

use chrono::Duration;

use super::*;

#[test]
fn test_project_short_name() {
    let project = Project::new(PathBuf::from("/home/user/projects/widget"), None);
    assert_eq!(project.short_name(), "widget");
}

#[test]
fn test_project_id_stable_fields() {
    let project = Project::new(
        PathBuf::from("/tmp/repo"),
        Some("git@github.com:user/repo.git".into()),
    );
    assert_eq!(project.directory, PathBuf::from("/tmp/repo"));
    assert_eq!(
        project.git_origin.as_deref(),
        Some("git@github.com:user/repo.git")
    );
}

#[test]
fn test_display_origin_ssh() {
    let project = Project::new(
        PathBuf::from("/tmp/repo"),
        Some("git@github.com:user/repo.git".into()),
    );
    assert_eq!(project.display_origin().as_deref(), Some("github.com/user/repo"));
}

#[test]
fn test_display_origin_https() {
    let project = Project::new(
        PathBuf::from("/tmp/repo"),
        Some("https://github.com/user/repo.git".into()),
    );
    assert_eq!(project.display_origin().as_deref(), Some("github.com/user/repo"));
}

#[test]
fn test_display_origin_none() {
    let project = Project::new(PathBuf::from("/tmp/repo"), None);
    assert!(project.display_origin().is_none());
}

#[test]
fn test_prompt_starts_open() {
    let prompt = Prompt::new(
        "session-1".into(),
        uuid::Uuid::now_v7(),
        Some("do things".into()),
        None,
        "claude-code".into(),
    );
    assert!(prompt.completed_at.is_none());
    assert!(prompt.duration_secs().is_none());
}

#[test]
fn test_prompt_duration() {
    let mut prompt = Prompt::new(
        "session-1".into(),
        uuid::Uuid::now_v7(),
        None,
        None,
        "claude-code".into(),
    );
    prompt.completed_at = Some(prompt.submitted_at + Duration::seconds(125));
    assert_eq!(prompt.duration_secs(), Some(125));
}

#[test]
fn test_hook_input_validate() {
    let input = HookInput {
        session_id: "s1".into(),
        cwd: PathBuf::from("/tmp"),
        prompt_text: None,
        agent_type: "claude-code".into(),
        kind: EventKind::PromptStart,
    };
    assert!(input.validate().is_ok());
}

#[test]
fn test_hook_input_rejects_blank_session() {
    let input = HookInput {
        session_id: "   ".into(),
        cwd: PathBuf::from("/tmp"),
        prompt_text: None,
        agent_type: "claude-code".into(),
        kind: EventKind::PromptEnd,
    };
    assert!(input.validate().is_err());
}

#[test]
fn test_hook_input_rejects_empty_cwd() {
    let input = HookInput {
        session_id: "s1".into(),
        cwd: PathBuf::new(),
        prompt_text: None,
        agent_type: "claude-code".into(),
        kind: EventKind::PromptStart,
    };
    assert!(input.validate().is_err());
}

#[test]
fn test_event_kind_roundtrip() {
    for kind in [EventKind::PromptStart, EventKind::PromptEnd] {
        let json = serde_json::to_string(&kind).unwrap();
        let parsed: EventKind = serde_json::from_str(&json).unwrap();
        assert_eq!(kind, parsed);
    }
}
