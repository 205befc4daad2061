mod event;

use std::io::Read;
use std::process::ExitCode;

use tally_core::config::TallyConfig;
use tally_core::model::EventKind;
use tally_core::record;
use tally_core::storage::SqliteStorage;
use tracing::Level;

use crate::event::EventIntent;

/// Entry point for the tally-hooks binary.
///
/// Reads one agent hook event from stdin and records the prompt
/// boundary it marks. The agent type may be passed as the first
/// argument (default: "claude-code").
///
/// CRITICAL: Always exits 0. A non-zero exit could block the invoking
/// agent, and a failure to record must never do that.
fn main() -> ExitCode {
    // Set up stderr logging (hooks must not write to stdout)
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(Level::WARN)
        .compact()
        .init();

    if let Err(e) = run() {
        tracing::warn!("tally-hooks: {e:#}");
    }

    ExitCode::SUCCESS
}

fn run() -> anyhow::Result<()> {
    let agent_type = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "claude-code".to_string());

    let mut input = String::new();
    std::io::stdin().read_to_string(&mut input)?;

    let hook_input = match event::parse_event(&agent_type, &input)? {
        EventIntent::Record(input) => input,
        EventIntent::Skip { reason } => {
            tracing::debug!("skipping: {reason}");
            return Ok(());
        }
    };

    let config = TallyConfig::load(Some(&hook_input.cwd)).unwrap_or_default();
    if !config.capture.enabled {
        tracing::debug!("capture disabled, skipping");
        return Ok(());
    }

    let db_path = config.db_path(None)?;
    let storage = SqliteStorage::open(&db_path)?;

    match hook_input.kind {
        EventKind::PromptStart => record::record_prompt_start(&storage, &hook_input)?,
        EventKind::PromptEnd => record::record_prompt_end(&storage, &hook_input)?,
    }

    Ok(())
}
