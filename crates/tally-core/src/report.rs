//! Aggregated report data for the CLI readers.

use serde::Serialize;

/// Working-time statistics for one project.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectStats {
    pub total_prompts: i64,
    pub completed_prompts: i64,
    pub sessions: i64,
    /// Summed wall-clock seconds across completed prompts.
    pub total_seconds: f64,
    /// Date of the earliest recorded prompt (YYYY-MM-DD).
    pub first_submit: Option<String>,
    /// Date of the latest recorded prompt (YYYY-MM-DD).
    pub last_submit: Option<String>,
}

impl ProjectStats {
    pub fn average_seconds(&self) -> Option<f64> {
        if self.completed_prompts > 0 {
            Some(self.total_seconds / self.completed_prompts as f64)
        } else {
            None
        }
    }

    /// Active period for display: a single date, or "first to last".
    pub fn period(&self) -> Option<String> {
        match (&self.first_submit, &self.last_submit) {
            (Some(first), Some(last)) if first == last => Some(first.clone()),
            (Some(first), Some(last)) => Some(format!("{first} to {last}")),
            _ => None,
        }
    }
}

/// One line of prompt history, newest first.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryRow {
    pub submitted_at: String,
    /// `None` while the prompt is in-flight.
    pub duration_secs: Option<i64>,
    pub prompt_text: String,
}

impl HistoryRow {
    /// Duration for display; in-flight prompts show "-".
    pub fn display_duration(&self) -> String {
        match self.duration_secs {
            Some(secs) => format_duration(secs as f64),
            None => "-".to_string(),
        }
    }
}

/// Human-readable duration, truncated to whole seconds.
/// Zero or negative (clock skew) displays as "0s".
pub fn format_duration(seconds: f64) -> String {
    if seconds <= 0.0 {
        return "0s".to_string();
    }
    let total = seconds as i64;
    let h = total / 3600;
    let m = (total % 3600) / 60;
    let s = total % 60;

    if h > 0 {
        format!("{h}h {m}m {s}s")
    } else if m > 0 {
        format!("{m}m {s}s")
    } else {
        format!("{s}s")
    }
}

/// Truncate to `max_chars` characters for single-line table output,
/// replacing the tail with "..." when cut.
pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let keep = max_chars.saturating_sub(3);
    let cut: String = text.chars().take(keep).collect();
    format!("{cut}...")
}
