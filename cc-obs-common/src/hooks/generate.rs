//! The canonical set of observer hooks.

use super::command::{CLEAR_AND_LOG_COMMAND, LOG_COMMAND};
use super::document::{CommandEntry, HookMap, MatcherEntry};
use serde::{Deserialize, Serialize};

/// Lifecycle events cc-obs observes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HookEvent {
    PreToolUse,
    PostToolUse,
    PostToolUseFailure,
    Notification,
    SubagentStart,
    SubagentStop,
    Stop,
    SessionStart,
    UserPromptSubmit,
    PreCompact,
    PermissionRequest,
    TeammateIdle,
    TaskCompleted,
}

impl HookEvent {
    /// Every observed event, in installation order.
    pub const ALL: [HookEvent; 13] = [
        HookEvent::PreToolUse,
        HookEvent::PostToolUse,
        HookEvent::PostToolUseFailure,
        HookEvent::Notification,
        HookEvent::SubagentStart,
        HookEvent::SubagentStop,
        HookEvent::Stop,
        HookEvent::SessionStart,
        HookEvent::UserPromptSubmit,
        HookEvent::PreCompact,
        HookEvent::PermissionRequest,
        HookEvent::TeammateIdle,
        HookEvent::TaskCompleted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HookEvent::PreToolUse => "PreToolUse",
            HookEvent::PostToolUse => "PostToolUse",
            HookEvent::PostToolUseFailure => "PostToolUseFailure",
            HookEvent::Notification => "Notification",
            HookEvent::SubagentStart => "SubagentStart",
            HookEvent::SubagentStop => "SubagentStop",
            HookEvent::Stop => "Stop",
            HookEvent::SessionStart => "SessionStart",
            HookEvent::UserPromptSubmit => "UserPromptSubmit",
            HookEvent::PreCompact => "PreCompact",
            HookEvent::PermissionRequest => "PermissionRequest",
            HookEvent::TeammateIdle => "TeammateIdle",
            HookEvent::TaskCompleted => "TaskCompleted",
        }
    }

    /// Observer entries for this event.
    ///
    /// A fresh session clears the previous log before recording; resumed,
    /// cleared and compacted sessions keep their history.
    pub fn observer_entries(&self) -> Vec<MatcherEntry> {
        match self {
            HookEvent::SessionStart => vec![
                MatcherEntry::new("startup", vec![CommandEntry::command(CLEAR_AND_LOG_COMMAND)]),
                MatcherEntry::new(
                    "resume|clear|compact",
                    vec![CommandEntry::command(LOG_COMMAND)],
                ),
            ],
            _ => vec![MatcherEntry::new("", vec![CommandEntry::command(LOG_COMMAND)])],
        }
    }
}

impl std::fmt::Display for HookEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for HookEvent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HookEvent::ALL
            .into_iter()
            .find(|e| e.as_str() == s)
            .ok_or_else(|| format!("unknown hook event: {s}"))
    }
}

/// Observer entries for every supported event.
pub fn generate() -> HookMap {
    HookEvent::ALL
        .iter()
        .map(|event| (event.as_str().to_string(), event.observer_entries()))
        .collect()
}
