//! Matcher-entry classification.
//!
//! Classification is recomputed from the command strings on every call; it
//! is never stored alongside the entry.

use super::command::{is_observer_command, is_wrapped};
use super::document::MatcherEntry;
use serde::Serialize;

/// Who owns a matcher entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryClass {
    /// Generated by cc-obs; replaced on install, dropped on uninstall.
    PureObserver,
    /// A foreign entry already carrying the wrap prefix.
    WrappedForeign,
    /// A foreign entry cc-obs has not touched.
    PlainForeign,
}

impl std::fmt::Display for EntryClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryClass::PureObserver => write!(f, "observer"),
            EntryClass::WrappedForeign => write!(f, "wrapped"),
            EntryClass::PlainForeign => write!(f, "foreign"),
        }
    }
}

/// Classify an entry by its `command` entries.
///
/// Any observer command makes the whole entry an observer entry, even when it
/// also holds wrapped commands. Otherwise any wrapped command makes it
/// wrapped-foreign; mixed wrapped/plain entries count as wrapped.
pub fn classify(entry: &MatcherEntry) -> EntryClass {
    if entry.commands().any(is_observer_command) {
        EntryClass::PureObserver
    } else if entry.commands().any(is_wrapped) {
        EntryClass::WrappedForeign
    } else {
        EntryClass::PlainForeign
    }
}
