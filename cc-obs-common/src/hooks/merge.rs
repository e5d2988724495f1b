//! Merge and unmerge of observer hooks.
//!
//! Both directions are pure transforms over [`HookMap`]; reading and writing
//! the containers happens in the adapters.

use super::classify::{EntryClass, classify};
use super::command::{add_wrap, remove_wrap};
use super::document::{HookMap, MatcherEntry};
use std::collections::HashMap;
use tracing::trace;

/// Whether, and under which label, to wrap one foreign command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrapDecision {
    pub wrap: bool,
    pub name: String,
}

impl WrapDecision {
    pub fn wrap() -> Self {
        Self {
            wrap: true,
            name: String::new(),
        }
    }

    pub fn wrap_named(name: impl Into<String>) -> Self {
        Self {
            wrap: true,
            name: name.into(),
        }
    }

    pub fn skip() -> Self {
        Self {
            wrap: false,
            name: String::new(),
        }
    }
}

/// Where wrap decisions come from.
///
/// `None` means "no opinion": the command is wrapped without a name.
pub trait DecisionSource {
    fn decision(&self, event: &str, command: &str) -> Option<WrapDecision>;
}

/// Decisions keyed by `(event, exact original command)`.
///
/// The empty default wraps every foreign command without a name.
#[derive(Debug, Clone, Default)]
pub struct Decisions {
    by_command: HashMap<(String, String), WrapDecision>,
}

impl Decisions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        event: impl Into<String>,
        command: impl Into<String>,
        decision: WrapDecision,
    ) {
        self.by_command
            .insert((event.into(), command.into()), decision);
    }

    pub fn with(
        mut self,
        event: impl Into<String>,
        command: impl Into<String>,
        decision: WrapDecision,
    ) -> Self {
        self.insert(event, command, decision);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.by_command.is_empty()
    }
}

impl DecisionSource for Decisions {
    fn decision(&self, event: &str, command: &str) -> Option<WrapDecision> {
        self.by_command
            .get(&(event.to_string(), command.to_string()))
            .cloned()
    }
}

/// Display names keyed by command only, for containers where every foreign
/// command is wrapped (agent files).
#[derive(Debug, Clone, Default)]
pub struct CommandNames(pub HashMap<String, String>);

impl DecisionSource for CommandNames {
    fn decision(&self, _event: &str, command: &str) -> Option<WrapDecision> {
        self.0.get(command).map(WrapDecision::wrap_named)
    }
}

/// Inject `generated` observer entries into `existing`.
///
/// For each generated event the observer entries come first, followed by the
/// existing entries: stale observer entries are dropped, wrapped entries kept
/// as they are, and plain foreign commands wrapped unless `decisions` says
/// otherwise. Events only present in `existing` are untouched.
pub fn merge(existing: &HookMap, generated: &HookMap, decisions: &dyn DecisionSource) -> HookMap {
    let mut result = existing.clone();

    for (event, observer_entries) in generated.iter() {
        let mut entries: Vec<MatcherEntry> = observer_entries.to_vec();
        let current = existing.get(event).unwrap_or_default();
        entries.extend(wrap_foreign_entries(event, current, decisions));
        result.set(event, entries);
    }

    result
}

/// Wrap plain foreign commands in place, without injecting observer entries.
///
/// Observer and wrapped entries are kept as they are; nothing is removed.
pub fn wrap_foreign(existing: &HookMap, decisions: &dyn DecisionSource) -> HookMap {
    existing
        .iter()
        .map(|(event, entries)| {
            let entries = entries
                .iter()
                .map(|entry| match classify(entry) {
                    EntryClass::PlainForeign => wrap_entry(event, entry, decisions),
                    EntryClass::PureObserver | EntryClass::WrappedForeign => entry.clone(),
                })
                .collect();
            (event.to_string(), entries)
        })
        .collect()
}

fn wrap_foreign_entries(
    event: &str,
    entries: &[MatcherEntry],
    decisions: &dyn DecisionSource,
) -> Vec<MatcherEntry> {
    let mut kept = Vec::with_capacity(entries.len());
    for entry in entries {
        match classify(entry) {
            EntryClass::PureObserver => {
                trace!(event, "dropping stale observer entry");
            }
            EntryClass::WrappedForeign => kept.push(entry.clone()),
            EntryClass::PlainForeign => kept.push(wrap_entry(event, entry, decisions)),
        }
    }
    kept
}

fn wrap_entry(event: &str, entry: &MatcherEntry, decisions: &dyn DecisionSource) -> MatcherEntry {
    let mut entry = entry.clone();
    for hook in &mut entry.hooks {
        let Some(command) = hook.command_str() else {
            continue;
        };
        let decision = decisions
            .decision(event, command)
            .unwrap_or_else(WrapDecision::wrap);
        if !decision.wrap {
            trace!(event, command, "leaving foreign command unwrapped");
            continue;
        }
        let wrapped = add_wrap(command, &decision.name);
        hook.command = Some(wrapped);
    }
    entry
}

/// Remove everything [`merge`] added: observer entries are dropped and
/// wrapped commands restored. Events left empty are removed.
pub fn unmerge(existing: &HookMap) -> HookMap {
    existing
        .iter()
        .map(|(event, entries)| {
            let kept = entries
                .iter()
                .filter_map(|entry| match classify(entry) {
                    EntryClass::PureObserver => None,
                    EntryClass::WrappedForeign => Some(unwrap_entry(entry)),
                    EntryClass::PlainForeign => Some(entry.clone()),
                })
                .collect();
            (event.to_string(), kept)
        })
        .collect()
}

fn unwrap_entry(entry: &MatcherEntry) -> MatcherEntry {
    let mut entry = entry.clone();
    for hook in &mut entry.hooks {
        if let Some(command) = hook.command_str() {
            let restored = remove_wrap(command);
            hook.command = Some(restored);
        }
    }
    entry
}
