//! Property tests for the merge engine over arbitrary hook maps.

use cc_obs_common::hooks::command::{CLEAR_AND_LOG_COMMAND, LOG_COMMAND, add_wrap};
use cc_obs_common::{
    CommandEntry, Decisions, EntryClass, HookMap, MatcherEntry, WrapDecision, classify, generate,
    merge, unmerge,
};
use proptest::prelude::*;

#[ctor::ctor]
fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("cc_obs_common=debug")
        .with_test_writer()
        .try_init();
}

const EVENTS: &[&str] = &[
    "PreToolUse",
    "PostToolUse",
    "Stop",
    "SessionStart",
    "Notification",
    "CustomEvent",
];

fn event_name() -> impl Strategy<Value = String> {
    prop::sample::select(EVENTS).prop_map(str::to_string)
}

fn foreign_command() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9 ./_-]{0,15}".prop_filter("must not mention cc-obs", |c| !c.contains("cc-obs"))
}

/// Any command a real settings file might hold after earlier installs.
fn any_command() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => foreign_command(),
        2 => foreign_command().prop_map(|c| add_wrap(&c, "")),
        1 => (foreign_command(), "[A-Za-z]{1,8}").prop_map(|(c, n)| add_wrap(&c, &n)),
        1 => Just(LOG_COMMAND.to_string()),
        1 => Just(CLEAR_AND_LOG_COMMAND.to_string()),
    ]
}

fn entry_of(commands: impl Strategy<Value = String>) -> impl Strategy<Value = MatcherEntry> {
    (
        prop::sample::select(&["", "Bash", "Edit|Write", "startup"][..]),
        prop::collection::vec(commands, 1..4),
    )
        .prop_map(|(matcher, commands)| {
            MatcherEntry::new(
                matcher,
                commands.into_iter().map(CommandEntry::command).collect(),
            )
        })
}

fn hook_map_of(entry: impl Strategy<Value = MatcherEntry>) -> impl Strategy<Value = HookMap> {
    prop::collection::vec((event_name(), prop::collection::vec(entry, 1..4)), 0..5)
        .prop_map(|events| events.into_iter().collect())
}

fn foreign_map() -> impl Strategy<Value = HookMap> {
    hook_map_of(entry_of(foreign_command()))
}

fn mixed_map() -> impl Strategy<Value = HookMap> {
    hook_map_of(entry_of(any_command()))
}

/// Assign a decision to every command, cycling through `choices`:
/// 0 wraps unnamed, 1 wraps with a label, 2 leaves the command alone.
fn decisions_for(hooks: &HookMap, choices: &[(u8, String)]) -> Decisions {
    let mut decisions = Decisions::new();
    for (i, (event, command)) in hooks.commands().enumerate() {
        let (kind, label) = &choices[i % choices.len()];
        let decision = match kind {
            0 => WrapDecision::wrap(),
            1 => WrapDecision::wrap_named(label.clone()),
            _ => WrapDecision::skip(),
        };
        decisions.insert(event, command, decision);
    }
    decisions
}

fn choices() -> impl Strategy<Value = Vec<(u8, String)>> {
    prop::collection::vec((0u8..3, "[A-Za-z]{1,8}"), 1..8)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn test_merge_is_idempotent(existing in mixed_map()) {
        let generated = generate();
        let once = merge(&existing, &generated, &Decisions::new());
        let twice = merge(&once, &generated, &Decisions::new());
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn test_unmerge_restores_foreign_only_maps(
        existing in foreign_map(),
        choices in choices(),
    ) {
        let decisions = decisions_for(&existing, &choices);
        let merged = merge(&existing, &generate(), &decisions);
        prop_assert_eq!(unmerge(&merged), existing);
    }

    #[test]
    fn test_observer_entries_lead_each_generated_event(existing in mixed_map()) {
        let generated = generate();
        let merged = merge(&existing, &generated, &Decisions::new());
        for (event, observer_entries) in generated.iter() {
            let entries = merged.get(event).unwrap_or_default();
            prop_assert!(entries.starts_with(observer_entries), "event {}", event);
        }
    }

    #[test]
    fn test_merge_leaves_one_observer_block_per_event(existing in mixed_map()) {
        let generated = generate();
        let merged = merge(&existing, &generated, &Decisions::new());
        for (event, observer_entries) in generated.iter() {
            let entries = merged.get(event).unwrap_or_default();
            let observers = entries
                .iter()
                .filter(|e| classify(e) == EntryClass::PureObserver)
                .count();
            prop_assert_eq!(observers, observer_entries.len());
            for entry in &entries[observer_entries.len()..] {
                prop_assert_eq!(classify(entry), EntryClass::WrappedForeign);
            }
        }
    }

    #[test]
    fn test_unmerge_leaves_only_plain_entries(existing in mixed_map()) {
        let restored = unmerge(&existing);
        for (event, entries) in restored.iter() {
            prop_assert!(!entries.is_empty(), "event {} left empty", event);
            for entry in entries {
                prop_assert_eq!(classify(entry), EntryClass::PlainForeign);
            }
        }
    }

    #[test]
    fn test_merge_keeps_events_outside_the_generated_set(existing in mixed_map()) {
        let generated = generate();
        let merged = merge(&existing, &generated, &Decisions::new());
        for (event, entries) in existing.iter() {
            if generated.get(event).is_none() {
                prop_assert_eq!(merged.get(event), Some(entries));
            }
        }
    }
}
