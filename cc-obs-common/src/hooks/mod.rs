//! Hook configuration engine.
//!
//! Installs observer hooks into a hook document and removes them again,
//! without disturbing foreign hooks or unrelated configuration.
//!
//! | Module     | Role                                             |
//! |------------|--------------------------------------------------|
//! | `command`  | wrap-prefix codec on single command strings      |
//! | `document` | ordered hook map + settings JSON container       |
//! | `classify` | observer / wrapped / foreign entry classification |
//! | `generate` | canonical observer entries per event             |
//! | `merge`    | merge, unmerge and wrap-only transforms          |

pub mod classify;
pub mod command;
pub mod document;
pub mod generate;
pub mod merge;

pub use classify::{EntryClass, classify};
pub use command::{
    CLEAR_AND_LOG_COMMAND, LOG_COMMAND, OBSERVER_MARKER, WRAP_PREFIX, WrappedCommand, add_wrap,
    is_observer_command, is_wrapped, remove_wrap,
};
pub use document::{CommandEntry, HookMap, MatcherEntry, SettingsDocument};
pub use generate::{HookEvent, generate};
pub use merge::{
    CommandNames, DecisionSource, Decisions, WrapDecision, merge, unmerge, wrap_foreign,
};
