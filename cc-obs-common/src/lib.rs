//! Shared library for cc-obs: the hook document engine, the event log and
//! the ambient plumbing (config, logging, atomic file writes) used by the
//! `cc-obs` binary.

#![forbid(unsafe_code)]

pub mod agent_file;
pub mod config;
pub mod errors;
pub mod events;
pub mod hooks;
pub mod logging;
pub mod project;
pub mod state;

pub use agent_file::{AgentFile, AgentRewrite, unwrap_agent, unwrap_file, wrap_agent, wrap_file};
pub use config::{EnvParser, ObsConfig};
pub use errors::{ObsError, Result};
pub use events::{EventLog, EventRecord, WrapRecord, parse_hook_payload, record_event};
pub use hooks::{
    CommandEntry, CommandNames, DecisionSource, Decisions, EntryClass, HookEvent, HookMap,
    MatcherEntry, SettingsDocument, WrapDecision, classify, generate, merge, unmerge,
    wrap_foreign,
};
pub use logging::{LogConfig, LogFormat, LoggingGuards, init_logging};
pub use project::{SettingsScope, find_project_root, settings_path};
pub use state::{IdempotentResult, atomic_write, read_optional};
