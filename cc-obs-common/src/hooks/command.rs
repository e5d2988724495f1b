//! Command-string prefix codec.
//!
//! A wrapped command has the shape
//! `cc-obs wrap [--name "<label>"] -- <original command>`. Everything that
//! inspects or rewrites that prefix lives here so the separator edge cases
//! stay in one place.

/// Substring identifying any command introduced by cc-obs.
pub const OBSERVER_MARKER: &str = "cc-obs";

/// Prefix of a foreign command that cc-obs times and logs.
pub const WRAP_PREFIX: &str = "cc-obs wrap ";

/// Command installed for every observed event.
pub const LOG_COMMAND: &str = "cc-obs log";

/// Command installed for fresh sessions: reset the log, then record.
pub const CLEAR_AND_LOG_COMMAND: &str = "cc-obs clear --quiet && cc-obs log";

const SEPARATOR: &str = "-- ";
const NAME_FLAG: &str = "--name \"";

/// A command carrying the wrap prefix, split into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrappedCommand<'a> {
    /// Display label passed with `--name`, if any.
    pub name: Option<&'a str>,
    /// The original command that runs under the timer.
    pub inner: &'a str,
}

impl<'a> WrappedCommand<'a> {
    /// Parse a wrapped command.
    ///
    /// Returns `None` when the command is not wrapped or when no `-- `
    /// separator follows the prefix.
    pub fn parse(command: &'a str) -> Option<Self> {
        if !is_wrapped(command) {
            return None;
        }

        let sep = command[WRAP_PREFIX.len()..].find(SEPARATOR)? + WRAP_PREFIX.len();
        let inner = &command[sep + SEPARATOR.len()..];

        let options = command[WRAP_PREFIX.len()..sep].trim_end();
        let name = options
            .strip_prefix(NAME_FLAG)
            .and_then(|rest| rest.strip_suffix('"'));

        Some(Self { name, inner })
    }
}

/// True iff the command starts with the wrap prefix.
pub fn is_wrapped(command: &str) -> bool {
    command.starts_with(WRAP_PREFIX)
}

/// Prefix a command with the wrap prefix, optionally carrying a display name.
///
/// Already-wrapped commands are returned unchanged.
pub fn add_wrap(command: &str, name: &str) -> String {
    if is_wrapped(command) {
        return command.to_string();
    }
    if name.is_empty() {
        format!("{WRAP_PREFIX}{SEPARATOR}{command}")
    } else {
        format!("{WRAP_PREFIX}--name \"{name}\" {SEPARATOR}{command}")
    }
}

/// Strip the wrap prefix, restoring the original command.
///
/// Commands that are not wrapped, or wrapped ones without a separator, are
/// returned unchanged.
pub fn remove_wrap(command: &str) -> String {
    match WrappedCommand::parse(command) {
        Some(wrapped) => wrapped.inner.to_string(),
        None => command.to_string(),
    }
}

/// True iff the command is itself an observer action (contains the marker but
/// does not merely wrap a foreign command).
pub fn is_observer_command(command: &str) -> bool {
    command.contains(OBSERVER_MARKER) && !is_wrapped(command)
}
