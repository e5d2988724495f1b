//! Hook document model and the settings-file adapter.
//!
//! [`HookMap`] is the ordered `event -> [MatcherEntry]` value the engine works
//! on. [`SettingsDocument`] is the JSON container it is read from and written
//! back into; the agent-file header is the other container
//! (see [`crate::agent_file`]).

use crate::errors::{ObsError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Key of the hooks mapping inside a settings document or agent header.
pub const HOOKS_KEY: &str = "hooks";

/// Kind tag of the only command entries the engine interprets.
pub const COMMAND_KIND: &str = "command";

/// One command registered under a matcher.
///
/// Unknown keys (`timeout`, ...) are kept verbatim in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandEntry {
    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CommandEntry {
    /// A `type: command` entry running `command`.
    pub fn command(command: impl Into<String>) -> Self {
        Self {
            kind: COMMAND_KIND.to_string(),
            command: Some(command.into()),
            extra: Map::new(),
        }
    }

    /// The command string, if this is an interpreted `command` entry.
    pub fn command_str(&self) -> Option<&str> {
        if self.kind == COMMAND_KIND {
            self.command.as_deref()
        } else {
            None
        }
    }
}

/// One registration under an event: a matcher pattern and its commands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatcherEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matcher: Option<String>,
    #[serde(default)]
    pub hooks: Vec<CommandEntry>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MatcherEntry {
    pub fn new(matcher: impl Into<String>, hooks: Vec<CommandEntry>) -> Self {
        Self {
            matcher: Some(matcher.into()),
            hooks,
            extra: Map::new(),
        }
    }

    /// Iterate the interpreted command strings of this entry.
    pub fn commands(&self) -> impl Iterator<Item = &str> {
        self.hooks.iter().filter_map(CommandEntry::command_str)
    }
}

/// Ordered mapping from event name to matcher entries.
///
/// Event order and entry order are both preserved; unknown event names are
/// carried like any other.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HookMap(IndexMap<String, Vec<MatcherEntry>>);

impl HookMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, event: &str) -> Option<&[MatcherEntry]> {
        self.0.get(event).map(Vec::as_slice)
    }

    /// Set the entries for an event. An empty list removes the event, keeping
    /// the position of the remaining events.
    pub fn set(&mut self, event: impl Into<String>, entries: Vec<MatcherEntry>) {
        let event = event.into();
        if entries.is_empty() {
            self.0.shift_remove(&event);
        } else {
            self.0.insert(event, entries);
        }
    }

    pub fn events(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[MatcherEntry])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Every `(event, command)` pair in document order.
    pub fn commands(&self) -> impl Iterator<Item = (&str, &str)> {
        self.iter().flat_map(|(event, entries)| {
            entries
                .iter()
                .flat_map(MatcherEntry::commands)
                .map(move |cmd| (event, cmd))
        })
    }
}

impl FromIterator<(String, Vec<MatcherEntry>)> for HookMap {
    fn from_iter<I: IntoIterator<Item = (String, Vec<MatcherEntry>)>>(iter: I) -> Self {
        let mut map = HookMap::new();
        for (event, entries) in iter {
            map.set(event, entries);
        }
        map
    }
}

/// A settings JSON document: an object whose `hooks` key holds a [`HookMap`].
///
/// Key order is preserved, so a read-transform-write cycle only touches the
/// `hooks` value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsDocument {
    root: Map<String, Value>,
}

impl SettingsDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a settings document. `origin` is only used for error messages.
    pub fn parse(text: &str, origin: &std::path::Path) -> Result<Self> {
        let value: Value = serde_json::from_str(text).map_err(|e| ObsError::json(origin, e))?;
        match value {
            Value::Object(root) => Ok(Self { root }),
            other => Err(ObsError::InvalidDocument(format!(
                "expected a JSON object at the top level, found {}",
                json_kind(&other)
            ))),
        }
    }

    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(root) => Ok(Self { root }),
            other => Err(ObsError::InvalidDocument(format!(
                "expected a JSON object at the top level, found {}",
                json_kind(&other)
            ))),
        }
    }

    /// The hooks mapping; empty when the document has none or it is `null`.
    pub fn hooks(&self) -> Result<HookMap> {
        match self.root.get(HOOKS_KEY) {
            None | Some(Value::Null) => Ok(HookMap::new()),
            Some(value) => serde_json::from_value(value.clone())
                .map_err(|e| ObsError::InvalidDocument(format!("'{HOOKS_KEY}': {e}"))),
        }
    }

    /// Replace the hooks mapping. An empty mapping removes the key entirely.
    pub fn set_hooks(&mut self, hooks: &HookMap) -> Result<()> {
        if hooks.is_empty() {
            self.root.shift_remove(HOOKS_KEY);
            return Ok(());
        }
        let value = serde_json::to_value(hooks)
            .map_err(|e| ObsError::InvalidDocument(format!("'{HOOKS_KEY}': {e}")))?;
        self.root.insert(HOOKS_KEY.to_string(), value);
        Ok(())
    }

    pub fn has_hooks(&self) -> bool {
        self.root.contains_key(HOOKS_KEY)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.root
    }

    /// Pretty JSON (2-space indent) with a trailing newline.
    pub fn to_pretty_string(&self) -> Result<String> {
        let mut out = serde_json::to_string_pretty(&self.root)?;
        out.push('\n');
        Ok(out)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
