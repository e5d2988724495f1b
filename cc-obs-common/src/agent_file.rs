//! Agent-file adapter: hooks declared in the YAML header of a markdown file.
//!
//! ```text
//! ---
//! name: reviewer
//! hooks:
//!   PostToolUse:
//!     - matcher: ""
//!       hooks:
//!         - type: command
//!           command: my-tool check
//! ---
//! # Body, preserved byte-for-byte
//! ```
//!
//! The same classify/wrap/unmerge engine runs on the header's `hooks` value.
//! Agent files only get their foreign commands wrapped; observer entries are
//! never injected into them.

use crate::errors::{ObsError, Result};
use crate::hooks::document::{HOOKS_KEY, HookMap};
use crate::hooks::merge::{CommandNames, unmerge, wrap_foreign};
use crate::state::atomic_write;
use serde_yaml_ng::{Mapping, Value};
use std::path::Path;
use tracing::debug;

const DELIMITER: &str = "---";

/// Result of a wrap or unwrap pass over an agent file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentRewrite {
    /// The file has no leading `---` header.
    NoHeader,
    /// The header has no `hooks` key.
    NoHooks,
    /// Nothing to change.
    Unchanged,
    /// The new file content.
    Rewritten(String),
}

/// A markdown file split into its YAML header and opaque body.
#[derive(Debug, Clone)]
pub struct AgentFile {
    header: Option<Mapping>,
    body: String,
}

impl AgentFile {
    pub fn parse(text: &str) -> Result<Self> {
        let Some((yaml, body)) = split_header(text)? else {
            return Ok(Self {
                header: None,
                body: text.to_string(),
            });
        };

        let header = match serde_yaml_ng::from_str::<Value>(yaml)? {
            Value::Mapping(map) => map,
            Value::Null => Mapping::new(),
            _ => {
                return Err(ObsError::InvalidDocument(
                    "agent header is not a YAML mapping".to_string(),
                ));
            }
        };

        Ok(Self {
            header: Some(header),
            body: body.to_string(),
        })
    }

    pub fn has_header(&self) -> bool {
        self.header.is_some()
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// The header's hooks, or `None` when there is no header or no `hooks`.
    pub fn hooks(&self) -> Result<Option<HookMap>> {
        let Some(header) = &self.header else {
            return Ok(None);
        };
        match header.get(HOOKS_KEY) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => serde_yaml_ng::from_value(value.clone())
                .map(Some)
                .map_err(|e| ObsError::InvalidDocument(format!("'{HOOKS_KEY}': {e}"))),
        }
    }

    /// Replace the header's hooks; an empty map removes the key.
    pub fn set_hooks(&mut self, hooks: &HookMap) -> Result<()> {
        let header = self.header.get_or_insert_with(Mapping::new);
        if hooks.is_empty() {
            header.shift_remove(HOOKS_KEY);
            return Ok(());
        }
        let value = serde_yaml_ng::to_value(hooks)?;
        header.insert(Value::String(HOOKS_KEY.to_string()), value);
        Ok(())
    }

    pub fn render(&self) -> Result<String> {
        let Some(header) = &self.header else {
            return Ok(self.body.clone());
        };
        let yaml = serde_yaml_ng::to_string(header)?;
        Ok(format!("{DELIMITER}\n{yaml}{DELIMITER}\n{}", self.body))
    }

    fn rewrite(mut self, transform: impl FnOnce(&HookMap) -> HookMap) -> Result<AgentRewrite> {
        if !self.has_header() {
            return Ok(AgentRewrite::NoHeader);
        }
        let Some(hooks) = self.hooks()? else {
            return Ok(AgentRewrite::NoHooks);
        };

        let updated = transform(&hooks);
        if updated == hooks {
            return Ok(AgentRewrite::Unchanged);
        }
        self.set_hooks(&updated)?;
        Ok(AgentRewrite::Rewritten(self.render()?))
    }
}

/// Split `text` into `(header yaml, body)`.
///
/// `Ok(None)` when the first line is not the delimiter.
fn split_header(text: &str) -> Result<Option<(&str, &str)>> {
    let mut lines = text.split_inclusive('\n');
    let Some(first) = lines.next() else {
        return Ok(None);
    };
    if trim_eol(first) != DELIMITER {
        return Ok(None);
    }

    let header_start = first.len();
    let mut offset = header_start;
    for line in lines {
        let line_end = offset + line.len();
        if trim_eol(line) == DELIMITER {
            return Ok(Some((&text[header_start..offset], &text[line_end..])));
        }
        offset = line_end;
    }
    Err(ObsError::UnterminatedHeader)
}

fn trim_eol(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

/// Wrap every plain foreign command in the header, labelled from `names`.
pub fn wrap_agent(text: &str, names: &CommandNames) -> Result<AgentRewrite> {
    AgentFile::parse(text)?.rewrite(|hooks| wrap_foreign(hooks, names))
}

/// Undo [`wrap_agent`], also dropping any observer entries.
pub fn unwrap_agent(text: &str) -> Result<AgentRewrite> {
    AgentFile::parse(text)?.rewrite(unmerge)
}

/// [`wrap_agent`] on a file, writing it back when it changed.
pub fn wrap_file(path: &Path, names: &CommandNames) -> Result<AgentRewrite> {
    let text = std::fs::read_to_string(path).map_err(|e| ObsError::io(path, e))?;
    let outcome = wrap_agent(&text, names)?;
    write_if_rewritten(path, &outcome)?;
    Ok(outcome)
}

/// [`unwrap_agent`] on a file, writing it back when it changed.
pub fn unwrap_file(path: &Path) -> Result<AgentRewrite> {
    let text = std::fs::read_to_string(path).map_err(|e| ObsError::io(path, e))?;
    let outcome = unwrap_agent(&text)?;
    write_if_rewritten(path, &outcome)?;
    Ok(outcome)
}

fn write_if_rewritten(path: &Path, outcome: &AgentRewrite) -> Result<()> {
    if let AgentRewrite::Rewritten(content) = outcome {
        atomic_write(path, content.as_bytes())?;
        debug!(path = %path.display(), "rewrote agent file");
    }
    Ok(())
}
