//! Append-only event log.
//!
//! Each hook invocation appends one compact JSON line to
//! `.claude/cc-obs/events.jsonl`: the payload the host agent sent on stdin,
//! plus `_ts` (UTC, RFC 3339 with microseconds), `_seq` (1-based line number)
//! and, for wrapped commands, a `_wrap` record.

use crate::errors::{ObsError, Result};
use crate::project::{events_path, find_project_root};
use crate::state::{atomic_write, read_optional};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Upper bound on hook payloads read from stdin.
pub const MAX_HOOK_INPUT_BYTES: u64 = 10 * 1024 * 1024;

pub const TS_FIELD: &str = "_ts";
pub const SEQ_FIELD: &str = "_seq";
pub const WRAP_FIELD: &str = "_wrap";
pub const AGENT_ID_FIELD: &str = "_agent_id";
pub const AGENT_TYPE_FIELD: &str = "_agent_type";

/// A logged event: the host payload plus cc-obs fields.
pub type EventRecord = Map<String, Value>;

/// Timing and output of one wrapped command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WrapRecord {
    pub command: String,
    pub exit_code: i32,
    pub duration_ms: f64,
    pub stdout: String,
    pub stderr: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Parse a hook payload. Empty input, invalid JSON and non-object JSON all
/// yield `None`.
pub fn parse_hook_payload(raw: &[u8]) -> Option<EventRecord> {
    if raw.iter().all(u8::is_ascii_whitespace) {
        return None;
    }
    match serde_json::from_slice::<Value>(raw) {
        Ok(Value::Object(map)) => Some(map),
        Ok(_) => {
            debug!("hook payload is not a JSON object");
            None
        }
        Err(e) => {
            debug!(error = %e, "hook payload is not valid JSON");
            None
        }
    }
}

/// The event log of one project.
#[derive(Debug, Clone)]
pub struct EventLog {
    path: PathBuf,
}

impl EventLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn for_project(root: &Path) -> Self {
        Self::new(events_path(root))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sequence number the next appended event gets.
    pub fn next_seq(&self) -> Result<u64> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(1),
            Err(e) => return Err(ObsError::io(&self.path, e)),
        };
        let mut lines = memchr::memchr_iter(b'\n', &bytes).count() as u64;
        if bytes.last().is_some_and(|b| *b != b'\n') {
            lines += 1;
        }
        Ok(lines + 1)
    }

    /// Append `event` with timestamp, sequence number and optional wrap
    /// record. Returns the sequence number.
    pub fn append(&self, mut event: EventRecord, wrap: Option<&WrapRecord>) -> Result<u64> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| ObsError::io(parent, e))?;
        }

        let seq = self.next_seq()?;
        event.insert(
            TS_FIELD.to_string(),
            Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Micros, false)),
        );
        event.insert(SEQ_FIELD.to_string(), Value::from(seq));
        if let Some(wrap) = wrap {
            let value = serde_json::to_value(wrap).map_err(|e| ObsError::json(&self.path, e))?;
            event.insert(WRAP_FIELD.to_string(), value);
        }

        let mut line = serde_json::to_string(&event).map_err(|e| ObsError::json(&self.path, e))?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| ObsError::io(&self.path, e))?;
        file.write_all(line.as_bytes())
            .map_err(|e| ObsError::io(&self.path, e))?;

        debug!(seq, path = %self.path.display(), "appended event");
        Ok(seq)
    }

    /// Every logged event, skipping blank lines. A missing log is empty.
    pub fn read_all(&self) -> Result<Vec<EventRecord>> {
        let Some(content) = read_optional(&self.path)? else {
            return Ok(Vec::new());
        };
        content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| serde_json::from_str(line).map_err(|e| ObsError::json(&self.path, e)))
            .collect()
    }

    /// Attribute earlier tool events to a subagent: every event whose
    /// `tool_use_id` is in `tool_use_ids` gets `_agent_id` / `_agent_type`.
    ///
    /// Unparseable lines are kept verbatim. Returns the number of events
    /// tagged; the file is only rewritten when that is non-zero.
    pub fn tag_subagent_events(
        &self,
        tool_use_ids: &HashSet<String>,
        agent_id: &str,
        agent_type: Option<&str>,
    ) -> Result<usize> {
        if tool_use_ids.is_empty() {
            return Ok(0);
        }
        let Some(content) = read_optional(&self.path)? else {
            return Ok(0);
        };

        let mut tagged = 0;
        let mut out = String::with_capacity(content.len());
        for line in content.lines() {
            let Ok(Value::Object(mut event)) = serde_json::from_str::<Value>(line) else {
                out.push_str(line);
                out.push('\n');
                continue;
            };
            let matches = event
                .get("tool_use_id")
                .and_then(Value::as_str)
                .is_some_and(|id| tool_use_ids.contains(id));
            if !matches {
                out.push_str(line);
                out.push('\n');
                continue;
            }

            event.insert(AGENT_ID_FIELD.to_string(), Value::from(agent_id));
            if let Some(agent_type) = agent_type {
                event.insert(AGENT_TYPE_FIELD.to_string(), Value::from(agent_type));
            }
            let encoded =
                serde_json::to_string(&event).map_err(|e| ObsError::json(&self.path, e))?;
            out.push_str(&encoded);
            out.push('\n');
            tagged += 1;
        }

        if tagged > 0 {
            atomic_write(&self.path, out.as_bytes())?;
        }
        Ok(tagged)
    }
}

/// Ids of every `tool_use` block in a subagent transcript (JSONL).
pub fn transcript_tool_use_ids(path: &Path) -> Result<HashSet<String>> {
    let content = fs::read_to_string(path).map_err(|e| ObsError::io(path, e))?;
    let mut ids = HashSet::new();
    for line in content.lines() {
        let Ok(entry) = serde_json::from_str::<Value>(line) else {
            continue;
        };
        let Some(blocks) = entry
            .pointer("/message/content")
            .and_then(Value::as_array)
        else {
            continue;
        };
        for block in blocks {
            if block.get("type").and_then(Value::as_str) == Some("tool_use")
                && let Some(id) = block.get("id").and_then(Value::as_str)
            {
                ids.insert(id.to_string());
            }
        }
    }
    Ok(ids)
}

/// Log one hook event for the project owning its `cwd`.
///
/// `fallback_cwd` is used when the payload has no `cwd`. Returns the sequence
/// number, or `None` when no project was found.
pub fn record_event(
    event: EventRecord,
    fallback_cwd: &Path,
    wrap: Option<&WrapRecord>,
) -> Result<Option<u64>> {
    let cwd = event
        .get("cwd")
        .and_then(Value::as_str)
        .map(PathBuf::from)
        .unwrap_or_else(|| fallback_cwd.to_path_buf());
    let Some(root) = find_project_root(&cwd) else {
        debug!(cwd = %cwd.display(), "no project root for event; not logging");
        return Ok(None);
    };

    let log = EventLog::for_project(&root);
    if event.get("hook_event_name").and_then(Value::as_str) == Some("SubagentStop") {
        attribute_subagent(&log, &event);
    }
    log.append(event, wrap).map(Some)
}

fn attribute_subagent(log: &EventLog, event: &EventRecord) {
    let (Some(transcript), Some(agent_id)) = (
        event.get("agent_transcript_path").and_then(Value::as_str),
        event.get("agent_id").and_then(Value::as_str),
    ) else {
        return;
    };
    let agent_type = event.get("agent_type").and_then(Value::as_str);

    let result = transcript_tool_use_ids(Path::new(transcript))
        .and_then(|ids| log.tag_subagent_events(&ids, agent_id, agent_type));
    match result {
        Ok(tagged) => debug!(agent_id, tagged, "attributed tool events to subagent"),
        Err(e) => debug!(agent_id, error = %e, "could not attribute subagent events"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn project() -> tempfile::TempDir {
        let dir = tempfile::TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join(".claude").join("cc-obs")).unwrap();
        dir
    }

    fn event(value: Value) -> EventRecord {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_parse_hook_payload() {
        assert!(parse_hook_payload(b"").is_none());
        assert!(parse_hook_payload(b"  \n").is_none());
        assert!(parse_hook_payload(b"not json").is_none());
        assert!(parse_hook_payload(b"[1,2]").is_none());
        let parsed = parse_hook_payload(br#"{"session_id":"s"}"#).unwrap();
        assert_eq!(parsed["session_id"], "s");
    }

    #[test]
    fn test_append_assigns_seq_and_ts() {
        let dir = project();
        let log = EventLog::for_project(dir.path());

        assert_eq!(log.append(event(json!({"a": 1})), None).unwrap(), 1);
        assert_eq!(log.append(event(json!({"a": 2})), None).unwrap(), 2);

        let events = log.read_all().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0][SEQ_FIELD], 1);
        assert_eq!(events[1][SEQ_FIELD], 2);
        let ts = events[0][TS_FIELD].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(ts).is_ok());
        assert!(ts.ends_with("+00:00"));
    }

    #[test]
    fn test_append_writes_compact_lines_with_fields_last() {
        let dir = project();
        let log = EventLog::for_project(dir.path());
        log.append(event(json!({"session_id": "s"})), None).unwrap();
        let content = fs::read_to_string(log.path()).unwrap();
        assert!(content.starts_with("{\"session_id\":\"s\",\"_ts\":"));
        assert!(content.ends_with(",\"_seq\":1}\n"));
    }

    #[test]
    fn test_next_seq_counts_unterminated_last_line() {
        let dir = project();
        let log = EventLog::for_project(dir.path());
        fs::write(log.path(), "{}\n{}").unwrap();
        assert_eq!(log.next_seq().unwrap(), 3);
    }

    #[test]
    fn test_append_with_wrap_record() {
        let dir = project();
        let log = EventLog::for_project(dir.path());
        let wrap = WrapRecord {
            command: "echo hello".to_string(),
            exit_code: 0,
            duration_ms: 1.5,
            stdout: "hello\n".to_string(),
            stderr: String::new(),
            name: None,
        };
        log.append(event(json!({})), Some(&wrap)).unwrap();
        let events = log.read_all().unwrap();
        assert_eq!(events[0][WRAP_FIELD]["exit_code"], 0);
        assert!(events[0][WRAP_FIELD].get("name").is_none());
    }

    #[test]
    fn test_record_event_without_project_is_skipped() {
        let dir = tempfile::TempDir::new().unwrap();
        let ev = event(json!({"cwd": dir.path().to_string_lossy()}));
        assert_eq!(record_event(ev, dir.path(), None).unwrap(), None);
        assert!(!dir.path().join(".claude").exists());
    }

    #[test]
    fn test_record_event_uses_payload_cwd() {
        let dir = project();
        let nested = dir.path().join("src");
        fs::create_dir_all(&nested).unwrap();
        let elsewhere = tempfile::TempDir::new().unwrap();

        let ev = event(json!({"cwd": nested.to_string_lossy(), "hook_event_name": "Stop"}));
        assert_eq!(record_event(ev, elsewhere.path(), None).unwrap(), Some(1));
        assert!(events_path(dir.path()).exists());
    }

    #[test]
    fn test_subagent_stop_tags_prior_events() {
        eprintln!("TEST START: test_subagent_stop_tags_prior_events");
        let dir = project();
        let cwd = dir.path().to_string_lossy().to_string();

        let transcript = dir.path().join("transcript.jsonl");
        fs::write(
            &transcript,
            json!({"message": {"content": [
                {"type": "tool_use", "id": "tool-1", "name": "Bash"},
                {"type": "tool_use", "id": "tool-2", "name": "Read"},
                {"type": "text", "text": "done"}
            ]}})
            .to_string()
                + "\nnot json\n",
        )
        .unwrap();

        for id in ["tool-1", "tool-2", "tool-3"] {
            let ev = event(json!({
                "hook_event_name": "PostToolUse", "tool_use_id": id, "cwd": cwd
            }));
            record_event(ev, dir.path(), None).unwrap();
        }
        let stop = event(json!({
            "hook_event_name": "SubagentStop",
            "agent_id": "agent-abc",
            "agent_type": "task",
            "agent_transcript_path": transcript.to_string_lossy(),
            "cwd": cwd
        }));
        assert_eq!(record_event(stop, dir.path(), None).unwrap(), Some(4));

        let events = EventLog::for_project(dir.path()).read_all().unwrap();
        for ev in &events[..2] {
            assert_eq!(ev[AGENT_ID_FIELD], "agent-abc");
            assert_eq!(ev[AGENT_TYPE_FIELD], "task");
        }
        assert!(events[2].get(AGENT_ID_FIELD).is_none());
        assert_eq!(events[3][SEQ_FIELD], 4);
        eprintln!("TEST PASS: test_subagent_stop_tags_prior_events");
    }

    #[test]
    fn test_missing_transcript_does_not_block_logging() {
        let dir = project();
        let stop = event(json!({
            "hook_event_name": "SubagentStop",
            "agent_id": "a",
            "agent_transcript_path": "/nonexistent/transcript.jsonl",
            "cwd": dir.path().to_string_lossy()
        }));
        assert_eq!(record_event(stop, dir.path(), None).unwrap(), Some(1));
    }
}
