//! `cc-obs log`: the observer hook handler.

use anyhow::{Context, Result};
use cc_obs_common::events::MAX_HOOK_INPUT_BYTES;
use cc_obs_common::{parse_hook_payload, record_event};
use std::io::{self, Read};
use tracing::{debug, warn};

/// Read one hook payload from stdin and append it to the project's log.
///
/// Never blocks the host agent: bad input, I/O and write failures are logged
/// and the command still succeeds.
pub fn run() -> Result<()> {
    let raw = match read_input(io::stdin().lock(), Some(MAX_HOOK_INPUT_BYTES)) {
        Ok(raw) => raw,
        Err(e) => {
            warn!("Failed to read hook input: {:#}", e);
            return Ok(());
        }
    };
    let Some(event) = parse_hook_payload(&raw) else {
        debug!(bytes = raw.len(), "no usable hook payload");
        return Ok(());
    };

    let cwd = match std::env::current_dir() {
        Ok(cwd) => cwd,
        Err(e) => {
            warn!("Failed to read current directory: {}", e);
            return Ok(());
        }
    };
    match record_event(event, &cwd, None) {
        Ok(Some(seq)) => debug!(seq, "logged event"),
        Ok(None) => {}
        Err(e) => warn!("Failed to log hook event: {}", e),
    }
    Ok(())
}

/// Read `reader` to the end, or at most `limit` bytes.
pub fn read_input(mut reader: impl Read, limit: Option<u64>) -> Result<Vec<u8>> {
    let mut raw = Vec::new();
    match limit {
        Some(limit) => reader.take(limit).read_to_end(&mut raw),
        None => reader.read_to_end(&mut raw),
    }
    .context("Failed to read hook input")?;
    Ok(raw)
}
