//! `cc-obs wrap`: run a foreign hook command and log its timing and output.

use super::helpers::print_error;
use super::log::read_input;
use anyhow::{Context, Result};
use cc_obs_common::events::MAX_HOOK_INPUT_BYTES;
use cc_obs_common::{EventRecord, WrapRecord, parse_hook_payload, record_event};
use std::io::{self, Write};
use std::process::{Command, Output, Stdio};
use std::thread;
use std::time::Instant;
use tracing::{debug, warn};

/// Exit code reported when the child was killed by a signal.
#[cfg(unix)]
const EXIT_SIGNAL_BASE: i32 = 128;

/// Run `cmd` with the hook payload on its stdin. Returns the child's exit code.
pub fn run(cmd: &[String], name: Option<&str>) -> Result<i32> {
    let Some((program, args)) = cmd.split_first() else {
        print_error("Usage: cc-obs wrap -- <command>");
        return Ok(1);
    };

    let raw = read_input(io::stdin().lock(), None)?;

    let start = Instant::now();
    let output = spawn_with_input(program, args, &raw)?;
    let duration_ms = round_tenth(start.elapsed().as_secs_f64() * 1000.0);

    io::stdout()
        .write_all(&output.stdout)
        .and_then(|()| io::stdout().flush())
        .context("Failed to write command stdout")?;
    io::stderr()
        .write_all(&output.stderr)
        .and_then(|()| io::stderr().flush())
        .context("Failed to write command stderr")?;

    let exit_code = exit_code(&output);
    debug!(command = %cmd.join(" "), exit_code, duration_ms, "wrapped command finished");

    if !raw.is_empty() {
        let record = WrapRecord {
            command: cmd.join(" "),
            exit_code,
            duration_ms,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            name: name.filter(|n| !n.is_empty()).map(str::to_string),
        };
        let event = logged_payload(&raw);
        let cwd = std::env::current_dir().context("Failed to read current directory")?;
        if let Err(e) = record_event(event, &cwd, Some(&record)) {
            warn!("Failed to log wrapped hook: {}", e);
        }
    }

    Ok(exit_code)
}

/// The hook payload to log alongside the wrap record. The child always gets
/// the full input; payloads over [`MAX_HOOK_INPUT_BYTES`] are not parsed.
fn logged_payload(raw: &[u8]) -> EventRecord {
    if raw.len() as u64 > MAX_HOOK_INPUT_BYTES {
        debug!(bytes = raw.len(), "hook input too large to log");
        return EventRecord::new();
    }
    parse_hook_payload(raw).unwrap_or_default()
}

fn spawn_with_input(program: &str, args: &[String], input: &[u8]) -> Result<Output> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("Failed to run {}", program))?;

    // Fed from a thread: the child may fill its output pipes before it has
    // read all of its input.
    let feeder = child.stdin.take().map(|mut stdin| {
        let input = input.to_vec();
        thread::spawn(move || stdin.write_all(&input))
    });

    let output = child
        .wait_with_output()
        .with_context(|| format!("Failed to wait for {}", program))?;

    if let Some(handle) = feeder
        && let Ok(Err(e)) = handle.join()
        && e.kind() != io::ErrorKind::BrokenPipe
    {
        warn!("Failed to pass hook input to {}: {}", program, e);
    }
    Ok(output)
}

#[cfg(unix)]
fn exit_code(output: &Output) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    output
        .status
        .code()
        .or_else(|| output.status.signal().map(|s| EXIT_SIGNAL_BASE + s))
        .unwrap_or(1)
}

#[cfg(not(unix))]
fn exit_code(output: &Output) -> i32 {
    output.status.code().unwrap_or(1)
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
