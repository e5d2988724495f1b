use serde_json::Value;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

/// A temporary project with a `.claude/` directory.
pub struct TestProject {
    pub dir: TempDir,
    pub claude_dir: PathBuf,
}

impl TestProject {
    pub fn new() -> Self {
        crate::test_log!("FIXTURE: Creating test project");

        let dir = TempDir::new().expect("Failed to create temp dir");
        let claude_dir = dir.path().join(".claude");
        fs::create_dir_all(&claude_dir).expect("Failed to create .claude dir");
        Self { dir, claude_dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn local_settings(&self) -> PathBuf {
        self.claude_dir.join("settings.local.json")
    }

    pub fn events_file(&self) -> PathBuf {
        self.claude_dir.join("cc-obs").join("events.jsonl")
    }

    pub fn write_local_settings(&self, value: &Value) {
        fs::write(
            self.local_settings(),
            serde_json::to_string_pretty(value).unwrap(),
        )
        .expect("Failed to write settings.local.json");
    }

    pub fn read_local_settings(&self) -> Value {
        let content =
            fs::read_to_string(self.local_settings()).expect("Failed to read settings.local.json");
        serde_json::from_str(&content).expect("Failed to parse settings.local.json")
    }

    pub fn read_events(&self) -> Vec<Value> {
        fs::read_to_string(self.events_file())
            .unwrap_or_default()
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(|l| serde_json::from_str(l).expect("event line is not JSON"))
            .collect()
    }

    /// Run `cc-obs` inside the project with `stdin` piped in.
    pub fn run(&self, args: &[&str], stdin: &[u8]) -> Output {
        run_in(self.root(), args, stdin)
    }
}

/// Run `cc-obs` in `cwd` with `stdin` piped in.
pub fn run_in(cwd: &Path, args: &[&str], stdin: &[u8]) -> Output {
    run_with_env(cwd, args, stdin, &[])
}

/// Like [`run_in`], with extra environment variables set.
pub fn run_with_env(cwd: &Path, args: &[&str], stdin: &[u8], envs: &[(&str, &str)]) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_cc-obs"))
        .args(args)
        .current_dir(cwd)
        .env_remove("CC_OBS_LOG_FILE")
        .env("CC_OBS_HOME", cwd)
        .envs(envs.iter().copied())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to run cc-obs");
    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(stdin)
        .expect("Failed to write stdin");
    child.wait_with_output().expect("Failed to wait for cc-obs")
}
