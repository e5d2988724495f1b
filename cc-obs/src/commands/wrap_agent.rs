//! `cc-obs wrap-agent`: wrap or unwrap the hooks in one agent file.

use super::helpers::print_error;
use anyhow::{Result, bail};
use cc_obs_common::{AgentRewrite, CommandNames, unwrap_file, wrap_file};
use std::path::Path;

/// Parse a `--name <command>=<label>` argument.
pub fn parse_name(arg: &str) -> Result<(String, String)> {
    match arg.rsplit_once('=') {
        Some((command, label)) if !command.trim().is_empty() => {
            Ok((command.trim().to_string(), label.trim().to_string()))
        }
        _ => bail!("expected <command>=<label>, got '{}'", arg),
    }
}

pub fn run(path: &Path, uninstall: bool, names: &[(String, String)]) -> Result<i32> {
    if !path.is_file() {
        print_error(&format!("File not found: {}", path.display()));
        return Ok(1);
    }

    let outcome = if uninstall {
        unwrap_file(path)?
    } else {
        let names = CommandNames(names.iter().cloned().collect());
        wrap_file(path, &names)?
    };

    let verb = if uninstall { "Unwrapped" } else { "Wrapped" };
    match outcome {
        AgentRewrite::NoHeader | AgentRewrite::NoHooks => {
            print_error(&format!("No hooks found in {}", path.display()));
            Ok(1)
        }
        AgentRewrite::Unchanged => {
            println!("{} already up to date", path.display());
            Ok(0)
        }
        AgentRewrite::Rewritten(_) => {
            println!("{} hooks in {}", verb, path.display());
            Ok(0)
        }
    }
}
