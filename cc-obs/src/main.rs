//! cc-obs - observability for Claude Code sessions.
//!
//! Installs observer hooks into the agent's settings, logs every hook event
//! to `.claude/cc-obs/events.jsonl`, and times wrapped foreign hooks.

#![forbid(unsafe_code)]

mod commands;

use anyhow::Result;
use cc_obs_common::{LogConfig, ObsConfig, init_logging};
use clap::{Parser, Subcommand};
use commands::install::InstallOptions;
use std::path::PathBuf;
use tracing::warn;

#[derive(Parser)]
#[command(name = "cc-obs")]
#[command(author, version, about = "Observability for Claude Code sessions")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Install observer hooks
    Install {
        /// Write to settings.json instead of settings.local.json
        #[arg(long, conflicts_with = "global")]
        project: bool,

        /// Install to ~/.claude/settings.json
        #[arg(long)]
        global: bool,

        /// Remove all cc-obs hooks
        #[arg(long)]
        uninstall: bool,

        /// Run non-interactively with default settings
        #[arg(long)]
        no_prompt: bool,

        /// Show what would change without writing anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Observer hook handler (reads stdin)
    Log,

    /// Wrap a hook command with timing
    Wrap {
        /// Display label for the wrapped hook
        #[arg(long)]
        name: Option<String>,

        /// Command to wrap (after --)
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        cmd: Vec<String>,
    },

    /// Wrap or unwrap the hooks declared in an agent file
    WrapAgent {
        /// Agent markdown file
        path: PathBuf,

        /// Remove the wrap prefix instead of adding it
        #[arg(long)]
        uninstall: bool,

        /// Display label for a command, as <command>=<label>
        #[arg(long = "name", value_parser = commands::wrap_agent::parse_name)]
        names: Vec<(String, String)>,
    },

    /// Delete log and view files
    Clear {
        /// Suppress output
        #[arg(long)]
        quiet: bool,
    },

    /// Print session summary
    Status,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut log_config = LogConfig::from_env("warn").with_stderr();
    if cli.verbose {
        log_config = log_config.with_level("debug");
    }
    let logging_guards = init_logging(&log_config)?;

    let (obs_config, env_errors) = ObsConfig::from_env();
    for err in &env_errors {
        warn!("{}", err);
    }

    let code = match cli.command {
        Commands::Install {
            project,
            global,
            uninstall,
            no_prompt,
            dry_run,
        } => {
            let opts = InstallOptions {
                project,
                global,
                uninstall,
                no_prompt,
                dry_run,
            };
            commands::install::run(&opts, &obs_config)?
        }
        Commands::Log => {
            commands::log::run()?;
            0
        }
        Commands::Wrap { name, cmd } => commands::wrap::run(&cmd, name.as_deref())?,
        Commands::WrapAgent {
            path,
            uninstall,
            names,
        } => commands::wrap_agent::run(&path, uninstall, &names)?,
        Commands::Clear { quiet } => commands::clear::run(quiet)?,
        Commands::Status => commands::status::run()?,
    };

    if code != 0 {
        drop(logging_guards);
        std::process::exit(code);
    }
    Ok(())
}
