//! `cc-obs install`: merge observer hooks into a settings file, or take them
//! out again with `--uninstall`.

use super::helpers::{NO_PROJECT, display_path, print_error};
use super::prompt::{DialoguerPrompter, gather_choices};
use anyhow::{Context, Result};
use cc_obs_common::project::{claude_dir, obs_dir};
use cc_obs_common::{
    AgentFile, AgentRewrite, CommandNames, DecisionSource, Decisions, EntryClass, HookMap,
    IdempotentResult, ObsConfig, SettingsDocument, SettingsScope, WrapDecision, atomic_write,
    classify, find_project_root, generate, merge, read_optional, settings_path, unmerge,
    unwrap_agent, wrap_agent,
};
use colored::Colorize;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// What to do with one existing foreign command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookWrapChoice {
    pub event: String,
    pub command: String,
    pub wrap: bool,
    /// Display label; empty for none.
    pub name: String,
}

/// Whether to wrap the hooks of one agent file.
#[derive(Debug, Clone)]
pub struct AgentChoice {
    pub path: PathBuf,
    pub wrap: bool,
    pub names: CommandNames,
}

impl AgentChoice {
    pub fn new(path: impl Into<PathBuf>, wrap: bool) -> Self {
        Self {
            path: path.into(),
            wrap,
            names: CommandNames::default(),
        }
    }
}

/// Everything an install run needs to know.
///
/// The default wraps every existing foreign command, without names, and
/// touches no agent files.
#[derive(Debug, Clone, Default)]
pub struct InstallConfig {
    pub scope: SettingsScope,
    pub uninstall: bool,
    pub hook_choices: Vec<HookWrapChoice>,
    pub agents: Vec<AgentChoice>,
}

impl InstallConfig {
    pub fn decisions(&self) -> Decisions {
        let mut decisions = Decisions::new();
        for choice in &self.hook_choices {
            let decision = if choice.wrap {
                WrapDecision::wrap_named(choice.name.clone())
            } else {
                WrapDecision::skip()
            };
            decisions.insert(choice.event.clone(), choice.command.clone(), decision);
        }
        decisions
    }
}

/// Outcome of [`execute_install`].
#[derive(Debug)]
pub struct InstallReport {
    pub settings_path: PathBuf,
    pub settings: IdempotentResult,
    pub agents: Vec<(PathBuf, AgentRewrite)>,
}

/// Command-line options of `cc-obs install`.
#[derive(Debug, Clone, Default)]
pub struct InstallOptions {
    pub project: bool,
    pub global: bool,
    pub uninstall: bool,
    pub no_prompt: bool,
    pub dry_run: bool,
}

impl InstallOptions {
    /// Scope fixed by flags, if any.
    fn scope(&self) -> Option<SettingsScope> {
        if self.global {
            Some(SettingsScope::Global)
        } else if self.project {
            Some(SettingsScope::Project)
        } else {
            None
        }
    }
}

pub fn run(opts: &InstallOptions, obs_config: &ObsConfig) -> Result<i32> {
    let root = match opts.scope() {
        Some(SettingsScope::Global) => obs_config
            .home_dir()
            .context("Could not determine home directory")?,
        _ => {
            let cwd = std::env::current_dir().context("Failed to read current directory")?;
            match find_project_root(&cwd) {
                Some(root) => root,
                None => {
                    print_error(NO_PROJECT);
                    return Ok(1);
                }
            }
        }
    };

    let interactive = !opts.uninstall && !opts.no_prompt && io::stdin().is_terminal();
    let config = if interactive {
        match gather_choices(&DialoguerPrompter::new(), &root, opts.scope())? {
            Some(config) => config,
            None => {
                print_error("Installation cancelled");
                return Ok(1);
            }
        }
    } else {
        InstallConfig {
            scope: opts.scope().unwrap_or_default(),
            uninstall: opts.uninstall,
            ..InstallConfig::default()
        }
    };

    let path = settings_path(&root, config.scope);
    let report = execute_install(&root, &path, &config, opts.dry_run)?;
    print_report(&report, &root, config.uninstall);
    Ok(0)
}

/// Apply `config` to the settings file at `settings_file` and to the agent
/// files under `root/.claude`.
pub fn execute_install(
    root: &Path,
    settings_file: &Path,
    config: &InstallConfig,
    dry_run: bool,
) -> Result<InstallReport> {
    let mut agents = Vec::new();

    let settings = if config.uninstall {
        let outcome = uninstall_at_path(settings_file, dry_run)?;
        for path in discover_agents(root) {
            let outcome = rewrite_agent(&path, dry_run, unwrap_agent)?;
            agents.push((path, outcome));
        }
        outcome
    } else {
        let outcome = install_at_path(settings_file, &config.decisions(), dry_run)?;
        for choice in config.agents.iter().filter(|a| a.wrap) {
            let outcome = rewrite_agent(&choice.path, dry_run, |text| {
                wrap_agent(text, &choice.names)
            })?;
            agents.push((choice.path.clone(), outcome));
        }
        outcome
    };

    Ok(InstallReport {
        settings_path: settings_file.to_path_buf(),
        settings,
        agents,
    })
}

/// Merge the observer hooks into the settings file at `settings_path`.
///
/// The file's `.claude` directory must already exist; it is never created.
pub fn install_at_path(
    settings_path: &Path,
    decisions: &dyn DecisionSource,
    dry_run: bool,
) -> Result<IdempotentResult> {
    let claude_dir = settings_path
        .parent()
        .context("Could not determine .claude directory")?;
    if !claude_dir.is_dir() {
        return Ok(IdempotentResult::NotApplicable(format!(
            "{} does not exist",
            claude_dir.display()
        )));
    }

    let existing = read_optional(settings_path)?;
    let mut doc = match &existing {
        Some(text) => SettingsDocument::parse(text, settings_path)?,
        None => SettingsDocument::new(),
    };

    let current = doc.hooks()?;
    let merged = merge(&current, &generate(), decisions);
    if existing.is_some() && merged == current {
        debug!(path = %settings_path.display(), "observer hooks already installed");
        return Ok(IdempotentResult::Unchanged);
    }

    if dry_run {
        return Ok(IdempotentResult::WouldChange(format!(
            "Would add cc-obs hooks to {}",
            settings_path.display()
        )));
    }

    doc.set_hooks(&merged)?;
    atomic_write(settings_path, doc.to_pretty_string()?.as_bytes())?;
    info!(path = %settings_path.display(), "installed observer hooks");
    Ok(IdempotentResult::Changed)
}

/// Remove every observer entry and unwrap every wrapped command.
///
/// A missing settings file is left missing.
pub fn uninstall_at_path(settings_path: &Path, dry_run: bool) -> Result<IdempotentResult> {
    let Some(text) = read_optional(settings_path)? else {
        return Ok(IdempotentResult::Unchanged);
    };
    let mut doc = SettingsDocument::parse(&text, settings_path)?;

    let current = doc.hooks()?;
    let restored = unmerge(&current);
    if restored == current {
        return Ok(IdempotentResult::Unchanged);
    }

    if dry_run {
        return Ok(IdempotentResult::WouldChange(format!(
            "Would remove cc-obs hooks from {}",
            settings_path.display()
        )));
    }

    doc.set_hooks(&restored)?;
    atomic_write(settings_path, doc.to_pretty_string()?.as_bytes())?;
    info!(path = %settings_path.display(), "removed observer hooks");
    Ok(IdempotentResult::Changed)
}

fn rewrite_agent(
    path: &Path,
    dry_run: bool,
    transform: impl FnOnce(&str) -> cc_obs_common::Result<AgentRewrite>,
) -> Result<AgentRewrite> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let outcome =
        transform(&text).with_context(|| format!("Failed to process {}", path.display()))?;
    if !dry_run && let AgentRewrite::Rewritten(content) = &outcome {
        atomic_write(path, content.as_bytes())?;
    }
    Ok(outcome)
}

/// Markdown files under `root/.claude` (outside `cc-obs/`) whose header
/// declares hooks.
pub fn discover_agents(root: &Path) -> Vec<PathBuf> {
    let base = claude_dir(root);
    let pattern = format!(
        "{}/**/*.md",
        glob::Pattern::escape(&base.to_string_lossy())
    );
    let paths = match glob::glob(&pattern) {
        Ok(paths) => paths,
        Err(e) => {
            warn!(error = %e, "invalid agent discovery pattern");
            return Vec::new();
        }
    };

    let own_dir = obs_dir(root);
    paths
        .filter_map(|entry| entry.ok())
        .filter(|path| !path.starts_with(&own_dir))
        .filter(|path| has_hooks(path))
        .collect()
}

fn has_hooks(path: &Path) -> bool {
    let Ok(text) = std::fs::read_to_string(path) else {
        return false;
    };
    match AgentFile::parse(&text).and_then(|agent| agent.hooks()) {
        Ok(Some(hooks)) => !hooks.is_empty(),
        Ok(None) => false,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "skipping unreadable agent file");
            false
        }
    }
}

/// Commands of plain foreign entries, in document order. These are the only
/// commands a wrap decision applies to.
pub fn foreign_commands(hooks: &HookMap) -> Vec<(String, String)> {
    hooks
        .iter()
        .flat_map(|(event, entries)| {
            entries
                .iter()
                .filter(|entry| classify(entry) == EntryClass::PlainForeign)
                .flat_map(|entry| entry.commands())
                .map(move |command| (event.to_string(), command.to_string()))
        })
        .collect()
}

fn print_report(report: &InstallReport, root: &Path, uninstall: bool) {
    let shown = display_path(&report.settings_path, root);
    let action = if uninstall { "Uninstalled" } else { "Installed" };

    match &report.settings {
        IdempotentResult::Changed | IdempotentResult::Unchanged => {
            println!("{} cc-obs hooks in {}", action, shown);
        }
        IdempotentResult::WouldChange(what) => println!("{}", what),
        IdempotentResult::NotApplicable(why) => {
            println!("{} {}", "Skipped:".yellow(), why);
        }
    }

    for (path, outcome) in &report.agents {
        let shown = display_path(path, root);
        match outcome {
            AgentRewrite::Rewritten(_) if uninstall => println!("Unwrapped hooks in {}", shown),
            AgentRewrite::Rewritten(_) => println!("Wrapped hooks in {}", shown),
            _ => debug!(path = %shown, ?outcome, "agent file unchanged"),
        }
    }
}
