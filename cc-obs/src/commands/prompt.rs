//! Interactive install flow.
//!
//! Asks where to write hooks, which existing commands to wrap and which agent
//! files to wrap. Every prompt goes through [`Prompter`] so the flow can be
//! driven by a script in tests.

use super::helpers::display_path;
use super::install::{
    AgentChoice, HookWrapChoice, InstallConfig, discover_agents, foreign_commands,
};
use anyhow::{Context, Result};
use cc_obs_common::{
    AgentFile, CommandNames, SettingsDocument, SettingsScope, read_optional, settings_path,
};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, MultiSelect, Select};
use std::path::Path;

/// Source of answers for the install flow. `None` means the user cancelled.
pub trait Prompter {
    fn select(&self, prompt: &str, items: &[String], default: usize) -> Result<Option<usize>>;
    fn confirm(&self, prompt: &str, default: bool) -> Result<Option<bool>>;
    /// Free text; empty when skipped.
    fn input(&self, prompt: &str) -> Result<String>;
    fn multi_select(&self, prompt: &str, items: &[String]) -> Result<Option<Vec<usize>>>;
}

/// Terminal prompts.
#[derive(Default)]
pub struct DialoguerPrompter {
    theme: ColorfulTheme,
}

impl DialoguerPrompter {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }
}

impl Prompter for DialoguerPrompter {
    fn select(&self, prompt: &str, items: &[String], default: usize) -> Result<Option<usize>> {
        Select::with_theme(&self.theme)
            .with_prompt(prompt)
            .items(items)
            .default(default)
            .interact_opt()
            .context("Failed to read selection")
    }

    fn confirm(&self, prompt: &str, default: bool) -> Result<Option<bool>> {
        Confirm::with_theme(&self.theme)
            .with_prompt(prompt)
            .default(default)
            .interact_opt()
            .context("Failed to read confirmation")
    }

    fn input(&self, prompt: &str) -> Result<String> {
        Input::<String>::with_theme(&self.theme)
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()
            .map(|s| s.trim().to_string())
            .context("Failed to read input")
    }

    fn multi_select(&self, prompt: &str, items: &[String]) -> Result<Option<Vec<usize>>> {
        MultiSelect::with_theme(&self.theme)
            .with_prompt(prompt)
            .items(items)
            .interact_opt()
            .context("Failed to read selection")
    }
}

const SCOPE_CHOICES: [(&str, SettingsScope); 2] = [
    ("settings.local.json (gitignored)", SettingsScope::Local),
    ("settings.json (shared)", SettingsScope::Project),
];

/// Run the interactive flow. `Ok(None)` when the user cancelled.
///
/// `scope` skips the first question when a scope flag was given.
pub fn gather_choices(
    prompter: &dyn Prompter,
    root: &Path,
    scope: Option<SettingsScope>,
) -> Result<Option<InstallConfig>> {
    let scope = match scope {
        Some(scope) => scope,
        None => {
            let items: Vec<String> = SCOPE_CHOICES.iter().map(|(l, _)| l.to_string()).collect();
            let Some(index) = prompter.select("Where should cc-obs write hooks?", &items, 0)?
            else {
                return Ok(None);
            };
            SCOPE_CHOICES[index].1
        }
    };

    let path = settings_path(root, scope);
    let hooks = match read_optional(&path)? {
        Some(text) => SettingsDocument::parse(&text, &path)?.hooks()?,
        None => Default::default(),
    };

    let mut hook_choices = Vec::new();
    for (event, command) in foreign_commands(&hooks) {
        let Some(wrap) = prompter.confirm(&format!("Wrap existing hook? [{event}] {command}"), true)?
        else {
            return Ok(None);
        };
        let name = if wrap {
            prompter.input(&format!("  Display name for '{command}' (enter to skip)"))?
        } else {
            String::new()
        };
        hook_choices.push(HookWrapChoice {
            event,
            command,
            wrap,
            name,
        });
    }

    let Some(agents) = ask_agents(prompter, root)? else {
        return Ok(None);
    };

    Ok(Some(InstallConfig {
        scope,
        uninstall: false,
        hook_choices,
        agents,
    }))
}

fn ask_agents(prompter: &dyn Prompter, root: &Path) -> Result<Option<Vec<AgentChoice>>> {
    let paths = discover_agents(root);
    if paths.is_empty() {
        return Ok(Some(Vec::new()));
    }

    let items: Vec<String> = paths.iter().map(|p| display_path(p, root)).collect();
    let Some(selected) = prompter.multi_select("Which agents should cc-obs wrap?", &items)? else {
        return Ok(None);
    };

    let mut choices = Vec::with_capacity(paths.len());
    for (index, path) in paths.into_iter().enumerate() {
        if !selected.contains(&index) {
            choices.push(AgentChoice::new(path, false));
            continue;
        }

        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let hooks = AgentFile::parse(&text)?.hooks()?.unwrap_or_default();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        let mut names = CommandNames::default();
        for (_, command) in foreign_commands(&hooks) {
            let name = prompter.input(&format!(
                "  Display name for '{command}' in {file_name} (enter to skip)"
            ))?;
            if !name.is_empty() {
                names.0.insert(command, name);
            }
        }
        choices.push(AgentChoice {
            path,
            wrap: true,
            names,
        });
    }
    Ok(Some(choices))
}
