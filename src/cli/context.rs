use std::io;

use dialoguer::{theme::ColorfulTheme, Confirm};
use rustyline::error::ReadlineError;
use thiserror::Error;

use crate::{
    config::{Config, ConfigManager},
    core::{ClearConfirmation, ClosureCalculator},
    domain::RawInputs,
    errors::CloseError,
    storage::JsonLedgerStore,
};

use super::commands::{self, closest, CommandDefinition, CommandRegistry};
use super::output;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Core(#[from] CloseError),
    #[error(transparent)]
    Dialoguer(#[from] dialoguer::Error),
    #[error("exit requested")]
    ExitRequested,
}

pub type CommandResult = Result<(), CommandError>;

/// Errors that end the shell itself.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] CloseError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Readline(#[from] ReadlineError),
}

/// State of one shell session: the in-progress form, the clear confirmation
/// flow and handles on configuration and the ledger.
pub struct ShellContext {
    mode: CliMode,
    pub(crate) registry: CommandRegistry,
    pub(crate) config_manager: ConfigManager,
    pub(crate) config: Config,
    pub(crate) store: JsonLedgerStore,
    pub(crate) form: RawInputs,
    pub(crate) clear_flow: ClearConfirmation,
    theme: ColorfulTheme,
    pub(crate) running: bool,
}

impl ShellContext {
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        Self::with_config_manager(mode, ConfigManager::new()?)
    }

    pub fn with_config_manager(
        mode: CliMode,
        config_manager: ConfigManager,
    ) -> Result<Self, CliError> {
        if mode == CliMode::Script {
            colored::control::set_override(false);
        }
        let config = config_manager.load()?;
        let store = JsonLedgerStore::new(config_manager.ledger_path(&config))?;
        tracing::debug!(ledger = %store.path().display(), "shell session opened");

        Ok(Self {
            mode,
            registry: CommandRegistry::new(commands::all_definitions()),
            config_manager,
            config,
            store,
            form: RawInputs::zeroed(),
            clear_flow: ClearConfirmation::new(),
            theme: ColorfulTheme::default(),
            running: true,
        })
    }

    pub fn mode(&self) -> CliMode {
        self.mode
    }

    pub(crate) fn command_names(&self) -> Vec<&'static str> {
        self.registry.names().collect()
    }

    pub(crate) fn command(&self, name: &str) -> Option<&CommandDefinition> {
        self.registry.get(name)
    }

    pub(crate) fn prompt(&self) -> String {
        if self.clear_flow.is_pending() {
            "close (confirm clear?)> ".into()
        } else {
            "close> ".into()
        }
    }

    pub(crate) fn dispatch(&mut self, command: &str, raw: &str, args: &[&str]) -> Result<LoopControl, CommandError> {
        if self.clear_flow.is_pending() && command != "clear" {
            self.clear_flow.cancel();
            self.clear_flow.reset();
            output::info("Pending ledger clear cancelled.");
        }

        let Some(handler) = self.registry.get(command).map(|definition| definition.handler) else {
            self.suggest_command(raw);
            return Ok(LoopControl::Continue);
        };
        match handler(self, args) {
            Ok(()) => Ok(LoopControl::Continue),
            Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
            Err(err) => Err(err),
        }
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        output::warning(format!(
            "Unknown command `{}`. Type `help` to see available commands.",
            input
        ));
        if let Some(best) = closest(input, self.registry.names()) {
            output::hint(format!("Did you mean `{}`?", best));
        }
    }

    pub(crate) fn report_error(&self, err: CommandError) {
        match err {
            CommandError::ExitRequested => {}
            CommandError::InvalidArguments(message) => {
                output::error(message);
                output::hint("Use `help <command>` for usage details.");
            }
            other => output::error(other),
        }
    }

    pub(crate) fn confirm(&self, prompt: &str) -> Result<bool, CommandError> {
        Confirm::with_theme(&self.theme)
            .with_prompt(prompt)
            .default(false)
            .interact()
            .map_err(CommandError::from)
    }

    pub(crate) fn confirm_exit(&self) -> Result<bool, CommandError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        self.confirm("Exit shell? Unsaved form values will be lost")
    }

    /// Reprints the live summary; validation problems are shown instead.
    pub(crate) fn show_summary(&self) {
        match ClosureCalculator::compute(&self.form) {
            Ok(calc) => {
                let money = self.config.money_format();
                let summary = calc.summary();
                output::info(format!(
                    "Revenue {} | Costs {} | Owed to partner {}",
                    money.display(summary.total_revenue),
                    money.display(summary.total_costs),
                    money.display(summary.total_owed_to_partner)
                ));
                for warning in calc.warnings() {
                    output::warning(warning);
                }
            }
            Err(err) => output::warning(format!("Summary unavailable: {err}")),
        }
    }

    /// Persists configuration and reopens the ledger it points at.
    pub(crate) fn apply_config(&mut self, config: Config) -> CommandResult {
        self.config_manager.save(&config)?;
        self.store = JsonLedgerStore::new(self.config_manager.ledger_path(&config))?;
        self.config = config;
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn process_line(&mut self, line: &str) -> Result<LoopControl, CommandError> {
        let tokens = match super::shell::parse_command_line(line) {
            Ok(tokens) => tokens,
            Err(err) => return Err(CommandError::InvalidArguments(err.to_string())),
        };
        let Some((raw, rest)) = tokens.split_first() else {
            return Ok(LoopControl::Continue);
        };
        let args: Vec<&str> = rest.iter().map(String::as_str).collect();
        self.dispatch(&raw.to_lowercase(), raw, &args)
    }
}
