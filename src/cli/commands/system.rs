use crate::cli::context::{CommandError, CommandResult, ShellContext};
use crate::cli::output::{self, Alignment, Table};
use crate::utils::build_info;

use super::CommandDefinition;

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new(
            "config",
            "Show or change settings",
            "config [show | path | set <key> <value>]",
            cmd_config,
        ),
        CommandDefinition::new("version", "Show build metadata", "version", cmd_version),
        CommandDefinition::new(
            "help",
            "Show available commands",
            "help [command]",
            cmd_help,
        ),
        CommandDefinition::new("exit", "Exit the shell", "exit", cmd_exit),
    ]
}

fn cmd_config(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args {
        [] | ["show"] => {
            let config = &context.config;
            output::section("Settings");
            let mut table = Table::new(&[("Key", Alignment::Left), ("Value", Alignment::Left)]);
            let rows = [
                (
                    "ledgerFile",
                    context.store.path().display().to_string(),
                ),
                ("currencySymbol", config.currency_symbol.clone()),
                ("csvDelimiter", config.csv_delimiter.to_string()),
                ("decimalSeparator", config.decimal_separator.to_string()),
                (
                    "groupingSeparator",
                    config
                        .grouping_separator
                        .map(|ch| ch.to_string())
                        .unwrap_or_else(|| "none".into()),
                ),
                ("historyLimit", config.history_limit.to_string()),
            ];
            for (key, value) in rows {
                table.push(vec![key.to_string(), value]);
            }
            output::render_table(&table);
            Ok(())
        }
        ["path"] => {
            output::info(format!(
                "App directory: {}",
                context.config_manager.base_dir().display()
            ));
            output::info(format!(
                "Config file: {}",
                context.config_manager.path().display()
            ));
            Ok(())
        }
        ["set", key, value] => {
            let mut updated = context.config.clone();
            updated.set(key, value)?;
            context.apply_config(updated)?;
            output::success(format!("Setting `{key}` updated."));
            Ok(())
        }
        _ => Err(CommandError::InvalidArguments(
            "usage: config [show | path | set <key> <value>]".into(),
        )),
    }
}

fn cmd_version(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let meta = build_info::current();
    output::section(format!("Nightly Close {}", meta.version));
    output::info(format!("  Build hash : {}", meta.git_hash));
    output::info(format!("  Built at   : {}", meta.timestamp));
    output::info(format!("  Target     : {}", meta.target));
    output::info(format!("  Profile    : {}", meta.profile));
    Ok(())
}

fn cmd_help(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if let Some(name) = args.first() {
        match context.command(&name.to_lowercase()) {
            Some(command) => {
                output::section(command.name);
                output::info(command.description);
                output::info(format!("Usage: {}", command.usage));
            }
            None => context.suggest_command(name),
        }
        return Ok(());
    }

    output::section("Commands");
    let mut table = Table::new(&[("Usage", Alignment::Left), ("Description", Alignment::Left)]);
    for command in context.registry.iter() {
        table.push(vec![command.usage.to_string(), command.description.to_string()]);
    }
    output::render_table(&table);
    Ok(())
}

fn cmd_exit(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    Err(CommandError::ExitRequested)
}
