use std::path::Path;

use chrono::{Local, Utc};

use crate::cli::context::{CliMode, CommandError, CommandResult, ShellContext};
use crate::cli::output::{self, Alignment, Table};
use crate::core::{history, ClosureCalculator};
use crate::domain::RawInputs;
use crate::export;
use crate::storage::{LedgerStore, LoadOutcome};

use super::CommandDefinition;

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new(
            "save",
            "Compute the closure and append it to the ledger",
            "save",
            cmd_save,
        ),
        CommandDefinition::new(
            "history",
            "Show the most recent saved closures",
            "history",
            cmd_history,
        ),
        CommandDefinition::new(
            "export",
            "Export the ledger as a table or as raw JSON",
            "export <csv|json> <path>",
            cmd_export,
        ),
        CommandDefinition::new(
            "clear",
            "Delete every saved closure (asks for confirmation)",
            "clear [confirm|cancel]",
            cmd_clear,
        ),
    ]
}

fn cmd_save(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let calculation = ClosureCalculator::compute(&context.form)?;
    for warning in calculation.warnings() {
        output::warning(warning);
    }
    let record = calculation.finalize(Utc::now());
    let count = context.store.append(&record)?;

    let money = context.config.money_format();
    output::success(format!(
        "Closure saved ({} in ledger). Revenue {} | Costs {} | Owed to partner {}",
        count,
        money.display(record.total_revenue),
        money.display(record.total_costs),
        money.display(record.total_owed_to_partner)
    ));
    context.form = RawInputs::zeroed();
    Ok(())
}

/// Loads the ledger, surfacing unreadable content as a warning.
fn load_for_view(context: &ShellContext) -> Vec<crate::domain::ClosureRecord> {
    let outcome = context.store.load();
    if let LoadOutcome::Unreadable { reason } = &outcome {
        output::warning(format!(
            "Ledger `{}` could not be read ({}); showing it as empty.",
            context.store.path().display(),
            reason
        ));
    }
    outcome.into_records()
}

fn cmd_history(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let records = load_for_view(context);
    if records.is_empty() {
        output::info("No closures saved yet.");
        return Ok(());
    }

    let money = context.config.money_format();
    let recent = history::recent(&records, context.config.history_limit);
    output::section(format!(
        "Last {} of {} closures",
        recent.len(),
        records.len()
    ));
    let mut table = Table::new(&[
        ("Date", Alignment::Left),
        ("Revenue", Alignment::Right),
        ("Costs", Alignment::Right),
        ("Owed to partner", Alignment::Right),
    ]);
    for record in recent {
        table.push(vec![
            record
                .timestamp
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M")
                .to_string(),
            money.display(record.total_revenue),
            money.display(record.total_costs),
            money.display(record.total_owed_to_partner),
        ]);
    }
    output::render_table(&table);
    Ok(())
}

fn cmd_export(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [format, path] = args else {
        return Err(CommandError::InvalidArguments(
            "usage: export <csv|json> <path>".into(),
        ));
    };
    let path = Path::new(path);
    let data = match format.to_ascii_lowercase().as_str() {
        "csv" => {
            let records = load_for_view(context);
            export::to_csv(&records, &context.config.csv_options())?.into_bytes()
        }
        "json" => export::raw_json(&context.store)?,
        other => {
            return Err(CommandError::InvalidArguments(format!(
                "Unknown export format `{other}`; use `csv` or `json`."
            )))
        }
    };
    export::write_export(path, &data)?;
    output::success(format!("Exported to {}", path.display()));
    Ok(())
}

fn cmd_clear(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args {
        [] => request_clear(context),
        ["confirm"] => execute_clear(context),
        ["cancel"] => {
            if context.clear_flow.is_pending() {
                context.clear_flow.cancel();
                context.clear_flow.reset();
                output::info("Ledger clear cancelled.");
            } else {
                output::info("No ledger clear pending.");
            }
            Ok(())
        }
        _ => Err(CommandError::InvalidArguments(
            "usage: clear [confirm|cancel]".into(),
        )),
    }
}

fn request_clear(context: &mut ShellContext) -> CommandResult {
    let outcome = context.store.load();
    let count = match &outcome {
        LoadOutcome::Loaded(records) => records.len(),
        LoadOutcome::Missing => 0,
        LoadOutcome::Unreadable { .. } => {
            output::warning("The ledger is unreadable; clearing replaces it with an empty one.");
            1
        }
    };
    if count == 0 {
        output::info("The ledger is already empty.");
        return Ok(());
    }

    context.clear_flow.request();
    output::warning(format!(
        "This permanently deletes every saved closure in {}. This cannot be undone.",
        context.store.path().display()
    ));

    if context.mode() == CliMode::Interactive {
        if context.confirm("Delete ALL saved closures?")? {
            return execute_clear(context);
        }
        context.clear_flow.cancel();
        context.clear_flow.reset();
        output::info("Ledger clear cancelled.");
        return Ok(());
    }

    output::hint("Run `clear confirm` to proceed or `clear cancel` to keep the ledger.");
    Ok(())
}

fn execute_clear(context: &mut ShellContext) -> CommandResult {
    let Some(authorization) = context.clear_flow.confirm() else {
        return Err(CommandError::Message(
            "No ledger clear pending. Run `clear` first.".into(),
        ));
    };
    let result = context.store.clear(authorization);
    context.clear_flow.reset();
    result?;
    output::success("Ledger cleared.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::cli::context::test_support::script_context;
    use crate::core::ConfirmState;
    use crate::storage::LedgerStore;

    #[test]
    fn save_appends_and_resets_form() {
        let (mut context, _temp) = script_context();
        context.process_line("set barCash 40").unwrap();
        context.process_line("save").unwrap();
        context.process_line("save").unwrap();

        let records = context.store.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].total_revenue, rust_decimal::Decimal::from(40));
        assert_eq!(records[1].total_revenue, rust_decimal::Decimal::ZERO);
    }

    #[test]
    fn invalid_form_is_not_saved() {
        let (mut context, _temp) = script_context();
        context.process_line("set vat abc").unwrap();
        assert!(context.process_line("save").is_err());
        assert!(context.store.records().is_empty());
    }

    #[test]
    fn clear_needs_two_steps() {
        let (mut context, _temp) = script_context();
        context.process_line("save").unwrap();

        assert!(context.process_line("clear confirm").is_err());
        assert_eq!(context.store.records().len(), 1);

        context.process_line("clear").unwrap();
        assert_eq!(context.clear_flow.state(), ConfirmState::ConfirmRequested);
        context.process_line("clear confirm").unwrap();
        assert!(context.store.records().is_empty());
        assert_eq!(context.clear_flow.state(), ConfirmState::Idle);
    }

    #[test]
    fn any_other_command_cancels_pending_clear() {
        let (mut context, _temp) = script_context();
        context.process_line("save").unwrap();
        context.process_line("clear").unwrap();
        context.process_line("history").unwrap();
        assert_eq!(context.clear_flow.state(), ConfirmState::Idle);
        assert!(context.process_line("clear confirm").is_err());
        assert_eq!(context.store.records().len(), 1);
    }
}
