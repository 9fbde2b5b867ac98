use crate::cli::context::{CommandError, CommandResult, ShellContext};
use crate::cli::output::{self, Alignment, Table};
use crate::core::ClosureCalculator;
use crate::domain::{catalog_item, InputField, RawInputs, CONSUMPTION_CATALOG};

use super::{closest, CommandDefinition};

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new(
            "set",
            "Set a takings or cost field",
            "set <field> <amount>",
            cmd_set,
        ),
        CommandDefinition::new(
            "item",
            "Set unit price and quantity of a bar item",
            "item <name> <price> <quantity>",
            cmd_item,
        ),
        CommandDefinition::new("note", "Set the closure notes", "note [text...]", cmd_note),
        CommandDefinition::new("form", "Show the current form values", "form", cmd_form),
        CommandDefinition::new(
            "summary",
            "Show revenue, costs and the partner-owed total",
            "summary",
            cmd_summary,
        ),
        CommandDefinition::new("reset", "Reset every form field to zero", "reset", cmd_reset),
    ]
}

fn cmd_set(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [key, value] = args else {
        return Err(CommandError::InvalidArguments(
            "usage: set <field> <amount>".into(),
        ));
    };
    let Some(field) = InputField::from_key(key) else {
        let mut message = format!("Unknown field `{key}`.");
        if let Some(best) = closest(key, InputField::ALL.iter().map(|field| field.key())) {
            message.push_str(&format!(" Did you mean `{best}`?"));
        }
        return Err(CommandError::InvalidArguments(message));
    };
    context.form.set(field, *value);
    context.show_summary();
    Ok(())
}

fn cmd_item(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.len() < 3 {
        return Err(CommandError::InvalidArguments(
            "usage: item <name> <price> <quantity>".into(),
        ));
    }
    let (name_parts, figures) = args.split_at(args.len() - 2);
    let name = name_parts.join(" ");
    let Some(item) = catalog_item(&name) else {
        return Err(CommandError::InvalidArguments(format!(
            "Unknown item `{}`. Known items: {}.",
            name,
            CONSUMPTION_CATALOG.join(", ")
        )));
    };
    context.form.set_consumption(item, figures[0], figures[1]);
    context.show_summary();
    Ok(())
}

fn cmd_note(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let text = args.join(" ");
    if text.is_empty() {
        output::info("Notes cleared.");
    } else {
        output::info("Notes updated.");
    }
    context.form.set_notes(text);
    Ok(())
}

fn cmd_form(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    output::section("Closing form");
    let mut fields = Table::new(&[
        ("Field", Alignment::Left),
        ("Key", Alignment::Left),
        ("Value", Alignment::Right),
    ]);
    for field in InputField::ALL {
        fields.push(vec![
            field.label().to_string(),
            field.key().to_string(),
            context.form.get(field).unwrap_or("-").to_string(),
        ]);
    }
    output::render_table(&fields);

    let computed = ClosureCalculator::compute(&context.form).ok();
    let money = context.config.money_format();
    let mut items = Table::new(&[
        ("Item", Alignment::Left),
        ("Price", Alignment::Right),
        ("Qty", Alignment::Right),
        ("Total", Alignment::Right),
    ]);
    for item in CONSUMPTION_CATALOG {
        let raw = context.form.consumption(item);
        let line_total = computed
            .as_ref()
            .and_then(|calc| calc.consumption_items().iter().find(|line| line.name == item))
            .map(|line| money.display(line.line_total))
            .unwrap_or_else(|| "-".into());
        items.push(vec![
            item.to_string(),
            raw.and_then(|raw| raw.unit_price.clone()).unwrap_or_else(|| "-".into()),
            raw.and_then(|raw| raw.quantity.clone()).unwrap_or_else(|| "-".into()),
            line_total,
        ]);
    }
    println!();
    output::render_table(&items);

    if !context.form.notes.is_empty() {
        output::info(format!("Notes: {}", context.form.notes));
    }
    context.show_summary();
    Ok(())
}

fn cmd_summary(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    context.show_summary();
    Ok(())
}

fn cmd_reset(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    context.form = RawInputs::zeroed();
    output::info("Form reset.");
    context.show_summary();
    Ok(())
}
