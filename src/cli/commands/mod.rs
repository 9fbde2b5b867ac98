use std::collections::HashMap;

pub mod form;
pub mod ledger;
pub mod system;

use crate::cli::context::{CommandResult, ShellContext};

pub(crate) fn all_definitions() -> Vec<CommandDefinition> {
    let mut commands = Vec::new();
    commands.extend(form::definitions());
    commands.extend(ledger::definitions());
    commands.extend(system::definitions());
    commands
}

pub type CommandHandler = fn(&mut ShellContext, &[&str]) -> CommandResult;

#[derive(Clone)]
pub struct CommandDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub usage: &'static str,
    pub handler: CommandHandler,
}

impl CommandDefinition {
    pub const fn new(
        name: &'static str,
        description: &'static str,
        usage: &'static str,
        handler: CommandHandler,
    ) -> Self {
        Self {
            name,
            description,
            usage,
            handler,
        }
    }
}

pub struct CommandRegistry {
    commands: HashMap<&'static str, CommandDefinition>,
    order: Vec<&'static str>,
}

impl CommandRegistry {
    pub fn new(definitions: Vec<CommandDefinition>) -> Self {
        let mut commands = HashMap::new();
        let mut order = Vec::new();
        for definition in definitions {
            order.push(definition.name);
            commands.insert(definition.name, definition);
        }
        Self { commands, order }
    }

    pub fn get(&self, name: &str) -> Option<&CommandDefinition> {
        self.commands.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CommandDefinition> {
        self.order
            .iter()
            .filter_map(move |name| self.commands.get(name))
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.order.iter().copied()
    }
}

/// Closest candidate within a small edit distance, for "did you mean" hints.
pub(crate) fn closest<'a>(input: &str, candidates: impl IntoIterator<Item = &'a str>) -> Option<&'a str> {
    let needle = input.to_ascii_lowercase();
    candidates
        .into_iter()
        .map(|candidate| (strsim::levenshtein(&needle, &candidate.to_ascii_lowercase()), candidate))
        .filter(|(distance, _)| *distance <= 3)
        .min_by_key(|(distance, _)| *distance)
        .map(|(_, candidate)| candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_preserves_definition_order() {
        let registry = CommandRegistry::new(all_definitions());
        let names: Vec<&str> = registry.names().collect();
        assert_eq!(names.first(), Some(&"set"));
        assert!(names.contains(&"clear"));
        assert!(registry.get("save").is_some());
        assert!(registry.get("delete").is_none());
    }

    #[test]
    fn closest_suggests_near_misses_only() {
        assert_eq!(closest("histroy", ["history", "save"]), Some("history"));
        assert_eq!(closest("walkincash", ["walkInCash", "rent"]), Some("walkInCash"));
        assert_eq!(closest("zzzzzzzz", ["save"]), None);
    }
}
