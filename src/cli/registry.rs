use std::collections::HashMap;

use strsim::levenshtein;

use crate::cli::context::{CommandResult, ShellContext};

pub type CommandHandler = fn(&mut ShellContext, &[&str]) -> CommandResult;

/// Largest edit distance still offered as a "did you mean" suggestion.
const MAX_SUGGESTION_DISTANCE: usize = 3;

pub struct CommandEntry {
    pub name: &'static str,
    pub description: &'static str,
    pub usage: &'static str,
    pub handler: CommandHandler,
}

impl CommandEntry {
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

/// Command table keyed by lowercase name, remembering registration order.
#[derive(Default)]
pub struct CommandRegistry {
    commands: HashMap<&'static str, CommandEntry>,
    order: Vec<&'static str>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, entry: CommandEntry) {
        let name = entry.name;
        if self.commands.insert(name, entry).is_none() {
            self.order.push(name);
        }
    }

    pub fn get(&self, name: &str) -> Option<&CommandEntry> {
        self.commands.get(name)
    }

    pub fn list(&self) -> Vec<&CommandEntry> {
        self.order
            .iter()
            .filter_map(|name| self.commands.get(name))
            .collect()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.order.iter().copied()
    }

    pub fn handler(&self, name: &str) -> Option<CommandHandler> {
        self.commands.get(name).map(|entry| entry.handler)
    }

    /// Closest registered name to `input`, if any is near enough.
    pub fn suggest(&self, input: &str) -> Option<&'static str> {
        let input = input.to_lowercase();
        self.names()
            .map(|name| (levenshtein(name, &input), name))
            .filter(|(distance, _)| *distance <= MAX_SUGGESTION_DISTANCE)
            .min_by_key(|(distance, _)| *distance)
            .map(|(_, name)| name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
        Ok(())
    }

    fn registry() -> CommandRegistry {
        let mut registry = CommandRegistry::new();
        registry.register(CommandEntry::new("summary", "", "summary", noop));
        registry.register(CommandEntry::new("subjects", "", "subjects", noop));
        registry.register(CommandEntry::new("mark", "", "mark", noop));
        registry
    }

    #[test]
    fn registration_order_is_preserved() {
        let names: Vec<_> = registry().names().collect();
        assert_eq!(names, vec!["summary", "subjects", "mark"]);
    }

    #[test]
    fn suggests_nearby_names_only() {
        let registry = registry();
        assert_eq!(registry.suggest("sumary"), Some("summary"));
        assert_eq!(registry.suggest("MARKK"), Some("mark"));
        assert_eq!(registry.suggest("backup-everything"), None);
    }
}
