use crate::cli::output::{self, Table, TableColumn};
use crate::cli::registry::{CommandEntry, CommandRegistry};

pub fn print_overview(registry: &CommandRegistry) {
    let width = registry
        .names()
        .map(str::len)
        .max()
        .unwrap_or(8)
        .max("Command".len());
    let mut table = Table::new(
        Some("Available commands"),
        vec![
            TableColumn::new("Command", width),
            TableColumn::new("Description", 48),
        ],
    );
    for entry in registry.list() {
        table.add_row(vec![entry.name, entry.description]);
    }
    table.print();
    output::hint("Use `help <command>` for details.");
}

pub fn print_command(entry: &CommandEntry) {
    output::section(format!("Help: {}", entry.name));
    println!("  description: {}", entry.description);
    println!("  usage:       {}", entry.usage);
}
