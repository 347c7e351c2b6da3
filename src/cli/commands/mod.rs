pub mod attendance;
pub mod config;
pub mod data;
pub mod report;
pub mod student;
pub mod subject;
pub mod system;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::cli::context::CommandError;
use crate::cli::registry::{CommandEntry, CommandRegistry};

const ROOT_COMMAND_ORDER: &[&str] = &[
    "whoami",
    "student",
    "students",
    "subjects",
    "add-subject",
    "edit-subject",
    "delete-subject",
    "mark",
    "absent",
    "edit-entry",
    "delete-entry",
    "history",
    "summary",
    "audit",
    "export",
    "import",
    "backup",
    "backups",
    "restore",
    "config",
    "help",
    "version",
    "exit",
];

pub(crate) fn all_entries() -> Vec<CommandEntry> {
    let mut commands = Vec::new();
    commands.extend(student::definitions());
    commands.extend(subject::definitions());
    commands.extend(attendance::definitions());
    commands.extend(report::definitions());
    commands.extend(data::definitions());
    commands.extend(config::definitions());
    commands.extend(system::definitions());
    commands
}

pub(crate) fn register_all(registry: &mut CommandRegistry) {
    let mut entries = all_entries();
    entries.sort_by_key(|entry| {
        ROOT_COMMAND_ORDER
            .iter()
            .position(|name| entry.name.eq_ignore_ascii_case(name))
            .unwrap_or(ROOT_COMMAND_ORDER.len())
    });
    for entry in entries {
        registry.register(entry);
    }
}

pub(crate) fn require_args(args: &[&str], count: usize, usage: &str) -> Result<(), CommandError> {
    if args.len() < count {
        return Err(CommandError::InvalidArguments(format!("usage: {usage}")));
    }
    Ok(())
}

/// Parses an optional `YYYY-MM-DD` argument.
pub(crate) fn parse_date(raw: Option<&&str>) -> Result<Option<NaiveDate>, CommandError> {
    raw.map(|value| {
        NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
            CommandError::InvalidArguments(format!("invalid date `{value}`, expected YYYY-MM-DD"))
        })
    })
    .transpose()
}

pub(crate) fn short_id(id: Uuid) -> String {
    id.simple().to_string()[..8].to_string()
}
