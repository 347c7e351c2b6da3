use attend_core::{max_leave_hours, parse_credits};
use attend_domain::SubjectStatus;

use crate::cli::context::{CommandResult, ShellContext};
use crate::cli::output::{self, Table, TableColumn};
use crate::cli::registry::CommandEntry;

use super::{require_args, short_id};

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "subjects",
            "List subjects with their remaining leave",
            "subjects",
            cmd_subjects,
        ),
        CommandEntry::new(
            "add-subject",
            "Add a subject with its credit weight",
            "add-subject <name> <credits>",
            cmd_add_subject,
        ),
        CommandEntry::new(
            "edit-subject",
            "Rename or re-weight a subject",
            "edit-subject <subject> <name> <credits>",
            cmd_edit_subject,
        ),
        CommandEntry::new(
            "delete-subject",
            "Delete a subject and all of its entries",
            "delete-subject <subject>",
            cmd_delete_subject,
        ),
    ]
}

/// Renders subject statuses, highlighting the ones over budget.
pub(crate) fn status_table(title: &str, statuses: &[SubjectStatus]) -> Table {
    let name_width = statuses
        .iter()
        .map(|status| status.name.len())
        .max()
        .unwrap_or(0)
        .max("Subject".len());
    let mut table = Table::new(
        Some(title),
        vec![
            TableColumn::new("Id", 8),
            TableColumn::new("Subject", name_width),
            TableColumn::new("Credits", 7),
            TableColumn::new("Absent", 6),
            TableColumn::new("Max", 4),
            TableColumn::new("Left", 5),
            TableColumn::new("Status", 13),
        ],
    );
    for status in statuses {
        let cells = vec![
            short_id(status.subject_id),
            status.name.clone(),
            format!("{}", status.credits),
            status.hours_absent.to_string(),
            status.max_leave.to_string(),
            status.remaining_hours.to_string(),
            status.standing().to_string(),
        ];
        if status.is_critical {
            table.add_highlighted_row(cells);
        } else {
            table.add_row(cells);
        }
    }
    table
}

fn cmd_subjects(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let session = context.session()?;
    let statuses = context.tracker.subjects(session)?;
    if statuses.is_empty() {
        output::info("No subjects yet. Use `add-subject <name> <credits>`.");
        return Ok(());
    }
    status_table("Subjects", &statuses).print();
    Ok(())
}

fn cmd_add_subject(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    require_args(args, 2, "add-subject <name> <credits>")?;
    let session = context.session()?;
    let credits = parse_credits(args[1])?;
    let subject = context.tracker.add_subject(session, args[0], credits)?;
    output::success(format!(
        "Subject `{}` added ({} credits, {} h of leave).",
        subject.name,
        subject.credits,
        max_leave_hours(subject.credits)?
    ));
    Ok(())
}

fn cmd_edit_subject(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    require_args(args, 3, "edit-subject <subject> <name> <credits>")?;
    let session = context.session()?;
    let subject_id = context.tracker.resolve_subject(session, args[0])?;
    let credits = parse_credits(args[2])?;
    let subject = context
        .tracker
        .edit_subject(session, subject_id, args[1], credits)?;
    let status = context.tracker.subject_status(session, subject.id)?;
    output::success(format!(
        "Subject `{}` updated ({} credits, {} h left).",
        subject.name, subject.credits, status.remaining_hours
    ));
    Ok(())
}

fn cmd_delete_subject(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    require_args(args, 1, "delete-subject <subject>")?;
    let session = context.session()?;
    let subject_id = context.tracker.resolve_subject(session, args[0])?;
    let ledger = context.tracker.ledger(session)?;
    let entries = ledger.entries_for(subject_id).count();
    let name = ledger
        .subject(subject_id)
        .map(|subject| subject.name.clone())
        .unwrap_or_default();

    if !context.confirm(&format!(
        "Delete subject `{name}` and its {entries} entr{}?",
        if entries == 1 { "y" } else { "ies" }
    ))? {
        output::info("Operation cancelled.");
        return Ok(());
    }

    let removal = context.tracker.delete_subject(session, subject_id)?;
    output::success(format!(
        "Subject `{}` deleted with {} entr{}.",
        removal.subject.name,
        removal.removed_entries,
        if removal.removed_entries == 1 { "y" } else { "ies" }
    ));
    Ok(())
}
