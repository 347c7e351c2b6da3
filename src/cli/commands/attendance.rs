use attend_core::{parse_credits, parse_hours};
use attend_domain::AttendanceEntry;

use crate::cli::context::{CommandResult, ShellContext};
use crate::cli::output::{self, Table, TableColumn};
use crate::cli::registry::CommandEntry;
use crate::identity::Session;

use super::{parse_date, require_args, short_id};

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "mark",
            "Record hours of absence for a subject",
            "mark <subject> <hours> [YYYY-MM-DD]",
            cmd_mark,
        ),
        CommandEntry::new(
            "absent",
            "Record an absence, creating the subject if needed",
            "absent <name> <credits> <hours> [YYYY-MM-DD]",
            cmd_absent,
        ),
        CommandEntry::new(
            "edit-entry",
            "Change the hours of a history entry",
            "edit-entry <entry> <hours>",
            cmd_edit_entry,
        ),
        CommandEntry::new(
            "delete-entry",
            "Remove a history entry",
            "delete-entry <entry>",
            cmd_delete_entry,
        ),
        CommandEntry::new(
            "history",
            "Show the attendance log, newest first",
            "history [subject]",
            cmd_history,
        ),
    ]
}

fn cmd_mark(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    require_args(args, 2, "mark <subject> <hours> [YYYY-MM-DD]")?;
    let session = context.session()?;
    let subject_id = context.tracker.resolve_subject(session, args[0])?;
    let hours = parse_hours(args[1])?;
    let date = parse_date(args.get(2))?;
    let entry = context
        .tracker
        .mark_attendance(session, subject_id, hours, date)?;
    report_marked(context, session, &entry)
}

fn cmd_absent(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    require_args(args, 3, "absent <name> <credits> <hours> [YYYY-MM-DD]")?;
    let session = context.session()?;
    let credits = parse_credits(args[1])?;
    let hours = parse_hours(args[2])?;
    let date = parse_date(args.get(3))?;
    let entry = context
        .tracker
        .record_absence(session, args[0], credits, hours, date)?;
    report_marked(context, session, &entry)
}

fn report_marked(context: &ShellContext, session: &Session, entry: &AttendanceEntry) -> CommandResult {
    let status = context.tracker.subject_status(session, entry.subject_id)?;
    output::success(format!(
        "Marked {} h absent for {} on {} (entry {}, {} h left).",
        entry.hours,
        status.name,
        entry.date,
        short_id(entry.id),
        status.remaining_hours
    ));
    if status.is_critical {
        output::warning(output::critical(format!(
            "{} is over its leave budget by {} h.",
            status.name, -status.remaining_hours
        )));
    }
    Ok(())
}

fn cmd_edit_entry(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    require_args(args, 2, "edit-entry <entry> <hours>")?;
    let session = context.session()?;
    let entry_id = context.tracker.resolve_entry(session, args[0])?;
    let hours = parse_hours(args[1])?;
    let update = context.tracker.update_attendance(session, entry_id, hours)?;
    output::success(format!(
        "Entry {} changed from {} h to {} h.",
        short_id(entry_id),
        update.previous_hours,
        update.entry.hours
    ));
    if !update.aggregate_applied {
        output::warning("The entry's subject no longer exists; no totals changed.");
    }
    if let Some(subject) = update.pruned_subject {
        output::info(format!("Subject `{}` has no absences left and was removed.", subject.name));
    }
    Ok(())
}

fn cmd_delete_entry(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    require_args(args, 1, "delete-entry <entry>")?;
    let session = context.session()?;
    let entry_id = context.tracker.resolve_entry(session, args[0])?;
    let removal = context.tracker.delete_attendance(session, entry_id)?;
    output::success(format!(
        "Entry {} ({} h on {}) deleted.",
        short_id(entry_id),
        removal.entry.hours,
        removal.entry.date
    ));
    if let Some(subject) = removal.pruned_subject {
        output::info(format!("Subject `{}` has no absences left and was removed.", subject.name));
    }
    Ok(())
}

fn cmd_history(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let session = context.session()?;
    let rows = match args.first() {
        Some(reference) => {
            let subject_id = context.tracker.resolve_subject(session, reference)?;
            context.tracker.history_for(session, subject_id)?
        }
        None => context.tracker.history(session)?,
    };
    if rows.is_empty() {
        output::info("No absences recorded.");
        return Ok(());
    }

    let name_width = rows
        .iter()
        .filter_map(|row| row.subject_name.as_ref().map(String::len))
        .max()
        .unwrap_or(0)
        .max("Subject".len());
    let mut table = Table::new(
        Some("History"),
        vec![
            TableColumn::new("Entry", 8),
            TableColumn::new("Date", 10),
            TableColumn::new("Subject", name_width),
            TableColumn::new("Hours", 5),
        ],
    );
    for row in rows {
        table.add_row(vec![
            short_id(row.entry_id),
            row.date.to_string(),
            row.subject_name.unwrap_or_else(|| "(deleted)".into()),
            row.hours.to_string(),
        ]);
    }
    table.print();
    Ok(())
}
