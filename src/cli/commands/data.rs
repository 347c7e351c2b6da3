use std::path::Path;

use attend_storage_json::{load_snapshot_from_path, save_snapshot_to_path};

use crate::cli::context::{CommandError, CommandResult, ShellContext};
use crate::cli::output::{self, Table, TableColumn};
use crate::cli::registry::CommandEntry;

use super::require_args;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "export",
            "Write every stored ledger to a snapshot file",
            "export <file.json>",
            cmd_export,
        ),
        CommandEntry::new(
            "import",
            "Replace all stored ledgers from a snapshot file",
            "import <file.json>",
            cmd_import,
        ),
        CommandEntry::new(
            "backup",
            "Back up the current student's ledger",
            "backup [note]",
            cmd_backup,
        ),
        CommandEntry::new(
            "backups",
            "List backups of the current student's ledger",
            "backups",
            cmd_backups,
        ),
        CommandEntry::new(
            "restore",
            "Restore the current student's ledger from a backup",
            "restore <backup>",
            cmd_restore,
        ),
    ]
}

fn cmd_export(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    require_args(args, 1, "export <file.json>")?;
    let path = Path::new(args[0]);
    let snapshot = context.tracker.export_all()?;
    save_snapshot_to_path(&snapshot, path)?;
    output::success(format!(
        "Exported {} ledger{} to {}.",
        snapshot.len(),
        if snapshot.len() == 1 { "" } else { "s" },
        path.display()
    ));
    Ok(())
}

fn cmd_import(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    require_args(args, 1, "import <file.json>")?;
    let path = Path::new(args[0]);
    let snapshot = load_snapshot_from_path(path)?;
    if !context.confirm(&format!(
        "Replace all stored ledgers with the {} in {}?",
        snapshot.len(),
        path.display()
    ))? {
        output::info("Operation cancelled.");
        return Ok(());
    }
    let report = context.tracker.import_all(snapshot)?;
    for warning in &report.warnings {
        output::warning(warning);
    }
    output::success(format!(
        "Imported {} ledger(s), removed {}.",
        report.imported, report.removed
    ));
    Ok(())
}

fn cmd_backup(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let session = context.session()?;
    let note = (!args.is_empty()).then(|| args.join(" "));
    let info = context
        .storage
        .backup_ledger(session.student_id().as_str(), note.as_deref())?;
    output::success(format!("Backup `{}` created.", info.id));
    Ok(())
}

fn cmd_backups(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let session = context.session()?;
    let backups = context.storage.list_backups(session.student_id().as_str())?;
    if backups.is_empty() {
        output::info("No backups yet.");
        return Ok(());
    }
    let id_width = backups.iter().map(|info| info.id.len()).max().unwrap_or(0);
    let mut table = Table::new(
        Some("Backups"),
        vec![
            TableColumn::new("Backup", id_width),
            TableColumn::new("Created (UTC)", 19),
        ],
    );
    for info in &backups {
        let created = info
            .created_at
            .map(|at| at.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "unknown".into());
        table.add_row(vec![info.id.clone(), created]);
    }
    table.print();
    Ok(())
}

fn cmd_restore(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    require_args(args, 1, "restore <backup>")?;
    let session = context.session()?;
    let backups = context.storage.list_backups(session.student_id().as_str())?;
    let mut matches = backups
        .iter()
        .filter(|info| info.id == args[0] || info.id.starts_with(args[0]));
    let info = match (matches.next(), matches.next()) {
        (Some(info), None) => info,
        (Some(_), Some(_)) => {
            return Err(CommandError::InvalidArguments(format!(
                "`{}` matches more than one backup",
                args[0]
            )))
        }
        (None, _) => {
            return Err(CommandError::InvalidArguments(format!(
                "no backup named `{}`; see `backups`",
                args[0]
            )))
        }
    };
    if !context.confirm(&format!("Replace the current ledger with `{}`?", info.id))? {
        output::info("Operation cancelled.");
        return Ok(());
    }
    let backup = context.storage.read_backup(info)?;
    let ledger = context.tracker.restore_ledger(session, backup)?;
    output::success(format!(
        "Restored `{}` ({} subjects, {} entries, revision {}).",
        info.id,
        ledger.subjects.len(),
        ledger.history.len(),
        ledger.revision
    ));
    Ok(())
}
