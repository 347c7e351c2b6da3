use crate::cli::context::{CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;

use super::subject::status_table;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "summary",
            "Show ledger totals and subjects over budget",
            "summary [--json]",
            cmd_summary,
        ),
        CommandEntry::new(
            "audit",
            "Check the ledger for dangling entries and drifted totals",
            "audit",
            cmd_audit,
        ),
    ]
}

fn cmd_summary(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let session = context.session()?;
    let summary = context.tracker.summary(session)?;
    if args.first() == Some(&"--json") {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }
    output::section(format!("Summary for {}", session.student_id()));
    println!("  Subjects           {}", summary.subject_count);
    println!("  Entries            {}", summary.entry_count);
    println!("  Hours absent       {}", summary.total_hours_absent);
    let critical = format!("  Critical subjects  {}", summary.critical_count);
    if summary.critical_count > 0 {
        println!("{}", output::critical(critical));
    } else {
        println!("{critical}");
    }
    if !summary.subjects.is_empty() {
        println!();
        status_table("Subjects", &summary.subjects).print();
    }
    Ok(())
}

fn cmd_audit(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let session = context.session()?;
    let warnings = context.tracker.audit(session)?;
    if warnings.is_empty() {
        output::success("No inconsistencies found.");
        return Ok(());
    }
    for warning in &warnings {
        output::warning(warning);
    }
    Ok(())
}
