use crate::cli::context::{CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::identity::{FixedIdentity, IdentityResolver, Session};

use super::require_args;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "whoami",
            "Show the student the shell acts for",
            "whoami",
            cmd_whoami,
        ),
        CommandEntry::new(
            "student",
            "Switch to another student's ledger",
            "student <id>",
            cmd_student,
        ),
        CommandEntry::new(
            "students",
            "List students with stored ledgers",
            "students",
            cmd_students,
        ),
    ]
}

fn cmd_whoami(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let session = context.session()?;
    output::info(format!(
        "Student: {} ({})",
        session.student.display_name,
        session.student_id()
    ));
    Ok(())
}

fn cmd_student(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    require_args(args, 1, "student <id>")?;
    let raw = args.join(" ");
    let Some(id) = FixedIdentity::new(raw.trim()).current_student_id() else {
        return Err(CommandError::InvalidArguments(
            "student id cannot be blank".into(),
        ));
    };
    let session = Session::for_student(id);
    let subjects = context.tracker.subjects(&session)?.len();
    output::success(format!(
        "Now tracking `{}` ({} subject{}).",
        session.student_id(),
        subjects,
        if subjects == 1 { "" } else { "s" }
    ));
    context.session = Some(session);
    Ok(())
}

fn cmd_students(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let students = context.tracker.students()?;
    if students.is_empty() {
        output::info("No ledgers stored yet.");
        return Ok(());
    }
    let current = context.session.as_ref().map(|session| session.student_id());
    for student in &students {
        let marker = if Some(student) == current { "*" } else { " " };
        println!("{marker} {student}");
    }
    Ok(())
}
