//! Read-dispatch loop shared by the interactive prompt and stdin scripts.

use std::{
    borrow::Cow,
    fmt,
    io::{self, BufRead},
};

use rustyline::{
    completion::{Completer, Pair},
    error::ReadlineError,
    highlight::Highlighter,
    hint::Hinter,
    history::DefaultHistory,
    validate::{ValidationContext, ValidationResult, Validator},
    Cmd, Context as ReadlineContext, Editor, Helper, KeyEvent,
};
use shell_words::split;

use crate::cli::context::{CliMode, CommandError, LoopControl, ShellContext};
use crate::cli::output;
use crate::errors::CliError;

/// Environment variable switching the shell to line-by-line stdin scripts.
pub const SCRIPT_ENV: &str = "ATTENDANCE_CLI_SCRIPT";

pub fn run_cli() -> Result<(), CliError> {
    let mode = if std::env::var_os(SCRIPT_ENV).is_some() {
        CliMode::Script
    } else {
        CliMode::Interactive
    };
    let mut context = ShellContext::new(mode)?;

    match mode {
        CliMode::Interactive => {
            if context.session.is_none() {
                output::hint("No student selected yet. Use `student <id>` to pick one.");
            }
            let source = PromptSource::new(context.command_names())?;
            drive(&mut context, source)
        }
        CliMode::Script => drive(&mut context, ScriptSource::new(io::stdin().lock())),
    }
}

/// One turn of input.
enum Turn {
    Line(String),
    Interrupted,
    Finished,
}

trait LineSource {
    fn next_turn(&mut self, prompt: &str) -> Result<Turn, CliError>;

    /// Line number of the last line handed out, for sources that count them.
    fn position(&self) -> Option<usize> {
        None
    }
}

struct PromptSource {
    editor: Editor<CommandHelper, DefaultHistory>,
}

impl PromptSource {
    fn new(commands: Vec<&'static str>) -> Result<Self, CliError> {
        let mut editor = Editor::<CommandHelper, DefaultHistory>::new()?;
        editor.set_helper(Some(CommandHelper::new(commands)));
        editor.bind_sequence(KeyEvent::from('?'), Cmd::Complete);
        Ok(Self { editor })
    }
}

impl LineSource for PromptSource {
    fn next_turn(&mut self, prompt: &str) -> Result<Turn, CliError> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if !trimmed.is_empty() {
                    self.editor.add_history_entry(trimmed).ok();
                }
                Ok(Turn::Line(line))
            }
            Err(ReadlineError::Interrupted) => Ok(Turn::Interrupted),
            Err(ReadlineError::Eof) => Ok(Turn::Finished),
            Err(err) => Err(err.into()),
        }
    }
}

struct ScriptSource<R> {
    lines: io::Lines<R>,
    line_no: usize,
}

impl<R: BufRead> ScriptSource<R> {
    fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
        }
    }
}

impl<R: BufRead> LineSource for ScriptSource<R> {
    fn next_turn(&mut self, _prompt: &str) -> Result<Turn, CliError> {
        match self.lines.next() {
            Some(line) => {
                self.line_no += 1;
                Ok(Turn::Line(line?))
            }
            None => Ok(Turn::Finished),
        }
    }

    fn position(&self) -> Option<usize> {
        Some(self.line_no)
    }
}

fn drive(context: &mut ShellContext, mut source: impl LineSource) -> Result<(), CliError> {
    while context.running {
        let line = match source.next_turn(&prompt_for(context))? {
            Turn::Line(line) => line,
            Turn::Interrupted => {
                if context.confirm_exit()? {
                    break;
                }
                continue;
            }
            Turn::Finished => {
                if context.mode == CliMode::Interactive {
                    output::info("Exiting shell.");
                }
                break;
            }
        };
        match execute_line(context, &line) {
            Ok(LoopControl::Continue) => {}
            Ok(LoopControl::Exit) => break,
            Err(err) => {
                if let Some(line_no) = source.position() {
                    tracing::debug!(line = line_no, "script line failed");
                }
                context.report_error(err);
            }
        }
    }
    Ok(())
}

/// `attendance [<student>]> ` once a student is chosen.
fn prompt_for(context: &ShellContext) -> String {
    match &context.session {
        Some(session) => format!("attendance [{}]> ", session.student_id()),
        None => "attendance> ".to_string(),
    }
}

#[derive(Debug, PartialEq)]
enum Input {
    /// Blank line or `#` comment.
    Skip,
    Command(Vec<String>),
}

fn read_input(line: &str) -> Result<Input, ParseError> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(Input::Skip);
    }
    let tokens = parse_command_line(trimmed)?;
    Ok(if tokens.is_empty() {
        Input::Skip
    } else {
        Input::Command(tokens)
    })
}

/// Runs one line of input against the context. Malformed quoting is reported
/// and skipped.
pub(crate) fn execute_line(
    context: &mut ShellContext,
    line: &str,
) -> Result<LoopControl, CommandError> {
    let tokens = match read_input(line) {
        Ok(Input::Command(tokens)) => tokens,
        Ok(Input::Skip) => return Ok(LoopControl::Continue),
        Err(err) => {
            output::warning(err);
            return Ok(LoopControl::Continue);
        }
    };
    let Some((raw, rest)) = tokens.split_first() else {
        return Ok(LoopControl::Continue);
    };
    let command = raw.to_lowercase();
    let args: Vec<&str> = rest.iter().map(String::as_str).collect();

    context.last_command = Some(line.trim().to_string());
    tracing::debug!(command = %command, args = args.len(), "dispatching command");

    let control = context.dispatch(&command, raw, &args)?;
    if control == LoopControl::Exit {
        context.running = false;
    }
    Ok(control)
}

/// Tab completion for command names.
struct CommandHelper {
    commands: Vec<&'static str>,
}

impl CommandHelper {
    fn new(mut commands: Vec<&'static str>) -> Self {
        commands.sort_unstable();
        commands.dedup();
        Self { commands }
    }
}

impl Helper for CommandHelper {}

impl Completer for CommandHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &ReadlineContext<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let head = &line[..pos];
        let word = head.trim_start();
        if word.contains(char::is_whitespace) {
            return Ok((pos, Vec::new()));
        }
        let needle = word.to_ascii_lowercase();
        let candidates = self
            .commands
            .iter()
            .filter(|name| name.starts_with(needle.as_str()))
            .map(|name| Pair {
                display: name.to_string(),
                replacement: name.to_string(),
            })
            .collect();
        Ok((head.len() - word.len(), candidates))
    }
}

impl Hinter for CommandHelper {
    type Hint = String;
}

impl Highlighter for CommandHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        Cow::Borrowed(line)
    }
}

impl Validator for CommandHelper {
    fn validate(&self, _ctx: &mut ValidationContext) -> rustyline::Result<ValidationResult> {
        Ok(ValidationResult::Valid(None))
    }
}

pub(crate) fn parse_command_line(input: &str) -> Result<Vec<String>, ParseError> {
    split(input).map_err(|err| ParseError(err.to_string()))
}

#[derive(Debug)]
pub(crate) struct ParseError(String);

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use tempfile::tempdir;

    use super::*;
    use crate::config::AppSettings;

    #[test]
    fn quoted_arguments_stay_together() {
        let tokens = parse_command_line(r#"add-subject "Operating Systems" 3"#).unwrap();
        assert_eq!(tokens, vec!["add-subject", "Operating Systems", "3"]);
    }

    #[test]
    fn unbalanced_quotes_are_reported() {
        assert!(parse_command_line(r#"mark "DBMS 2"#).is_err());
    }

    #[test]
    fn blanks_and_comments_are_skipped() {
        assert_eq!(read_input("   ").unwrap(), Input::Skip);
        assert_eq!(read_input("  # mark dbms 2").unwrap(), Input::Skip);
        assert_eq!(
            read_input(" whoami ").unwrap(),
            Input::Command(vec!["whoami".to_string()])
        );
    }

    #[test]
    fn script_runs_until_exit_and_ignores_the_rest() {
        let dir = tempdir().unwrap();
        let settings = AppSettings::load_from(dir.path().to_path_buf()).unwrap();
        let mut context = ShellContext::with_settings(CliMode::Script, settings).unwrap();
        let script = "# semester one\n\
                      student s-9\n\
                      \n\
                      add-subject DBMS 4\n\
                      mark dbms 2 2024-08-12\n\
                      exit\n\
                      add-subject OS 3\n";

        drive(&mut context, ScriptSource::new(Cursor::new(script))).unwrap();

        assert!(!context.running);
        assert_eq!(context.last_command.as_deref(), Some("exit"));
        assert_eq!(prompt_for(&context), "attendance [s-9]> ");
        let session = context.session.clone().unwrap();
        let summary = context.tracker.summary(&session).unwrap();
        assert_eq!(summary.subject_count, 1);
        assert_eq!(summary.total_hours_absent, 2);
    }
}
