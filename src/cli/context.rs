//! Shared runtime state for CLI interactions and command execution.

use std::{io, sync::Arc};

use dialoguer::{theme::ColorfulTheme, Confirm};
use thiserror::Error;

use attend_config::ConfigError;
use attend_core::CoreError;
use attend_storage_json::JsonLedgerStorage;

use crate::{
    cli::{
        commands,
        output::{self, OutputPreferences},
        registry::{CommandEntry, CommandRegistry},
        system_clock::SystemClock,
    },
    config::AppSettings,
    errors::{AttendanceError, CliError},
    identity::{EnvIdentity, FixedIdentity, IdentityResolver, Session},
    tracker::AttendanceTracker,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

pub type CommandResult = Result<(), CommandError>;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("No student selected. Use `student <id>` first.")]
    NoStudent,
    #[error("{0}")]
    InvalidArguments(String),
    #[error(transparent)]
    Tracker(#[from] AttendanceError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
    #[error(transparent)]
    Dialoguer(#[from] dialoguer::Error),
    #[error("exit requested")]
    ExitRequested,
}

impl From<CoreError> for CommandError {
    fn from(err: CoreError) -> Self {
        CommandError::Tracker(err.into())
    }
}

impl From<ConfigError> for CommandError {
    fn from(err: ConfigError) -> Self {
        CommandError::Tracker(err.into())
    }
}

pub struct ShellContext {
    pub mode: CliMode,
    pub registry: CommandRegistry,
    pub tracker: AttendanceTracker,
    /// Same files the tracker writes; kept concrete for backup management.
    pub storage: JsonLedgerStorage,
    pub settings: AppSettings,
    pub session: Option<Session>,
    pub theme: ColorfulTheme,
    pub last_command: Option<String>,
    pub running: bool,
}

impl ShellContext {
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        Self::with_settings(mode, AppSettings::load_default()?)
    }

    pub fn with_settings(mode: CliMode, settings: AppSettings) -> Result<Self, CliError> {
        output::set_preferences(OutputPreferences {
            color_enabled: settings.config.ui_color_enabled && mode == CliMode::Interactive,
            plain_mode: mode == CliMode::Script,
        });

        let storage = settings.open_storage()?;
        let tracker = AttendanceTracker::with_storage(
            Box::new(storage.clone()),
            Arc::new(SystemClock),
            settings.policy(),
        );

        let configured = settings
            .config
            .default_student
            .as_deref()
            .map(FixedIdentity::new);
        let mut resolvers: Vec<&dyn IdentityResolver> = vec![&EnvIdentity];
        if let Some(fixed) = configured.as_ref() {
            resolvers.push(fixed);
        }
        let session = Session::resolve(&resolvers).ok();

        let mut registry = CommandRegistry::new();
        commands::register_all(&mut registry);

        tracing::debug!(
            data_root = %settings.config.resolve_data_root(&settings.base).display(),
            student = ?session.as_ref().map(|s| s.student_id().to_string()),
            "shell context ready"
        );

        Ok(Self {
            mode,
            registry,
            tracker,
            storage,
            settings,
            session,
            theme: ColorfulTheme::default(),
            last_command: None,
            running: true,
        })
    }

    pub fn command_names(&self) -> Vec<&'static str> {
        self.registry.names().collect()
    }

    pub fn command(&self, name: &str) -> Option<&CommandEntry> {
        self.registry.get(name)
    }

    pub fn can_prompt(&self) -> bool {
        self.mode == CliMode::Interactive
    }

    pub(crate) fn session(&self) -> Result<&Session, CommandError> {
        self.session.as_ref().ok_or(CommandError::NoStudent)
    }

    /// Asks for a yes/no answer. Script mode never blocks and answers yes.
    pub(crate) fn confirm(&self, prompt: &str) -> Result<bool, CommandError> {
        if !self.can_prompt() {
            return Ok(true);
        }
        Ok(Confirm::with_theme(&self.theme)
            .with_prompt(prompt)
            .default(false)
            .interact()?)
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        if let Some(handler) = self.registry.handler(command) {
            match handler(self, args) {
                Ok(()) => Ok(LoopControl::Continue),
                Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
                Err(err) => Err(err),
            }
        } else {
            self.suggest_command(raw);
            Ok(LoopControl::Continue)
        }
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        output::warning(format!(
            "Unknown command `{input}`. Type `help` to see available commands."
        ));
        if let Some(best) = self.registry.suggest(input) {
            output::info(format!("Suggestion: `{best}`?"));
        }
    }

    pub(crate) fn confirm_exit(&self) -> Result<bool, CliError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        Ok(Confirm::with_theme(&self.theme)
            .with_prompt("Exit shell?")
            .default(true)
            .interact()?)
    }

    pub(crate) fn report_error(&self, err: CommandError) {
        match err {
            CommandError::ExitRequested => {}
            CommandError::InvalidArguments(message) => {
                output::error(message);
                output::hint("Use `help <command>` for usage details.");
            }
            CommandError::NoStudent | CommandError::Tracker(AttendanceError::NoStudent) => {
                output::error("No student selected.");
                output::hint("Try `student 2021CS042` or set ATTENDANCE_STUDENT.");
            }
            other => output::error(other),
        }
    }
}
