use std::fmt;
use std::sync::RwLock;

use colored::Colorize;
use once_cell::sync::Lazy;

/// Message categories used by the CLI output helpers.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Success,
    Warning,
    Error,
    Hint,
    Section,
}

#[derive(Clone, Copy, Debug)]
pub struct OutputPreferences {
    pub color_enabled: bool,
    /// Drops table rules and icons, for scripts and screen readers.
    pub plain_mode: bool,
}

impl Default for OutputPreferences {
    fn default() -> Self {
        Self {
            color_enabled: true,
            plain_mode: false,
        }
    }
}

static PREFERENCES: Lazy<RwLock<OutputPreferences>> =
    Lazy::new(|| RwLock::new(OutputPreferences::default()));

pub fn set_preferences(prefs: OutputPreferences) {
    colored::control::set_override(prefs.color_enabled);
    if let Ok(mut guard) = PREFERENCES.write() {
        *guard = prefs;
    }
}

fn preferences() -> OutputPreferences {
    PREFERENCES
        .read()
        .map(|guard| *guard)
        .unwrap_or_default()
}

fn build_label(kind: MessageKind) -> (&'static str, &'static str) {
    match kind {
        MessageKind::Info => ("INFO", "[i]"),
        MessageKind::Success => ("SUCCESS", "[ok]"),
        MessageKind::Warning => ("WARNING", "[!]"),
        MessageKind::Error => ("ERROR", "[x]"),
        MessageKind::Hint => ("HINT", ""),
        MessageKind::Section => ("", ""),
    }
}

fn apply_style(kind: MessageKind, message: impl fmt::Display, prefs: &OutputPreferences) -> String {
    let text = message.to_string();
    let formatted = match kind {
        MessageKind::Section => format!("=== {} ===", text.trim()),
        _ => {
            let (label, icon) = build_label(kind);
            if icon.is_empty() || prefs.plain_mode {
                format!("{label}: {text}")
            } else {
                format!("{label}: {icon} {text}")
            }
        }
    };

    if !prefs.color_enabled {
        return formatted;
    }
    match kind {
        MessageKind::Success => formatted.bright_green().to_string(),
        MessageKind::Warning => formatted.bright_yellow().to_string(),
        MessageKind::Error => formatted.bright_red().to_string(),
        MessageKind::Hint => formatted.dimmed().to_string(),
        MessageKind::Section => formatted.bold().to_string(),
        MessageKind::Info => formatted,
    }
}

pub fn print(kind: MessageKind, message: impl fmt::Display) {
    let prefs = preferences();
    let formatted = apply_style(kind, message, &prefs);
    match kind {
        MessageKind::Section => println!("\n{formatted}"),
        MessageKind::Error => eprintln!("{formatted}"),
        _ => println!("{formatted}"),
    }
}

pub fn info(message: impl fmt::Display) {
    print(MessageKind::Info, message);
}

pub fn success(message: impl fmt::Display) {
    print(MessageKind::Success, message);
}

pub fn warning(message: impl fmt::Display) {
    print(MessageKind::Warning, message);
}

pub fn error(message: impl fmt::Display) {
    print(MessageKind::Error, message);
}

pub fn hint(message: impl fmt::Display) {
    print(MessageKind::Hint, message);
}

pub fn section(title: impl fmt::Display) {
    print(MessageKind::Section, title);
}

/// Highlights a value that went over budget.
pub fn critical(text: impl fmt::Display) -> String {
    let text = text.to_string();
    if preferences().color_enabled {
        text.bright_red().bold().to_string()
    } else {
        text
    }
}

/// Declarative description of a table column.
#[derive(Debug, Clone)]
pub struct TableColumn {
    pub header: String,
    pub width: usize,
}

impl TableColumn {
    pub fn new(header: impl Into<String>, width: usize) -> Self {
        Self {
            header: header.into(),
            width,
        }
    }
}

/// Row data for a [`Table`].
#[derive(Debug, Clone)]
pub struct TableRow {
    pub cells: Vec<String>,
    /// Rendered with [`critical`] styling.
    pub highlight: bool,
}

/// Simple table model used for read-only overviews.
#[derive(Debug, Clone)]
pub struct Table {
    pub title: Option<String>,
    pub columns: Vec<TableColumn>,
    pub rows: Vec<TableRow>,
}

impl Table {
    pub fn new(title: Option<&str>, columns: Vec<TableColumn>) -> Self {
        Self {
            title: title.map(str::to_string),
            columns,
            rows: Vec::new(),
        }
    }

    pub fn add_row<S: Into<String>>(&mut self, cells: Vec<S>) {
        self.push_row(cells, false);
    }

    pub fn add_highlighted_row<S: Into<String>>(&mut self, cells: Vec<S>) {
        self.push_row(cells, true);
    }

    fn push_row<S: Into<String>>(&mut self, cells: Vec<S>, highlight: bool) {
        self.rows.push(TableRow {
            cells: cells.into_iter().map(Into::into).collect(),
            highlight,
        });
    }

    pub fn render(&self) -> String {
        let prefs = preferences();
        let mut lines = Vec::new();
        if let Some(title) = &self.title {
            lines.push(title.clone());
        }
        let total_width = self
            .columns
            .iter()
            .map(|col| col.width + 1)
            .sum::<usize>()
            .max(1);
        let header = self
            .columns
            .iter()
            .map(|col| format!("{:width$} ", col.header, width = col.width))
            .collect::<String>();
        if !prefs.plain_mode {
            lines.push("-".repeat(total_width));
        }
        lines.push(header.trim_end().to_string());
        if !prefs.plain_mode {
            lines.push("-".repeat(total_width));
        }
        for row in &self.rows {
            let line = self
                .columns
                .iter()
                .enumerate()
                .map(|(idx, column)| {
                    let cell = row.cells.get(idx).map(String::as_str).unwrap_or("");
                    format!("{:width$}", cell, width = column.width)
                })
                .collect::<Vec<_>>()
                .join(" ");
            let line = line.trim_end();
            lines.push(if row.highlight {
                critical(line)
            } else {
                line.to_string()
            });
        }
        lines.join("\n")
    }

    pub fn print(&self) {
        println!("{}", self.render());
    }
}
