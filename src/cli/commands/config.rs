use attend_config::Config;

use crate::cli::context::{CliMode, CommandError, CommandResult, ShellContext};
use crate::cli::output::{self, OutputPreferences};
use crate::cli::registry::CommandEntry;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "config",
        "View and change tracker preferences",
        "config [show|set <key> <value>]",
        cmd_config,
    )]
}

fn cmd_config(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args.first().map(|arg| arg.to_lowercase()).as_deref() {
        None | Some("show") => show_config(context),
        Some("set") => {
            if args.len() < 3 {
                return Err(CommandError::InvalidArguments(format!(
                    "usage: config set <{}> <value>",
                    Config::KEYS.join("|")
                )));
            }
            set_config_value(context, args[1], &args[2..].join(" "))
        }
        Some(other) => Err(CommandError::InvalidArguments(format!(
            "unknown config action `{other}`"
        ))),
    }
}

fn show_config(context: &ShellContext) -> CommandResult {
    output::section("Configuration");
    for key in Config::KEYS {
        let value = context.settings.config.get_value(key).unwrap_or_default();
        println!("  {key:<22} {value}");
    }
    println!(
        "  {:<22} {}",
        "config file",
        context.settings.manager.config_path().display()
    );
    Ok(())
}

fn set_config_value(context: &mut ShellContext, key: &str, value: &str) -> CommandResult {
    let key = key.to_lowercase();
    context.settings.config.set_value(&key, value)?;
    context.settings.save()?;

    match key.as_str() {
        "prune_empty_subjects" => context.tracker.set_policy(context.settings.policy()),
        "ui_color_enabled" => output::set_preferences(OutputPreferences {
            color_enabled: context.settings.config.ui_color_enabled
                && context.mode == CliMode::Interactive,
            plain_mode: context.mode == CliMode::Script,
        }),
        "data_root" | "backup_retention" | "log_directive" => {
            output::hint("Takes effect the next time the shell starts.")
        }
        _ => {}
    }

    let shown = context.settings.config.get_value(&key).unwrap_or_default();
    output::success(format!("`{key}` set to {shown}."));
    Ok(())
}
