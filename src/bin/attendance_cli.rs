use attendance_core::{cli::run_cli, config::AppSettings, init, init_with_directive};

fn main() {
    match AppSettings::load_default() {
        Ok(settings) => init_with_directive(&settings.config.log_directive),
        Err(_) => init(),
    }

    if let Err(err) = run_cli() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}
