pub mod build_info;

use std::sync::Once;

use tracing_subscriber::{
    filter::{Directive, LevelFilter},
    fmt, EnvFilter,
};

static TRACING_INIT: Once = Once::new();

const DEFAULT_DIRECTIVE: &str = "attendance_core=info";

/// Initializes the global tracing subscriber with sensible defaults.
pub fn init_tracing() {
    init_tracing_with(DEFAULT_DIRECTIVE);
}

/// Initializes the subscriber with `RUST_LOG` plus `directive`. An unparsable
/// directive falls back to the default one.
pub fn init_tracing_with(directive: &str) {
    TRACING_INIT.call_once(|| {
        let filter = EnvFilter::from_default_env().add_directive(parse_directive(directive));
        // Another subscriber may already be installed (e.g. by a test harness).
        let _ = fmt().with_env_filter(filter).with_writer(std::io::stderr).try_init();
    });
}

fn parse_directive(directive: &str) -> Directive {
    directive
        .parse()
        .or_else(|_| DEFAULT_DIRECTIVE.parse())
        .unwrap_or_else(|_| LevelFilter::INFO.into())
}
