use tracing_subscriber::{fmt, EnvFilter};

/// Level used when RUST_LOG is not set
pub fn default_level(verbosity: u8, debug: bool) -> &'static str {
    match (debug, verbosity) {
        (true, _) => "debug",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        (false, _) => "trace",
    }
}

/// Install a stderr logger so stdout stays reserved for rendered output.
/// RUST_LOG takes precedence over the command-line verbosity.
pub fn init_logging(verbosity: u8, debug: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("logsift={}", default_level(verbosity, debug))));

    // A second init (e.g. from tests) is harmless
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
