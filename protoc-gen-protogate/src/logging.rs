use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter, e.g. `PROTOGATE_LOG=debug`.
pub const LOG_ENV: &str = "PROTOGATE_LOG";

/// Install a `fmt` subscriber writing to stderr.
///
/// Falls back to `warn` when `PROTOGATE_LOG` is unset or invalid.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
