use tracing_subscriber::EnvFilter;

/// Initialize structured logging to stderr.
///
/// Stdout stays clean for listings and the run summary; `RUST_LOG` overrides
/// the default filter.
pub fn init_logging() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,geozip=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
