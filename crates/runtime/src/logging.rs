//! Tracing subscriber setup shared by binaries and integration tests.

/// Installs a `fmt` subscriber writing to stderr.
///
/// The filter is read from `RUST_LOG`, with `info` as the floor. Calling this
/// more than once is harmless: later calls leave the first subscriber in place.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .try_init();
}
