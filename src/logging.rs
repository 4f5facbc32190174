use tracing_subscriber::EnvFilter;

/// Diagnostics go to stderr so stdout stays clean for reports and documents.
/// `RUST_LOG` wins over the verbosity flag when set.
pub(crate) fn init_logging(verbose: bool) {
    let fallback = if verbose { "replychart=debug" } else { "warn" };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback.into()))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
