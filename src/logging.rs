use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "neuralchat=info";

/// Install the global fmt subscriber. A second call, or a subscriber the UI
/// runtime installed first, is left alone.
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let result = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();

    match result {
        Ok(()) => tracing::debug!("logging initialized"),
        Err(err) => tracing::debug!(%err, "subscriber already installed"),
    }
}
