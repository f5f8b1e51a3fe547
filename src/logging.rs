use tracing_subscriber::EnvFilter;

const DEFAULT_DIRECTIVE: &str = "text_translator_node=info";

/// `RUST_LOG` when set and valid, otherwise the crate at info level.
fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
}

/// Install the fmt subscriber.
///
/// Hosts may call this more than once; only the first call installs anything.
pub fn init() {
    // Fails only when a global subscriber is already set
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .try_init();
}
