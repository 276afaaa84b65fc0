use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "BLOGDESK_LOG";
const DEFAULT_DIRECTIVE: &str = "info";

/// Installs the global fmt subscriber. Safe to call more than once; only the
/// first call takes effect.
pub fn init() {
    let filter = std::env::var(LOG_ENV)
        .ok()
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_DIRECTIVE));

    if tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .is_err()
    {
        tracing::debug!("tracing subscriber already installed");
    }
}
