use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

/// Filter used when `RUST_LOG` is unset: our own crate at info, the HTTP
/// stack only when it has something to warn about.
const DEFAULT_FILTER: &str = "info,hyper=warn,reqwest=warn";

/// Initialize structured logging for the application.
///
/// This must be called once at startup (in main.rs). The upstream API key
/// is never passed to any log macro; `ApiKey` redacts itself if it is.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    info!("Logging initialized");
}
