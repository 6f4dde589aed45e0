use std::sync::Once;

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "agriquery=warn";
const VERBOSE_FILTER: &str = "agriquery=debug";

static INIT_ONCE: Once = Once::new();

/// Installs the global subscriber. `RUST_LOG` takes precedence over the
/// built-in filters. Output goes to stderr; stdout is reserved for envelopes.
pub fn init(verbose: bool) {
    INIT_ONCE.call_once(|| {
        let fallback = if verbose { VERBOSE_FILTER } else { DEFAULT_FILTER };
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
            )
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    });
}
