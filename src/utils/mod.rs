pub mod build_info;
pub mod paths;

use std::sync::Once;

use tracing_subscriber::{filter::LevelFilter, fmt, EnvFilter};

static TRACING_INIT: Once = Once::new();

/// Installs the global tracing subscriber on stderr: `RUST_LOG` directives plus
/// `nightly_close=info`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        let filter = EnvFilter::builder()
            .with_default_directive(LevelFilter::WARN.into())
            .from_env_lossy()
            .add_directive("nightly_close=info".parse().unwrap_or_else(|_| LevelFilter::INFO.into()));

        let _ = fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    });
}
