pub mod build_info;
pub mod persistence;

use std::sync::Once;

use tracing_subscriber::{fmt, EnvFilter};

static TRACING_INIT: Once = Once::new();

/// Default filter directive; `RUST_LOG` entries are merged on top of it.
pub const DEFAULT_LOG_DIRECTIVE: &str = "finance_core=info";

/// Installs the global `fmt` subscriber once. Later calls are no-ops.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        let mut filter = EnvFilter::from_default_env();
        if let Ok(directive) = DEFAULT_LOG_DIRECTIVE.parse() {
            filter = filter.add_directive(directive);
        }
        // Another subscriber may already be installed by the host application.
        let _ = fmt().with_env_filter(filter).with_target(false).try_init();
    });
}
