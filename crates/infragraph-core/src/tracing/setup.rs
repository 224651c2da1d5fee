//! Tracing initialization and configuration.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INIT: Once = Once::new();

/// Environment variable holding the log filter directives.
pub const LOG_ENV_VAR: &str = "INFRAGRAPH_LOG";

/// Initialize the infragraph tracing/logging system.
///
/// Reads `INFRAGRAPH_LOG` for per-crate log levels.
/// Format: `INFRAGRAPH_LOG=infragraph_analysis=debug,infragraph_core=warn`
///
/// Falls back to `infragraph=info` if `INFRAGRAPH_LOG` is not set or is invalid.
///
/// Idempotent. Library code never calls this; binaries and tests opt in.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
            .unwrap_or_else(|_| EnvFilter::new("infragraph=info"));

        // A host application may already own the global subscriber.
        let _ = tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .with(filter)
            .try_init();
    });
}
