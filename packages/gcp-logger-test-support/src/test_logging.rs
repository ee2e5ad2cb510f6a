//! Diagnostics output for test binaries.
//!
//! Installs a plain fmt subscriber as the process-wide default so the
//! registry's own `debug!` lines show up in test output. Loggers handed out
//! by the registry never write through this subscriber.

use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, EnvFilter};

static INITIALIZED: OnceCell<()> = OnceCell::new();

/// Initialize diagnostics logging for tests. Safe to call repeatedly.
///
/// The level is read in order: `TEST_LOG` -> `RUST_LOG` -> `"warn"`.
///
/// ```bash
/// TEST_LOG=gcp_logger=debug cargo test -p gcp-logger
/// ```
pub fn init() {
    INITIALIZED.get_or_init(|| {
        let filter = std::env::var("TEST_LOG")
            .or_else(|_| std::env::var("RUST_LOG"))
            .ok()
            .and_then(|directive| EnvFilter::try_new(directive).ok())
            .unwrap_or_else(|| EnvFilter::new("warn"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer() // cargo/nextest capture
            .without_time()
            .try_init()
            .ok(); // something else may already own the global default
    });
}
