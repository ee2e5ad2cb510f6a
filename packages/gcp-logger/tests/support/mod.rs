//! Shared setup for gcp-logger integration tests.
//!
//! Diagnostics level follows `TEST_LOG` -> `RUST_LOG` -> `"warn"`:
//!
//! ```bash
//! TEST_LOG=gcp_logger=debug cargo test -p gcp-logger --test registry_lifecycle
//! ```

/// Runs once per integration test binary, before any test.
#[ctor::ctor]
fn _auto_init_for_integration_tests() {
    gcp_logger_test_support::test_logging::init();
}
