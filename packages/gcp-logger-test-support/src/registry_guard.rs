//! Per-test fixture for the process-wide logger registry.

use gcp_logger::{LoggerSettings, SharedBuffer, SinkSpec};

/// Resets the process-wide registry when created and again when dropped.
///
/// Every test that touches [`gcp_logger::get_logger`] should hold one for
/// its whole body, so configuration from one test (sink, filter, the
/// instance itself) never leaks into the next. Tests holding a guard still
/// share one process, so mark them `#[serial]`.
///
/// ```ignore
/// #[test]
/// #[serial]
/// fn uses_the_global_logger() {
///     let (_guard, logs) = RegistryGuard::capturing();
///     gcp_logger::get_logger("svc").unwrap().info("hello");
///     assert_eq!(logs.json_lines()[0]["message"], "hello");
/// }
/// ```
#[must_use = "the registry is reset again when the guard is dropped"]
#[derive(Debug)]
pub struct RegistryGuard {
    _private: (),
}

impl RegistryGuard {
    /// Fresh registry that configures from the environment.
    pub fn fresh() -> Self {
        gcp_logger::reset();
        gcp_logger::set_settings(None);
        Self { _private: () }
    }

    /// Fresh registry that configures with `settings`.
    pub fn with_settings(settings: LoggerSettings) -> Self {
        gcp_logger::reset();
        gcp_logger::set_settings(Some(settings));
        Self { _private: () }
    }

    /// Fresh registry whose logger writes into the returned buffer.
    pub fn capturing() -> (Self, SharedBuffer) {
        let buf = SharedBuffer::new();
        let settings = LoggerSettings::default().with_sink(SinkSpec::Memory(buf.clone()));
        (Self::with_settings(settings), buf)
    }
}

impl Drop for RegistryGuard {
    fn drop(&mut self) {
        gcp_logger::reset();
        gcp_logger::set_settings(None);
    }
}
