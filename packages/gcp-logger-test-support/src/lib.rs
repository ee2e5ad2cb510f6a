//! gcp-logger test support utilities
//!
//! This crate provides the per-test reset fixture for the process-wide logger
//! registry and unified logging initialization for the test binaries.

pub mod registry_guard;
pub mod test_logging;

pub use registry_guard::RegistryGuard;
