/// Common test utilities and storage instrumentation
///
/// This module provides shared functionality for integration tests including:
/// - A recording storage layer that captures every pass written
/// - A faulty storage layer that corrupts read-back
/// - File and tree fixtures
#[allow(dead_code)]
pub mod assertions;
#[allow(dead_code)]
pub mod recording_storage;
#[allow(dead_code)]
pub mod test_helpers;
