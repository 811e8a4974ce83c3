//! Error types for the Pulsar3D engine
//!
//! This module defines the error types used throughout the engine,
//! including command recording/execution, buffer streaming, and
//! backend management.

use std::fmt;

/// Result type for Pulsar3D engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Pulsar3D engine errors
#[derive(Debug, Clone)]
pub enum Error {
    /// Backend-specific error (headless, Vulkan, etc.)
    BackendError(String),

    /// Out of GPU memory
    OutOfMemory,

    /// Invalid resource (buffer handle, mapped region, etc.)
    InvalidResource(String),

    /// Invalid or corrupt command (uninitialized tag, payload mismatch,
    /// stale patch offset)
    InvalidCommand(String),

    /// A streaming write exceeded a configured capacity cap.
    ///
    /// The caps are static upper bounds; exceeding one means the caller
    /// under-provisioned and must be fixed, not retried.
    CapacityExceeded(String),

    /// Operation not supported on this configuration
    NotImplemented(String),

    /// Initialization failed (engine, backend, subsystems)
    InitializationFailed(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::OutOfMemory => write!(f, "Out of GPU memory"),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InvalidCommand(msg) => write!(f, "Invalid command: {}", msg),
            Error::CapacityExceeded(msg) => write!(f, "Capacity exceeded: {}", msg),
            Error::NotImplemented(msg) => write!(f, "Not implemented: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

// ===== ERROR MACROS =====

/// Build an [`Error`] of the given variant, logging it through the engine
/// logger with file:line information.
///
/// # Example
///
/// ```ignore
/// return Err(engine_err!(InvalidResource, "pulsar3d::Stream",
///     "segment {} out of range", index));
/// ```
#[macro_export]
macro_rules! engine_err {
    ($variant:ident, $source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::pulsar3d::Engine::log_detailed(
            $crate::pulsar3d::log::LogSeverity::Error,
            $source,
            message.clone(),
            file!(),
            line!(),
        );
        $crate::pulsar3d::Error::$variant(message)
    }};
}

/// Log an error and return it from the current function.
///
/// Shorthand for `return Err(engine_err!(...))`.
#[macro_export]
macro_rules! engine_bail {
    ($variant:ident, $source:expr, $($arg:tt)*) => {
        return Err($crate::engine_err!($variant, $source, $($arg)*))
    };
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
