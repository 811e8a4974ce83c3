//! Pulsar3D Engine - Singleton manager for engine subsystems
//!
//! This module provides global singleton management for the render backend
//! and the engine logger. It uses thread-safe static storage with RwLock
//! for safe concurrent access.

use std::sync::{OnceLock, RwLock, Arc, Mutex};
use std::time::SystemTime;
use crate::backend::RenderBackend;
use crate::error::{Result, Error};
use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};

// ===== INTERNAL STATE =====

/// Global engine state storage
static ENGINE_STATE: OnceLock<EngineState> = OnceLock::new();

/// Global logger (initialized with DefaultLogger)
static LOGGER: OnceLock<RwLock<Box<dyn Logger>>> = OnceLock::new();

/// Internal state structure holding all engine singletons
struct EngineState {
    /// Render backend singleton (wrapped in Mutex for thread-safe mutable access)
    backend: RwLock<Option<Arc<Mutex<dyn RenderBackend>>>>,
}

impl EngineState {
    /// Create a new empty engine state
    fn new() -> Self {
        Self {
            backend: RwLock::new(None),
        }
    }
}

// ===== PUBLIC API =====

/// Main engine singleton manager
///
/// Manages the lifecycle of the render backend singleton and the engine
/// logger, using a singleton pattern with thread-safe access.
///
/// # Example
///
/// ```no_run
/// use pulsar_3d_engine::pulsar3d::Engine;
/// use pulsar_3d_engine_renderer_headless::HeadlessBackend;
///
/// // Initialize engine
/// Engine::initialize()?;
///
/// // Create backend singleton
/// Engine::create_backend(HeadlessBackend::new())?;
///
/// // Access backend globally
/// let backend = Engine::backend()?;
///
/// // Cleanup
/// Engine::shutdown();
/// # Ok::<(), pulsar_3d_engine::pulsar3d::Error>(())
/// ```
pub struct Engine;

impl Engine {
    /// Helper to log errors before returning them (internal use)
    ///
    /// This ensures all Engine errors are automatically logged with proper
    /// severity and source information.
    fn log_and_return_error(error: Error) -> Error {
        match &error {
            Error::InitializationFailed(msg) => {
                crate::engine_error!("pulsar3d::Engine", "Initialization failed: {}", msg);
            }
            Error::BackendError(msg) => {
                crate::engine_error!("pulsar3d::Engine", "Backend error: {}", msg);
            }
            _ => {
                crate::engine_error!("pulsar3d::Engine", "Engine error: {}", error);
            }
        }
        error
    }

    /// Initialize the engine
    ///
    /// This must be called once at application startup before creating any
    /// subsystems.
    ///
    /// # Errors
    ///
    /// Currently always succeeds, but returns Result for future extensibility.
    pub fn initialize() -> Result<()> {
        ENGINE_STATE.get_or_init(EngineState::new);
        Ok(())
    }

    /// Shutdown the entire engine and destroy all singletons
    ///
    /// This should be called at application shutdown to properly cleanup all
    /// subsystems. After calling this, you must call `initialize()` again
    /// before creating new subsystems.
    pub fn shutdown() {
        if let Some(state) = ENGINE_STATE.get() {
            // Clear backend
            if let Ok(mut backend) = state.backend.write() {
                *backend = None;
            }
        }
    }

    /// Create and register the render backend singleton
    ///
    /// This is a simplified API that automatically wraps the backend in Arc
    /// and registers it as a global singleton.
    ///
    /// # Arguments
    ///
    /// * `backend` - Any type implementing the RenderBackend trait
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The engine is not initialized
    /// - A backend already exists
    /// - The backend lock is poisoned
    pub fn create_backend<B: RenderBackend + 'static>(backend: B) -> Result<()> {
        // Wrap in Arc<Mutex<dyn RenderBackend>>
        let arc_backend: Arc<Mutex<dyn RenderBackend>> = Arc::new(Mutex::new(backend));

        // Register as singleton
        Self::register_backend(arc_backend)?;

        // Log successful creation
        crate::engine_info!("pulsar3d::Engine", "Render backend singleton created successfully");

        Ok(())
    }

    /// Register a backend singleton (internal use)
    ///
    /// This is called internally by create_backend(). Marked pub(crate) to
    /// allow access from other modules if needed.
    pub(crate) fn register_backend(backend: Arc<Mutex<dyn RenderBackend>>) -> Result<()> {
        let state = ENGINE_STATE.get()
            .ok_or_else(|| Self::log_and_return_error(
                Error::InitializationFailed("Engine not initialized. Call Engine::initialize() first.".to_string())
            ))?;

        let mut lock = state.backend.write()
            .map_err(|_| Self::log_and_return_error(
                Error::BackendError("Backend lock poisoned".to_string())
            ))?;

        if lock.is_some() {
            return Err(Self::log_and_return_error(
                Error::InitializationFailed("Backend already exists. Call Engine::destroy_backend() first.".to_string())
            ));
        }

        *lock = Some(backend);
        Ok(())
    }

    /// Get the render backend singleton
    ///
    /// This provides global access to the backend after it has been created.
    ///
    /// # Returns
    ///
    /// A shared pointer to the backend wrapped in a Mutex for thread-safe
    /// access
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The engine is not initialized
    /// - The backend has not been created
    pub fn backend() -> Result<Arc<Mutex<dyn RenderBackend>>> {
        let state = ENGINE_STATE.get()
            .ok_or_else(|| Self::log_and_return_error(
                Error::InitializationFailed("Engine not initialized. Call Engine::initialize() first.".to_string())
            ))?;

        let lock = state.backend.read()
            .map_err(|_| Self::log_and_return_error(
                Error::BackendError("Backend lock poisoned".to_string())
            ))?;

        lock.clone()
            .ok_or_else(|| Self::log_and_return_error(
                Error::InitializationFailed("Backend not created. Call Engine::create_backend() first.".to_string())
            ))
    }

    /// Destroy the render backend singleton
    ///
    /// Removes the backend singleton, allowing a new one to be created.
    /// All existing backend references will remain valid until dropped.
    ///
    /// A streaming buffer manager whose segments were created against the
    /// old backend must have had `destroy_all()` called before the switch.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine is not initialized
    pub fn destroy_backend() -> Result<()> {
        let state = ENGINE_STATE.get()
            .ok_or_else(|| Self::log_and_return_error(
                Error::InitializationFailed("Engine not initialized".to_string())
            ))?;

        let mut lock = state.backend.write()
            .map_err(|_| Self::log_and_return_error(
                Error::BackendError("Backend lock poisoned".to_string())
            ))?;

        *lock = None;

        // Log successful destruction
        crate::engine_info!("pulsar3d::Engine", "Render backend singleton destroyed");

        Ok(())
    }

    /// Reset all singletons for testing (only available in test builds)
    #[cfg(test)]
    pub fn reset_for_testing() {
        if let Some(state) = ENGINE_STATE.get() {
            if let Ok(mut backend) = state.backend.write() {
                *backend = None;
            }
        }
    }

    // ===== LOGGING API =====

    /// Set a custom logger
    ///
    /// Replace the default logger with a custom implementation (file logger,
    /// test capture, etc.)
    ///
    /// # Arguments
    ///
    /// * `logger` - Any type implementing the Logger trait
    pub fn set_logger<L: Logger + 'static>(logger: L) {
        let logger_lock = LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger::new())));
        if let Ok(mut lock) = logger_lock.write() {
            *lock = Box::new(logger);
        }
    }

    /// Reset logger to default (DefaultLogger)
    pub fn reset_logger() {
        let logger_lock = LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger::new())));
        if let Ok(mut lock) = logger_lock.write() {
            *lock = Box::new(DefaultLogger::new());
        }
    }

    /// Internal logging method (for simple logs without file:line)
    ///
    /// Used by macros like engine_info!, engine_warn!, etc.
    ///
    /// # Arguments
    ///
    /// * `severity` - Log severity level
    /// * `source` - Source module (e.g., "pulsar3d::Engine")
    /// * `message` - Log message
    pub fn log(severity: LogSeverity, source: &str, message: String) {
        let logger_lock = LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger::new())));
        if let Ok(lock) = logger_lock.read() {
            lock.log(&LogEntry {
                severity,
                timestamp: SystemTime::now(),
                source: source.to_string(),
                message,
                file: None,
                line: None,
            });
        }
    }

    /// Internal logging method with file:line information (for ERROR logs)
    ///
    /// Used by engine_error! and engine_err! to include source location.
    ///
    /// # Arguments
    ///
    /// * `severity` - Log severity level (typically Error)
    /// * `source` - Source module (e.g., "pulsar3d::Engine")
    /// * `message` - Log message
    /// * `file` - Source file path
    /// * `line` - Source line number
    pub fn log_detailed(
        severity: LogSeverity,
        source: &str,
        message: String,
        file: &'static str,
        line: u32,
    ) {
        let logger_lock = LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger::new())));
        if let Ok(lock) = logger_lock.read() {
            lock.log(&LogEntry {
                severity,
                timestamp: SystemTime::now(),
                source: source.to_string(),
                message,
                file: Some(file),
                line: Some(line),
            });
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
