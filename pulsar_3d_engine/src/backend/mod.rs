//! Backend module - contracts between the streaming core and the
//! graphics backend
//!
//! The core never talks to a physical device directly. It records commands
//! and streams bytes; a backend implementation (headless, Vulkan, ...)
//! executes the commands and owns the GPU buffers.

// Module declarations
pub mod render_backend;
pub mod buffer_provider;

#[cfg(test)]
pub mod mock_backend;

// Re-export everything from render_backend.rs
pub use render_backend::*;

// Re-export from other modules
pub use buffer_provider::*;
