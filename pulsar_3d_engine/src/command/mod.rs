//! Command module - deferred command recording and replay
//!
//! Commands are fixed-size POD values recorded into a [`CommandBuffer`]
//! during a frame and replayed in order against the active backend through
//! the dispatch table. Recording and execution are strictly sequential
//! phases; nothing here blocks or suspends.

// Module declarations
pub mod command;
pub mod command_buffer;
pub mod dispatch;

// Re-export everything from command.rs
pub use command::*;

// Re-export from other modules
pub use command_buffer::*;
pub use dispatch::*;
