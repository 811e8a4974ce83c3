//! Stream module - ring-buffer streaming of per-draw data into
//! persistently-mapped GPU buffers
//!
//! Two independent lines of buffers are managed: a constant-buffer line
//! for tightly packed per-draw scalars and a texture-buffer line for
//! bulkier structured data such as matrices. Write cursors advance
//! monotonically; wrap, growth, and re-mapping are transparent to the
//! caller.

// Module declarations
pub mod segment;
pub mod stream_manager;
pub mod draw_stream;

// Re-export everything from stream_manager.rs
pub use stream_manager::*;

// Re-export from other modules
pub use segment::*;
pub use draw_stream::*;
