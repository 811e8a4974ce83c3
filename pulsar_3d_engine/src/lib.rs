/*!
# Pulsar 3D Engine

Streaming-data backbone for the Pulsar3D real-time rendering pipeline.

This crate provides the platform-agnostic core that lets a high-volume,
per-object rendering loop write per-draw data (transforms, material
indices, texture bindings) into GPU-visible memory every frame, and lets
the CPU queue state-changing/draw operations without immediately executing
them against the graphics backend. Backend implementations (headless,
Vulkan, etc.) are loaded at runtime via the plugin system.

## Architecture

- **CommandBuffer**: append-only recording and sequential replay of
  fixed-size commands
- **StreamingBufferManager**: ring-buffer allocator over
  persistently-mapped GPU buffers (a constant line and a texture line)
- **DrawStreamer**: per-object streaming glue used by the rendering loop
- **PreparedPass**: per-pass cache of combined camera matrices
- **RenderBackend / BufferProvider**: the two narrow contracts a backend
  implements

Backend implementations provide concrete types that implement these traits.
*/

// Internal modules
mod error;
mod engine;
pub mod log;
pub mod backend;
pub mod command;
pub mod pass;
pub mod stream;

// Main pulsar3d namespace module
pub mod pulsar3d {
    // Error types
    pub use crate::error::{Error, Result};

    // Engine singleton
    pub use crate::engine::Engine;

    // Backend contracts
    pub use crate::backend::{RenderBackend, BufferProvider};

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
        // Note: engine_* macros are NOT re-exported here - they are internal only
    }

    // Backend sub-module with the contract types
    pub mod backend {
        pub use crate::backend::*;
    }

    // Command sub-module
    pub mod command {
        pub use crate::command::*;
    }

    // Stream sub-module
    pub mod stream {
        pub use crate::stream::*;
    }

    // Pass sub-module
    pub mod pass {
        pub use crate::pass::*;
    }
}

// Re-export math library at crate root
pub use glam;
