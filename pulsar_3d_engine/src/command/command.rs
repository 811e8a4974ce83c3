//! Command types - fixed-size tagged records
//!
//! Every deferred operation is one `Command` value. All variants share one
//! slot size so the buffer is a plain dense array; a compile-time
//! assertion pins the size.

use crate::backend::StreamBufferHandle;

// ===== EXTERNAL RESOURCE HANDLES =====

/// Opaque handle to a texture owned by downstream material code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u32);

/// Opaque handle to a rasterizer state block owned by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RasterStateHandle(pub u32);

/// Opaque handle to a blend state block owned by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlendStateHandle(pub u32);

// ===== SHADER STAGE =====

/// Consumer stage reading a bound buffer
///
/// The streaming core only distinguishes the two stages that read its
/// reserved bind slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

// ===== COMMAND TYPE TAG =====

/// Command type tag, used as the dispatch table index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(usize)]
pub enum CommandType {
    /// Never legitimately recorded; executing it is a fatal internal error
    Invalid = 0,
    BindShaderBuffer,
    BindTexture,
    DisableTexturesFrom,
    SetRasterState,
    SetBlendState,
    Draw,
    DrawIndexed,
}

impl CommandType {
    /// Number of command types (dispatch table length)
    pub const COUNT: usize = 8;
}

// ===== COMMAND =====

/// Maximum size of one command slot, in bytes
///
/// All variants must fit; violating this is a build-time class of bug, so
/// it is enforced by the compile-time assertion below rather than at
/// recording time.
pub const COMMAND_SLOT_SIZE: usize = 32;

/// A single recorded, fixed-size instruction describing a state change or
/// draw operation to be executed later.
///
/// Commands are value types; once recorded they are owned by the command
/// buffer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Placeholder for uninitialized/corrupt command memory
    Invalid,

    /// Bind a streaming buffer range at a shader-visible slot
    BindShaderBuffer {
        stage: ShaderStage,
        slot: u16,
        buffer: StreamBufferHandle,
        offset_bytes: u32,
        /// Patched after recording once the true written size is known
        size_bytes: u32,
    },

    /// Bind a texture to a unit
    BindTexture {
        unit: u16,
        texture: TextureHandle,
    },

    /// Unbind every texture unit from `unit` upward
    DisableTexturesFrom {
        unit: u16,
    },

    /// Switch the active rasterizer state block
    SetRasterState {
        state: RasterStateHandle,
    },

    /// Switch the active blend state block
    SetBlendState {
        state: BlendStateHandle,
    },

    /// Non-indexed draw
    Draw {
        vertex_count: u32,
        first_vertex: u32,
    },

    /// Indexed draw
    DrawIndexed {
        index_count: u32,
        first_index: u32,
        vertex_offset: i32,
    },
}

// Every variant must fit the fixed slot size.
const _: () = assert!(std::mem::size_of::<Command>() <= COMMAND_SLOT_SIZE);

impl Command {
    /// The dispatch tag of this command
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::Invalid => CommandType::Invalid,
            Command::BindShaderBuffer { .. } => CommandType::BindShaderBuffer,
            Command::BindTexture { .. } => CommandType::BindTexture,
            Command::DisableTexturesFrom { .. } => CommandType::DisableTexturesFrom,
            Command::SetRasterState { .. } => CommandType::SetRasterState,
            Command::SetBlendState { .. } => CommandType::SetBlendState,
            Command::Draw { .. } => CommandType::Draw,
            Command::DrawIndexed { .. } => CommandType::DrawIndexed,
        }
    }
}
