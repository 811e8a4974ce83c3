//! Dispatch table - command tag to executor function
//!
//! A dense array indexed by [`CommandType`], each slot a plain function
//! pointer that forwards one command variant to the matching
//! [`RenderBackend`] method. The `Invalid` slot defends against executing
//! uninitialized or corrupted command memory.

use crate::error::Result;
use crate::engine_bail;
use crate::backend::RenderBackend;
use crate::command::{Command, CommandType};

/// Executor function for one command type
pub type CommandExecuteFn = fn(&Command, &mut dyn RenderBackend) -> Result<()>;

/// Dense dispatch table, indexed by `CommandType as usize`
///
/// Order must match the [`CommandType`] discriminants.
pub static DISPATCH_TABLE: [CommandExecuteFn; CommandType::COUNT] = [
    execute_invalid,
    execute_bind_shader_buffer,
    execute_bind_texture,
    execute_disable_textures_from,
    execute_set_raster_state,
    execute_set_blend_state,
    execute_draw,
    execute_draw_indexed,
];

/// Reached only through corrupt or uninitialized command memory
fn execute_invalid(command: &Command, _backend: &mut dyn RenderBackend) -> Result<()> {
    engine_bail!(InvalidCommand, "pulsar3d::Dispatch",
        "executed an Invalid command slot ({:?}); command memory is corrupt", command)
}

fn execute_bind_shader_buffer(command: &Command, backend: &mut dyn RenderBackend) -> Result<()> {
    match *command {
        Command::BindShaderBuffer { stage, slot, buffer, offset_bytes, size_bytes } => {
            backend.bind_shader_buffer(stage, slot, buffer, offset_bytes, size_bytes)
        }
        _ => execute_mismatch("BindShaderBuffer", command),
    }
}

fn execute_bind_texture(command: &Command, backend: &mut dyn RenderBackend) -> Result<()> {
    match *command {
        Command::BindTexture { unit, texture } => backend.bind_texture(unit, texture),
        _ => execute_mismatch("BindTexture", command),
    }
}

fn execute_disable_textures_from(command: &Command, backend: &mut dyn RenderBackend) -> Result<()> {
    match *command {
        Command::DisableTexturesFrom { unit } => backend.disable_textures_from(unit),
        _ => execute_mismatch("DisableTexturesFrom", command),
    }
}

fn execute_set_raster_state(command: &Command, backend: &mut dyn RenderBackend) -> Result<()> {
    match *command {
        Command::SetRasterState { state } => backend.set_raster_state(state),
        _ => execute_mismatch("SetRasterState", command),
    }
}

fn execute_set_blend_state(command: &Command, backend: &mut dyn RenderBackend) -> Result<()> {
    match *command {
        Command::SetBlendState { state } => backend.set_blend_state(state),
        _ => execute_mismatch("SetBlendState", command),
    }
}

fn execute_draw(command: &Command, backend: &mut dyn RenderBackend) -> Result<()> {
    match *command {
        Command::Draw { vertex_count, first_vertex } => backend.draw(vertex_count, first_vertex),
        _ => execute_mismatch("Draw", command),
    }
}

fn execute_draw_indexed(command: &Command, backend: &mut dyn RenderBackend) -> Result<()> {
    match *command {
        Command::DrawIndexed { index_count, first_index, vertex_offset } => {
            backend.draw_indexed(index_count, first_index, vertex_offset)
        }
        _ => execute_mismatch("DrawIndexed", command),
    }
}

/// Tag/payload disagreement - same fatal class as an Invalid slot
fn execute_mismatch(expected: &str, command: &Command) -> Result<()> {
    engine_bail!(InvalidCommand, "pulsar3d::Dispatch",
        "dispatch entry for {} received {:?}; command memory is corrupt", expected, command)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
