//! DrawStreamer - per-object streaming into the two buffer lines
//!
//! The rendering-loop-facing glue: for each visible object it checks the
//! remaining capacity of both lines, re-acquires or rebinds on exhaustion,
//! writes the object's constant element and its world-view-projection
//! matrix, and returns the object's draw index within the current constant
//! segment.

use glam::Mat4;

use crate::error::Result;
use crate::engine_bail;
use crate::backend::BufferProvider;
use crate::command::CommandBuffer;
use crate::pass::PreparedPass;
use crate::stream::StreamingBufferManager;

/// 32-bit words per draw in the constant line: material index, depth bias,
/// two spare words
pub const CONSTANT_WORDS_PER_DRAW: usize = 4;

/// Bytes per draw in the texture line: one world-view-projection matrix
pub const TEXTURE_BYTES_PER_DRAW: usize = 64;

/// Streams one constant element and one matrix per visible object
///
/// Stateless between objects; all streaming state lives in the
/// [`StreamingBufferManager`].
#[derive(Debug, Default)]
pub struct DrawStreamer;

impl DrawStreamer {
    pub fn new() -> Self {
        Self
    }

    /// Write one object's per-draw data, wrapping buffers as needed
    ///
    /// Records bind commands into `cmds` whenever a line is re-acquired,
    /// so subsequent draws in this pass see the new buffers without extra
    /// caller bookkeeping.
    ///
    /// # Returns
    ///
    /// The draw index of this object within the current constant segment;
    /// the shader indexes the constant element array with it.
    pub fn write_instance(
        &mut self,
        manager: &mut StreamingBufferManager,
        cmds: &mut CommandBuffer,
        provider: &mut dyn BufferProvider,
        pass: &PreparedPass,
        world: &Mat4,
        material_index: u32,
        depth_bias: f32,
        use_identity_projection: bool,
    ) -> Result<u32> {
        let exceeds_constant =
            manager.constant_remaining_bytes() < CONSTANT_WORDS_PER_DRAW * 4;
        let exceeds_texture =
            manager.texture_remaining_bytes() < TEXTURE_BYTES_PER_DRAW;

        if exceeds_constant || exceeds_texture {
            // Both lines restart together so the draw index stays in step
            // with the matrix slot.
            manager.acquire_constant_write(cmds, provider)?;
            if exceeds_texture {
                manager.acquire_texture_write(cmds, provider, TEXTURE_BYTES_PER_DRAW)?;
            } else {
                manager.rebind_texture(cmds, provider, true, TEXTURE_BYTES_PER_DRAW)?;
            }
        }

        let world_view_proj = *pass.view_projection(use_identity_projection) * *world;

        manager.write_constants(&[material_index, depth_bias.to_bits(), 0u32, 0u32])?;
        manager.write_texture_data(std::slice::from_ref(&world_view_proj))?;

        let draw_id = manager.constant_written_bytes() / (CONSTANT_WORDS_PER_DRAW * 4) - 1;
        Ok(draw_id as u32)
    }

    /// Immediate per-draw path, deliberately unsupported
    ///
    /// Streaming only works batched through a command buffer on this
    /// configuration; callers hitting this path must switch their queue
    /// settings.
    pub fn write_instance_immediate(
        &mut self,
        _manager: &mut StreamingBufferManager,
        _world: &Mat4,
        _material_index: u32,
    ) -> Result<u32> {
        engine_bail!(NotImplemented, "pulsar3d::DrawStreamer",
            "immediate per-draw path is not available; record through a command buffer")
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "draw_stream_tests.rs"]
mod tests;
