//! HeadlessBackend - command executor over host state
//!
//! Executes replayed commands by updating a shadow copy of the pipeline
//! state (bound buffers, textures, state blocks) and journaling every
//! call. Tests and capture tools read the shadow state back instead of
//! rendering.

use rustc_hash::FxHashMap;

use pulsar_3d_engine::pulsar3d::Result;
use pulsar_3d_engine::pulsar3d::backend::{BackendStats, RenderBackend, StreamBufferHandle};
use pulsar_3d_engine::pulsar3d::command::{
    BlendStateHandle, RasterStateHandle, ShaderStage, TextureHandle,
};

/// A buffer range bound at a shader-visible slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundBufferRange {
    pub buffer: StreamBufferHandle,
    pub offset_bytes: u32,
    pub size_bytes: u32,
}

/// Headless command executor
///
/// Tracks what a real device would have bound after replaying a command
/// stream.
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    journal: Vec<String>,
    bound_buffers: FxHashMap<(ShaderStage, u16), BoundBufferRange>,
    bound_textures: FxHashMap<u16, TextureHandle>,
    raster_state: Option<RasterStateHandle>,
    blend_state: Option<BlendStateHandle>,
    stats: BackendStats,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Executed calls, in order, as human-readable strings
    pub fn journal(&self) -> &[String] {
        &self.journal
    }

    /// Drain the journal, leaving it empty
    pub fn take_journal(&mut self) -> Vec<String> {
        std::mem::take(&mut self.journal)
    }

    /// The buffer range currently bound at `(stage, slot)`, if any
    pub fn bound_buffer(&self, stage: ShaderStage, slot: u16) -> Option<BoundBufferRange> {
        self.bound_buffers.get(&(stage, slot)).copied()
    }

    /// The texture currently bound at `unit`, if any
    pub fn bound_texture(&self, unit: u16) -> Option<TextureHandle> {
        self.bound_textures.get(&unit).copied()
    }

    /// The active rasterizer state block, if any
    pub fn current_raster_state(&self) -> Option<RasterStateHandle> {
        self.raster_state
    }

    /// The active blend state block, if any
    pub fn current_blend_state(&self) -> Option<BlendStateHandle> {
        self.blend_state
    }
}

impl RenderBackend for HeadlessBackend {
    fn name(&self) -> &str {
        "headless"
    }

    fn bind_shader_buffer(
        &mut self,
        stage: ShaderStage,
        slot: u16,
        buffer: StreamBufferHandle,
        offset_bytes: u32,
        size_bytes: u32,
    ) -> Result<()> {
        self.bound_buffers.insert(
            (stage, slot),
            BoundBufferRange { buffer, offset_bytes, size_bytes },
        );
        self.journal.push(format!(
            "bind_shader_buffer {:?} slot={} offset={} size={}",
            stage, slot, offset_bytes, size_bytes
        ));
        self.stats.commands_executed += 1;
        self.stats.buffer_binds += 1;
        Ok(())
    }

    fn bind_texture(&mut self, unit: u16, texture: TextureHandle) -> Result<()> {
        self.bound_textures.insert(unit, texture);
        self.journal.push(format!("bind_texture unit={} texture={:?}", unit, texture));
        self.stats.commands_executed += 1;
        Ok(())
    }

    fn disable_textures_from(&mut self, unit: u16) -> Result<()> {
        self.bound_textures.retain(|&bound_unit, _| bound_unit < unit);
        self.journal.push(format!("disable_textures_from unit={}", unit));
        self.stats.commands_executed += 1;
        Ok(())
    }

    fn set_raster_state(&mut self, state: RasterStateHandle) -> Result<()> {
        self.raster_state = Some(state);
        self.journal.push(format!("set_raster_state {:?}", state));
        self.stats.commands_executed += 1;
        Ok(())
    }

    fn set_blend_state(&mut self, state: BlendStateHandle) -> Result<()> {
        self.blend_state = Some(state);
        self.journal.push(format!("set_blend_state {:?}", state));
        self.stats.commands_executed += 1;
        Ok(())
    }

    fn draw(&mut self, vertex_count: u32, first_vertex: u32) -> Result<()> {
        self.journal.push(format!("draw count={} first={}", vertex_count, first_vertex));
        self.stats.commands_executed += 1;
        self.stats.draw_calls += 1;
        Ok(())
    }

    fn draw_indexed(&mut self, index_count: u32, first_index: u32, vertex_offset: i32) -> Result<()> {
        self.journal.push(format!(
            "draw_indexed count={} first={} vertex_offset={}",
            index_count, first_index, vertex_offset
        ));
        self.stats.commands_executed += 1;
        self.stats.draw_calls += 1;
        Ok(())
    }

    fn stats(&self) -> BackendStats {
        self.stats
    }
}
