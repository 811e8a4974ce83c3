//! Mock backend and buffer provider for unit tests (no GPU required)
//!
//! The mock backend journals every executed command so tests can assert
//! dispatch order. The mock provider backs buffers with host memory so
//! tests can read back exactly what the streaming cursors wrote.

use std::ops::Range;
use std::ptr::NonNull;

use slotmap::SlotMap;

use crate::error::Result;
use crate::engine_bail;
use crate::backend::{
    RenderBackend, BackendStats, BufferProvider, ProviderLimits,
    StreamBufferHandle, StreamBufferUsage, UnmapMode,
};
use crate::command::{ShaderStage, TextureHandle, RasterStateHandle, BlendStateHandle};

// ============================================================================
// Mock RenderBackend
// ============================================================================

/// Mock command executor that journals every call
#[derive(Debug, Default)]
pub struct MockBackend {
    /// Executed calls, in order, as human-readable strings
    pub journal: Vec<String>,
    stats: BackendStats,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain the journal, leaving it empty
    pub fn take_journal(&mut self) -> Vec<String> {
        std::mem::take(&mut self.journal)
    }
}

impl RenderBackend for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    fn bind_shader_buffer(
        &mut self,
        stage: ShaderStage,
        slot: u16,
        buffer: StreamBufferHandle,
        offset_bytes: u32,
        size_bytes: u32,
    ) -> Result<()> {
        self.journal.push(format!(
            "bind_shader_buffer {:?} slot={} buffer={:?} offset={} size={}",
            stage, slot, buffer, offset_bytes, size_bytes
        ));
        self.stats.commands_executed += 1;
        self.stats.buffer_binds += 1;
        Ok(())
    }

    fn bind_texture(&mut self, unit: u16, texture: TextureHandle) -> Result<()> {
        self.journal.push(format!("bind_texture unit={} texture={:?}", unit, texture));
        self.stats.commands_executed += 1;
        Ok(())
    }

    fn disable_textures_from(&mut self, unit: u16) -> Result<()> {
        self.journal.push(format!("disable_textures_from unit={}", unit));
        self.stats.commands_executed += 1;
        Ok(())
    }

    fn set_raster_state(&mut self, state: RasterStateHandle) -> Result<()> {
        self.journal.push(format!("set_raster_state {:?}", state));
        self.stats.commands_executed += 1;
        Ok(())
    }

    fn set_blend_state(&mut self, state: BlendStateHandle) -> Result<()> {
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

// ============================================================================
// Mock BufferProvider
// ============================================================================

/// A host-memory buffer backing one mock GPU buffer
#[derive(Debug)]
struct MockStreamBuffer {
    data: Box<[u8]>,
    usage: StreamBufferUsage,
    /// Currently mapped byte range, if any
    mapped: Option<Range<usize>>,
}

/// Mock buffer provider over host memory
///
/// Buffers are plain heap allocations, so pointers returned by `map` stay
/// valid until `destroy` frees the buffer (the heap block never moves when
/// the slot map grows).
#[derive(Debug)]
pub struct MockBufferProvider {
    buffers: SlotMap<StreamBufferHandle, MockStreamBuffer>,
    limits: ProviderLimits,
    /// Provider calls, in order, as human-readable strings
    pub journal: Vec<String>,
    /// Flushed ranges per unmap, in absolute buffer bytes
    pub flushed: Vec<(StreamBufferHandle, Range<usize>)>,
}

impl MockBufferProvider {
    /// Deliberately tiny limits so segment wrap/grow paths trigger fast
    pub const TEST_LIMITS: ProviderLimits = ProviderLimits {
        max_constant_buffer_size: 64,
        max_texture_buffer_size: 256,
        texture_buffer_alignment: 16,
    };

    pub fn new() -> Self {
        Self::with_limits(Self::TEST_LIMITS)
    }

    pub fn with_limits(limits: ProviderLimits) -> Self {
        Self {
            buffers: SlotMap::with_key(),
            limits,
            journal: Vec::new(),
            flushed: Vec::new(),
        }
    }

    /// Number of live (not destroyed) buffers
    pub fn buffer_count(&self) -> usize {
        self.buffers.len()
    }

    /// Contents of a buffer, for asserting what cursors wrote
    pub fn buffer_contents(&self, buffer: StreamBufferHandle) -> Option<&[u8]> {
        self.buffers.get(buffer).map(|b| &*b.data)
    }

    /// Whether a buffer currently holds a mapped range
    pub fn is_mapped(&self, buffer: StreamBufferHandle) -> bool {
        self.buffers.get(buffer).map(|b| b.mapped.is_some()).unwrap_or(false)
    }

    /// Usage the buffer was created with
    pub fn buffer_usage(&self, buffer: StreamBufferHandle) -> Option<StreamBufferUsage> {
        self.buffers.get(buffer).map(|b| b.usage)
    }
}

impl Default for MockBufferProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl BufferProvider for MockBufferProvider {
    fn create(&mut self, size: usize, usage: StreamBufferUsage) -> Result<StreamBufferHandle> {
        let cap = match usage {
            StreamBufferUsage::Constant => self.limits.max_constant_buffer_size,
            StreamBufferUsage::Texture => self.limits.max_texture_buffer_size,
        };
        if size > cap {
            engine_bail!(CapacityExceeded, "pulsar3d::mock",
                "create: size {} exceeds {:?} limit {}", size, usage, cap);
        }
        let handle = self.buffers.insert(MockStreamBuffer {
            data: vec![0u8; size].into_boxed_slice(),
            usage,
            mapped: None,
        });
        self.journal.push(format!("create size={} usage={:?} -> {:?}", size, usage, handle));
        Ok(handle)
    }

    fn destroy(&mut self, buffer: StreamBufferHandle) -> Result<()> {
        match self.buffers.get(buffer) {
            Some(b) if b.mapped.is_some() => {
                engine_bail!(InvalidResource, "pulsar3d::mock",
                    "destroy: buffer {:?} is still mapped", buffer);
            }
            Some(_) => {
                self.buffers.remove(buffer);
                self.journal.push(format!("destroy {:?}", buffer));
                Ok(())
            }
            None => {
                engine_bail!(InvalidResource, "pulsar3d::mock",
                    "destroy: unknown buffer {:?}", buffer);
            }
        }
    }

    fn map(&mut self, buffer: StreamBufferHandle, offset: usize, len: usize) -> Result<NonNull<u8>> {
        let entry = match self.buffers.get_mut(buffer) {
            Some(entry) => entry,
            None => engine_bail!(InvalidResource, "pulsar3d::mock",
                "map: unknown buffer {:?}", buffer),
        };
        if entry.mapped.is_some() {
            engine_bail!(InvalidResource, "pulsar3d::mock",
                "map: buffer {:?} is already mapped", buffer);
        }
        if offset + len > entry.data.len() {
            engine_bail!(InvalidResource, "pulsar3d::mock",
                "map: range {}..{} exceeds capacity {}", offset, offset + len, entry.data.len());
        }
        entry.mapped = Some(offset..offset + len);
        self.journal.push(format!("map {:?} offset={} len={}", buffer, offset, len));
        // The heap block backing `data` is stable; only the Box value moves
        // with the slot map.
        let ptr = unsafe { entry.data.as_mut_ptr().add(offset) };
        Ok(NonNull::new(ptr).unwrap())
    }

    fn unmap(&mut self, buffer: StreamBufferHandle, mode: UnmapMode, flushed: Range<usize>) -> Result<()> {
        let entry = match self.buffers.get_mut(buffer) {
            Some(entry) => entry,
            None => engine_bail!(InvalidResource, "pulsar3d::mock",
                "unmap: unknown buffer {:?}", buffer),
        };
        let mapped = match entry.mapped.take() {
            Some(mapped) => mapped,
            None => engine_bail!(InvalidResource, "pulsar3d::mock",
                "unmap: buffer {:?} is not mapped", buffer),
        };
        if flushed.end > mapped.end - mapped.start {
            engine_bail!(InvalidResource, "pulsar3d::mock",
                "unmap: flushed range {:?} exceeds mapped length {}",
                flushed, mapped.end - mapped.start);
        }
        let absolute = mapped.start + flushed.start..mapped.start + flushed.end;
        self.flushed.push((buffer, absolute));
        self.journal.push(format!("unmap {:?} mode={:?} flushed={:?}", buffer, mode, flushed));
        Ok(())
    }

    fn limits(&self) -> ProviderLimits {
        self.limits
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "mock_backend_tests.rs"]
mod tests;
