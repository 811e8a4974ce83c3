//! StreamingBufferManager - ring-buffer allocator over persistently-mapped
//! GPU buffers
//!
//! Owns two independent lines of buffers and hands out monotonically
//! advancing write cursors into whichever segment is currently mapped:
//!
//! - the constant-buffer line holds small fixed-size segments; each
//!   acquire consumes one whole segment for the pass
//! - the texture-buffer line holds larger segments reused across many
//!   small writes through a running, aligned byte offset
//!
//! Ownership of the mapped memory stays with the line; the cursors handed
//! out are relative `{segment, offset, length}` views, so no pointer can
//! dangle across a re-map event. All writes go through bounds-checked
//! manager methods.
//!
//! Single-producer: one manager instance is written from one thread at a
//! time. Recording and execution are sequential phases; the only
//! asynchrony (GPU consuming while the CPU writes the next frame) is
//! covered by the segment generation hooks.

use std::ptr::NonNull;

use crate::error::Result;
use crate::{engine_bail, engine_debug, engine_trace};
use crate::backend::{BufferProvider, StreamBufferUsage, UnmapMode};
use crate::command::{Command, CommandBuffer, CommandOffset, ShaderStage};
use crate::stream::segment::StreamSegment;

// ===== RESERVED BIND SLOTS =====

/// Slot at which the active constant segment is bound for both consumer
/// stages. Material code binds its own resources above the reserved slots.
pub const CONSTANT_BUFFER_SLOT: u16 = 2;

/// Slot of the first texture-buffer binding, used for bulk per-object data
pub const TEXTURE_BUFFER_SLOT: u16 = 0;

/// Size of each constant segment, capped by the provider limit
pub const CONSTANT_BUFFER_SIZE: usize = 64 * 1024;

// ===== CONFIGURATION =====

/// Streaming configuration
///
/// The single tunable: how large newly created texture segments are. The
/// provider's `max_texture_buffer_size` acts as a fixed fallback cap. The
/// value is a sizing knob, not a correctness invariant.
#[derive(Debug, Clone, Copy)]
pub struct StreamConfig {
    /// Default texture-buffer segment size, in bytes
    pub texture_buffer_default_size: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            texture_buffer_default_size: 4 * 1024 * 1024,
        }
    }
}

// ===== CURSOR =====

/// Relative view of a write position inside one segment
///
/// `byte_offset` is absolute within the segment; `region_len` is how many
/// bytes remain writable from there. A cursor never straddles two
/// segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamCursor {
    pub segment_index: usize,
    pub byte_offset: usize,
    pub region_len: usize,
}

// ===== INTERNAL LINE STATE =====

/// The at-most-one mapped write region of a line
#[derive(Debug)]
struct MappedRegion {
    /// Index of the mapped segment within the line
    segment_index: usize,
    /// CPU-visible pointer to the start of the mapping
    ptr: NonNull<u8>,
    /// Absolute byte offset of the mapping within the segment
    map_offset: usize,
    /// Length of the mapping
    map_len: usize,
    /// Start of the current sub-region, relative to the mapping start
    /// (advanced by texture rebinds; always 0 for the constant line)
    sub_start: usize,
    /// Bytes written since `sub_start`
    written: usize,
}

/// Ordered collection of segments of one kind, managed as a growable ring
#[derive(Debug)]
struct BufferLine {
    segments: Vec<StreamSegment>,
    /// Active segment index; monotonically non-decreasing within a frame
    active: usize,
    mapped: Option<MappedRegion>,
}

impl BufferLine {
    fn new() -> Self {
        Self {
            segments: Vec::new(),
            active: 0,
            mapped: None,
        }
    }

    /// Bounds-checked copy into the mapped region at the current write
    /// position
    fn write_bytes(&mut self, bytes: &[u8], line_name: &str) -> Result<()> {
        let region = match self.mapped.as_mut() {
            Some(region) => region,
            None => engine_bail!(InvalidResource, "pulsar3d::StreamManager",
                "write to the {} line without a mapped region", line_name),
        };
        let position = region.sub_start + region.written;
        if position + bytes.len() > region.map_len {
            engine_bail!(CapacityExceeded, "pulsar3d::StreamManager",
                "{} write of {} bytes exceeds the mapped region ({} of {} bytes used)",
                line_name, bytes.len(), position, region.map_len);
        }
        // Within the mapped range by the check above; the provider keeps
        // the pointer valid until unmap.
        unsafe {
            std::ptr::copy_nonoverlapping(
                bytes.as_ptr(),
                region.ptr.as_ptr().add(position),
                bytes.len(),
            );
        }
        region.written += bytes.len();
        Ok(())
    }

    /// Bytes still writable from the current write position
    fn remaining_bytes(&self) -> usize {
        match &self.mapped {
            Some(region) => region.map_len - region.sub_start - region.written,
            None => 0,
        }
    }

    /// Bytes written since the current sub-region was opened
    fn written_bytes(&self) -> usize {
        self.mapped.as_ref().map(|region| region.written).unwrap_or(0)
    }

    /// Current write position as a relative cursor
    fn cursor(&self) -> Option<StreamCursor> {
        self.mapped.as_ref().map(|region| {
            let position = region.sub_start + region.written;
            StreamCursor {
                segment_index: region.segment_index,
                byte_offset: region.map_offset + position,
                region_len: region.map_len - position,
            }
        })
    }
}

/// Round `offset` up to the next multiple of `alignment`
fn align_to_next(offset: usize, alignment: usize) -> usize {
    debug_assert!(alignment.is_power_of_two());
    (offset + alignment - 1) & !(alignment - 1)
}

// ===== STREAMING BUFFER MANAGER =====

/// Ring-buffer allocator over persistently-mapped GPU buffers
///
/// See the module documentation for the two-line model. The manager is a
/// pure client of the [`BufferProvider`] contract; it never talks to a
/// physical device directly.
#[derive(Debug)]
pub struct StreamingBufferManager {
    constant: BufferLine,
    texture: BufferLine,
    /// Running byte offset within the active texture segment; segments are
    /// reused across many small writes before moving on
    texture_byte_offset: usize,
    /// Offset of the still-open texture bind command, patched with the
    /// true written size once known
    last_texture_bind: Option<CommandOffset>,
    config: StreamConfig,
}

impl StreamingBufferManager {
    /// Create a manager with the default configuration
    pub fn new() -> Self {
        Self::with_config(StreamConfig::default())
    }

    /// Create a manager with an explicit configuration
    pub fn with_config(config: StreamConfig) -> Self {
        Self {
            constant: BufferLine::new(),
            texture: BufferLine::new(),
            texture_byte_offset: 0,
            last_texture_bind: None,
            config,
        }
    }

    /// The active configuration
    pub fn config(&self) -> StreamConfig {
        self.config
    }

    // ===== WARM-UP =====

    /// Ensure both lines hold at least one segment
    ///
    /// Commands recorded before the first write can then always reference
    /// a valid buffer without bounds checks downstream.
    pub fn ensure_segments(&mut self, provider: &mut dyn BufferProvider) -> Result<()> {
        let limits = provider.limits();
        if self.constant.segments.is_empty() {
            let size = CONSTANT_BUFFER_SIZE.min(limits.max_constant_buffer_size);
            let handle = provider.create(size, StreamBufferUsage::Constant)?;
            self.constant.segments.push(StreamSegment::new(handle, size, StreamBufferUsage::Constant));
        }
        if self.texture.segments.is_empty() {
            let size = self.config.texture_buffer_default_size.min(limits.max_texture_buffer_size);
            let handle = provider.create(size, StreamBufferUsage::Texture)?;
            self.texture.segments.push(StreamSegment::new(handle, size, StreamBufferUsage::Texture));
        }
        Ok(())
    }

    // ===== CONSTANT LINE =====

    /// Map the next constant segment for writing
    ///
    /// Unmaps the previously active segment (consuming it for this pass),
    /// lazily creates a segment if the line is exhausted, maps the new one
    /// whole, and records the two bind commands making it visible to both
    /// consumer stages at [`CONSTANT_BUFFER_SLOT`]. Returns a cursor at the
    /// start of the region.
    pub fn acquire_constant_write(
        &mut self,
        cmds: &mut CommandBuffer,
        provider: &mut dyn BufferProvider,
    ) -> Result<StreamCursor> {
        self.unmap_constant(provider)?;

        if self.constant.active >= self.constant.segments.len() {
            let limits = provider.limits();
            let size = CONSTANT_BUFFER_SIZE.min(limits.max_constant_buffer_size);
            let handle = provider.create(size, StreamBufferUsage::Constant)?;
            self.constant.segments.push(StreamSegment::new(handle, size, StreamBufferUsage::Constant));
            engine_debug!("pulsar3d::StreamManager",
                "constant line grew to {} segments", self.constant.segments.len());
        }

        let segment_index = self.constant.active;
        let (handle, capacity) = {
            let segment = &self.constant.segments[segment_index];
            (segment.handle(), segment.capacity_bytes())
        };

        let ptr = provider.map(handle, 0, capacity)?;
        self.constant.mapped = Some(MappedRegion {
            segment_index,
            ptr,
            map_offset: 0,
            map_len: capacity,
            sub_start: 0,
            written: 0,
        });

        cmds.add(Command::BindShaderBuffer {
            stage: ShaderStage::Vertex,
            slot: CONSTANT_BUFFER_SLOT,
            buffer: handle,
            offset_bytes: 0,
            size_bytes: capacity as u32,
        });
        cmds.add(Command::BindShaderBuffer {
            stage: ShaderStage::Fragment,
            slot: CONSTANT_BUFFER_SLOT,
            buffer: handle,
            offset_bytes: 0,
            size_bytes: capacity as u32,
        });

        engine_trace!("pulsar3d::StreamManager",
            "mapped constant segment {} ({} bytes)", segment_index, capacity);

        Ok(StreamCursor {
            segment_index,
            byte_offset: 0,
            region_len: capacity,
        })
    }

    /// Release the mapped constant region, if any
    ///
    /// The segment is considered consumed for this pass: the active index
    /// advances, so the next acquire targets a fresh segment.
    pub fn unmap_constant(&mut self, provider: &mut dyn BufferProvider) -> Result<()> {
        if let Some(region) = self.constant.mapped.take() {
            let handle = self.constant.segments[region.segment_index].handle();
            provider.unmap(handle, UnmapMode::KeepPersistent, 0..region.written)?;
            self.constant.active += 1;
        }
        Ok(())
    }

    /// Write POD values at the constant cursor, advancing it
    pub fn write_constants<T: bytemuck::Pod>(&mut self, data: &[T]) -> Result<()> {
        self.constant.write_bytes(bytemuck::cast_slice(data), "constant")
    }

    /// Bytes still writable in the mapped constant region (0 if unmapped)
    pub fn constant_remaining_bytes(&self) -> usize {
        self.constant.remaining_bytes()
    }

    /// Bytes written into the mapped constant region so far
    pub fn constant_written_bytes(&self) -> usize {
        self.constant.written_bytes()
    }

    /// Current constant write position, if a region is mapped
    pub fn constant_cursor(&self) -> Option<StreamCursor> {
        self.constant.cursor()
    }

    // ===== TEXTURE LINE =====

    /// Map the next texture region of at least `min_bytes`
    ///
    /// Unmaps the current cursor (closing its bind command), aligns the
    /// running byte offset, and wraps to the next segment - creating one
    /// sized by the configuration, capped by the provider limit - when the
    /// remainder of the current segment cannot satisfy the request. Maps
    /// from the chosen offset to the end of the segment and records one
    /// bind command at [`TEXTURE_BUFFER_SLOT`]. Returns a cursor at the
    /// start of the region.
    ///
    /// A request above the capped segment size is a caller
    /// under-provisioning bug and fails with `CapacityExceeded`.
    pub fn acquire_texture_write(
        &mut self,
        cmds: &mut CommandBuffer,
        provider: &mut dyn BufferProvider,
        min_bytes: usize,
    ) -> Result<StreamCursor> {
        self.unmap_texture(cmds, provider)?;

        let limits = provider.limits();
        let segment_size = self.config.texture_buffer_default_size.min(limits.max_texture_buffer_size);
        if min_bytes > segment_size {
            engine_bail!(CapacityExceeded, "pulsar3d::StreamManager",
                "texture write of {} bytes exceeds the maximum pass-buffer size {}",
                min_bytes, segment_size);
        }

        self.texture_byte_offset = align_to_next(self.texture_byte_offset, limits.texture_buffer_alignment);

        // Wrap when the remainder of the active segment cannot fit the
        // request.
        if self.texture.active < self.texture.segments.len() {
            let capacity = self.texture.segments[self.texture.active].capacity_bytes();
            if self.texture_byte_offset + min_bytes > capacity {
                self.texture.active += 1;
                self.texture_byte_offset = 0;
            }
        }

        if self.texture.active >= self.texture.segments.len() {
            let handle = provider.create(segment_size, StreamBufferUsage::Texture)?;
            self.texture.segments.push(StreamSegment::new(handle, segment_size, StreamBufferUsage::Texture));
            self.texture_byte_offset = 0;
            engine_debug!("pulsar3d::StreamManager",
                "texture line grew to {} segments", self.texture.segments.len());
        }

        let segment_index = self.texture.active;
        let (handle, capacity) = {
            let segment = &self.texture.segments[segment_index];
            (segment.handle(), segment.capacity_bytes())
        };

        let map_offset = self.texture_byte_offset;
        let map_len = capacity - map_offset;
        let ptr = provider.map(handle, map_offset, map_len)?;
        self.texture.mapped = Some(MappedRegion {
            segment_index,
            ptr,
            map_offset,
            map_len,
            sub_start: 0,
            written: 0,
        });

        let bind = cmds.add(Command::BindShaderBuffer {
            stage: ShaderStage::Vertex,
            slot: TEXTURE_BUFFER_SLOT,
            buffer: handle,
            offset_bytes: map_offset as u32,
            size_bytes: map_len as u32,
        });
        self.last_texture_bind = Some(bind);

        engine_trace!("pulsar3d::StreamManager",
            "mapped texture segment {} at offset {} ({} bytes)", segment_index, map_offset, map_len);

        Ok(StreamCursor {
            segment_index,
            byte_offset: map_offset,
            region_len: map_len,
        })
    }

    /// Advance the bound byte range within the already-mapped texture
    /// segment
    ///
    /// Cheaper than a re-map when a caller only needs its own sub-region
    /// (e.g. a different material family). Closes the open bind command
    /// with the bytes actually written, then:
    ///
    /// - with `reset_offset`, advances the cursor within the current
    ///   mapping (aligned, clamped to capacity) and records a new bind at
    ///   the new offset - falling back to [`acquire_texture_write`] when
    ///   `min_bytes` no longer fits the remainder;
    /// - without `reset_offset`, re-records the bind for the current
    ///   sub-region (state-switch re-bind) and leaves the cursor alone.
    ///
    /// [`acquire_texture_write`]: StreamingBufferManager::acquire_texture_write
    pub fn rebind_texture(
        &mut self,
        cmds: &mut CommandBuffer,
        provider: &mut dyn BufferProvider,
        reset_offset: bool,
        min_bytes: usize,
    ) -> Result<StreamCursor> {
        let (segment_index, map_offset, map_len, sub_start, written) = match &self.texture.mapped {
            Some(region) => (
                region.segment_index,
                region.map_offset,
                region.map_len,
                region.sub_start,
                region.written,
            ),
            None => engine_bail!(InvalidResource, "pulsar3d::StreamManager",
                "rebind_texture without a mapped texture region"),
        };

        self.patch_last_texture_bind(cmds, written)?;

        let mut current = sub_start + written;
        if reset_offset {
            let alignment = provider.limits().texture_buffer_alignment;
            current = align_to_next(current, alignment);
        }
        current = current.min(map_len);

        if map_len - current < min_bytes {
            return self.acquire_texture_write(cmds, provider, min_bytes);
        }

        let handle = self.texture.segments[segment_index].handle();
        if reset_offset {
            let bind = cmds.add(Command::BindShaderBuffer {
                stage: ShaderStage::Vertex,
                slot: TEXTURE_BUFFER_SLOT,
                buffer: handle,
                offset_bytes: (map_offset + current) as u32,
                size_bytes: (map_len - current) as u32,
            });
            self.last_texture_bind = Some(bind);
            if let Some(region) = self.texture.mapped.as_mut() {
                region.sub_start = current;
                region.written = 0;
            }
        } else {
            let bind = cmds.add(Command::BindShaderBuffer {
                stage: ShaderStage::Vertex,
                slot: TEXTURE_BUFFER_SLOT,
                buffer: handle,
                offset_bytes: (map_offset + sub_start) as u32,
                size_bytes: (map_len - sub_start) as u32,
            });
            self.last_texture_bind = Some(bind);
        }

        Ok(StreamCursor {
            segment_index,
            byte_offset: map_offset + current,
            region_len: map_len - current,
        })
    }

    /// Release the mapped texture region, if any
    ///
    /// Closes the open bind command with the true written size, flushes
    /// the written range, and advances the running byte offset within the
    /// line; the next caller's offset is re-aligned at acquire time.
    pub fn unmap_texture(
        &mut self,
        cmds: &mut CommandBuffer,
        provider: &mut dyn BufferProvider,
    ) -> Result<()> {
        if let Some(region) = self.texture.mapped.take() {
            self.patch_last_texture_bind(cmds, region.written)?;
            let handle = self.texture.segments[region.segment_index].handle();
            let consumed = region.sub_start + region.written;
            provider.unmap(handle, UnmapMode::KeepPersistent, 0..consumed)?;
            self.texture_byte_offset = region.map_offset + consumed;
        }
        Ok(())
    }

    /// Write POD values at the texture cursor, advancing it
    pub fn write_texture_data<T: bytemuck::Pod>(&mut self, data: &[T]) -> Result<()> {
        self.texture.write_bytes(bytemuck::cast_slice(data), "texture")
    }

    /// Bytes still writable in the mapped texture region (0 if unmapped)
    pub fn texture_remaining_bytes(&self) -> usize {
        self.texture.remaining_bytes()
    }

    /// Bytes written into the current texture sub-region so far
    pub fn texture_written_bytes(&self) -> usize {
        self.texture.written_bytes()
    }

    /// Current texture write position, if a region is mapped
    pub fn texture_cursor(&self) -> Option<StreamCursor> {
        self.texture.cursor()
    }

    /// Patch the still-open texture bind command with the bytes actually
    /// written since it was recorded
    fn patch_last_texture_bind(&mut self, cmds: &mut CommandBuffer, written: usize) -> Result<()> {
        if let Some(offset) = self.last_texture_bind.take() {
            match cmds.command_at_mut(offset) {
                Some(Command::BindShaderBuffer { size_bytes, .. }) => {
                    *size_bytes = written as u32;
                }
                Some(other) => {
                    engine_bail!(InvalidCommand, "pulsar3d::StreamManager",
                        "texture bind patch offset {:?} references {:?}", offset, other);
                }
                None => {
                    engine_bail!(InvalidCommand, "pulsar3d::StreamManager",
                        "texture bind patch offset {:?} is out of bounds; the command buffer \
                         was cleared while a texture region was open", offset);
                }
            }
        }
        Ok(())
    }

    // ===== FRAME BOUNDARY HOOKS =====

    /// Called immediately before a command buffer bound to these lines is
    /// executed
    ///
    /// Flushes any still-open cursors and advances the generation of every
    /// texture segment: the backend may now read the regions just
    /// released, and the next frame's writes must target the next
    /// generation.
    pub fn pre_execution(
        &mut self,
        cmds: &mut CommandBuffer,
        provider: &mut dyn BufferProvider,
    ) -> Result<()> {
        self.unmap_constant(provider)?;
        self.unmap_texture(cmds, provider)?;
        for segment in &mut self.texture.segments {
            segment.advance_generation();
        }
        Ok(())
    }

    /// Mirror of [`pre_execution`], used when an execution is rolled back
    /// or retried without having actually consumed the frame
    ///
    /// [`pre_execution`]: StreamingBufferManager::pre_execution
    pub fn post_execution(&mut self) {
        for segment in &mut self.texture.segments {
            segment.regress_generation();
        }
    }

    /// End-of-frame notification
    ///
    /// Resets the active-segment indices to the start of each line and
    /// advances every segment's generation, whether or not the segment was
    /// touched this frame - every segment eventually cycles through its
    /// multi-buffering slots even under light load.
    pub fn frame_ended(&mut self) {
        self.constant.active = 0;
        self.texture.active = 0;
        self.texture_byte_offset = 0;
        for segment in &mut self.constant.segments {
            segment.advance_generation();
        }
        for segment in &mut self.texture.segments {
            segment.advance_generation();
        }
    }

    // ===== TEARDOWN =====

    /// Release every segment in both lines back to the provider
    ///
    /// Unmaps anything still mapped (any still-open bind size is
    /// abandoned) and resets all cursors and indices to their initial
    /// state. Called on backend switch and on destruction.
    pub fn destroy_all(&mut self, provider: &mut dyn BufferProvider) -> Result<()> {
        if let Some(region) = self.constant.mapped.take() {
            let handle = self.constant.segments[region.segment_index].handle();
            provider.unmap(handle, UnmapMode::UnmapAll, 0..region.sub_start + region.written)?;
        }
        if let Some(region) = self.texture.mapped.take() {
            let handle = self.texture.segments[region.segment_index].handle();
            provider.unmap(handle, UnmapMode::UnmapAll, 0..region.sub_start + region.written)?;
        }
        for segment in self.constant.segments.drain(..) {
            provider.destroy(segment.handle())?;
        }
        for segment in self.texture.segments.drain(..) {
            provider.destroy(segment.handle())?;
        }
        self.constant.active = 0;
        self.texture.active = 0;
        self.texture_byte_offset = 0;
        self.last_texture_bind = None;
        engine_debug!("pulsar3d::StreamManager", "destroyed all streaming segments");
        Ok(())
    }

    // ===== INTROSPECTION =====

    /// Segments of the constant line
    pub fn constant_segments(&self) -> &[StreamSegment] {
        &self.constant.segments
    }

    /// Segments of the texture line
    pub fn texture_segments(&self) -> &[StreamSegment] {
        &self.texture.segments
    }

    /// Active segment index of the constant line
    pub fn constant_active_index(&self) -> usize {
        self.constant.active
    }

    /// Active segment index of the texture line
    pub fn texture_active_index(&self) -> usize {
        self.texture.active
    }

    /// Running byte offset within the active texture segment
    pub fn texture_line_offset(&self) -> usize {
        self.texture_byte_offset
    }
}

impl Default for StreamingBufferManager {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "stream_manager_tests.rs"]
mod tests;
