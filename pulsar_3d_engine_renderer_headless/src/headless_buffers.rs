//! HeadlessBufferProvider - streaming buffers over host memory
//!
//! Buffers are plain heap allocations with persistent-mapping semantics:
//! `map` hands out a pointer into the allocation, `unmap` records the
//! flushed range. The heap block backing each buffer never moves while the
//! buffer lives, so mapped pointers stay valid until `destroy`.

use std::ops::Range;
use std::ptr::NonNull;

use slotmap::SlotMap;

use pulsar_3d_engine::engine_bail;
use pulsar_3d_engine::pulsar3d::Result;
use pulsar_3d_engine::pulsar3d::backend::{
    BufferProvider, ProviderLimits, StreamBufferHandle, StreamBufferUsage, UnmapMode,
};

/// Limits reported by the headless device
pub const HEADLESS_LIMITS: ProviderLimits = ProviderLimits {
    max_constant_buffer_size: 64 * 1024,
    max_texture_buffer_size: 128 * 1024 * 1024,
    texture_buffer_alignment: 256,
};

/// One host-memory buffer
#[derive(Debug)]
struct HeadlessBuffer {
    data: Box<[u8]>,
    usage: StreamBufferUsage,
    mapped: Option<Range<usize>>,
}

/// Buffer provider over host memory
#[derive(Debug)]
pub struct HeadlessBufferProvider {
    buffers: SlotMap<StreamBufferHandle, HeadlessBuffer>,
    limits: ProviderLimits,
    bytes_allocated: usize,
    flush_count: u64,
    flushed_bytes: u64,
}

impl HeadlessBufferProvider {
    pub fn new() -> Self {
        Self::with_limits(HEADLESS_LIMITS)
    }

    /// Override the reported limits (integration tests use small ones to
    /// exercise wrap paths quickly)
    pub fn with_limits(limits: ProviderLimits) -> Self {
        Self {
            buffers: SlotMap::with_key(),
            limits,
            bytes_allocated: 0,
            flush_count: 0,
            flushed_bytes: 0,
        }
    }

    /// Number of live buffers
    pub fn buffer_count(&self) -> usize {
        self.buffers.len()
    }

    /// Total bytes currently allocated
    pub fn bytes_allocated(&self) -> usize {
        self.bytes_allocated
    }

    /// Number of unmap flushes performed
    pub fn flush_count(&self) -> u64 {
        self.flush_count
    }

    /// Total bytes flushed across all unmaps
    pub fn flushed_bytes(&self) -> u64 {
        self.flushed_bytes
    }

    /// Read back a buffer's contents
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

impl Default for HeadlessBufferProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl BufferProvider for HeadlessBufferProvider {
    fn create(&mut self, size: usize, usage: StreamBufferUsage) -> Result<StreamBufferHandle> {
        let cap = match usage {
            StreamBufferUsage::Constant => self.limits.max_constant_buffer_size,
            StreamBufferUsage::Texture => self.limits.max_texture_buffer_size,
        };
        if size > cap {
            engine_bail!(CapacityExceeded, "pulsar3d::headless",
                "create: size {} exceeds {:?} limit {}", size, usage, cap);
        }
        self.bytes_allocated += size;
        Ok(self.buffers.insert(HeadlessBuffer {
            data: vec![0u8; size].into_boxed_slice(),
            usage,
            mapped: None,
        }))
    }

    fn destroy(&mut self, buffer: StreamBufferHandle) -> Result<()> {
        match self.buffers.get(buffer) {
            Some(b) if b.mapped.is_some() => {
                engine_bail!(InvalidResource, "pulsar3d::headless",
                    "destroy: buffer {:?} is still mapped", buffer);
            }
            Some(b) => {
                self.bytes_allocated -= b.data.len();
                self.buffers.remove(buffer);
                Ok(())
            }
            None => {
                engine_bail!(InvalidResource, "pulsar3d::headless",
                    "destroy: unknown buffer {:?}", buffer);
            }
        }
    }

    fn map(&mut self, buffer: StreamBufferHandle, offset: usize, len: usize) -> Result<NonNull<u8>> {
        let entry = match self.buffers.get_mut(buffer) {
            Some(entry) => entry,
            None => engine_bail!(InvalidResource, "pulsar3d::headless",
                "map: unknown buffer {:?}", buffer),
        };
        if entry.mapped.is_some() {
            engine_bail!(InvalidResource, "pulsar3d::headless",
                "map: buffer {:?} is already mapped", buffer);
        }
        if offset + len > entry.data.len() {
            engine_bail!(InvalidResource, "pulsar3d::headless",
                "map: range {}..{} exceeds capacity {}", offset, offset + len, entry.data.len());
        }
        entry.mapped = Some(offset..offset + len);
        // Stable heap block; only the Box value moves with the slot map.
        let ptr = unsafe { entry.data.as_mut_ptr().add(offset) };
        Ok(NonNull::new(ptr).unwrap())
    }

    fn unmap(&mut self, buffer: StreamBufferHandle, _mode: UnmapMode, flushed: Range<usize>) -> Result<()> {
        let entry = match self.buffers.get_mut(buffer) {
            Some(entry) => entry,
            None => engine_bail!(InvalidResource, "pulsar3d::headless",
                "unmap: unknown buffer {:?}", buffer),
        };
        let mapped = match entry.mapped.take() {
            Some(mapped) => mapped,
            None => engine_bail!(InvalidResource, "pulsar3d::headless",
                "unmap: buffer {:?} is not mapped", buffer),
        };
        if flushed.end > mapped.end - mapped.start {
            engine_bail!(InvalidResource, "pulsar3d::headless",
                "unmap: flushed range {:?} exceeds mapped length {}",
                flushed, mapped.end - mapped.start);
        }
        self.flush_count += 1;
        self.flushed_bytes += (flushed.end - flushed.start) as u64;
        Ok(())
    }

    fn limits(&self) -> ProviderLimits {
        self.limits
    }
}
