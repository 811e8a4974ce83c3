//! BufferProvider trait - the GPU buffer provider contract
//!
//! The streaming buffer manager is a pure client of this contract: it
//! creates buffers, maps byte ranges for writing, and unmaps them with a
//! flushed range. The provider owns the actual allocations.

use std::ops::Range;
use std::ptr::NonNull;

use slotmap::new_key_type;

use crate::error::Result;

new_key_type! {
    /// Handle to a GPU buffer created through a [`BufferProvider`].
    ///
    /// Stable for the lifetime of the buffer; commands reference buffers
    /// by this handle only.
    pub struct StreamBufferHandle;
}

/// Usage hint for a streaming buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamBufferUsage {
    /// Small fixed-layout constant buffer (tightly packed per-draw scalars)
    Constant,
    /// Larger variable-layout texture buffer (bulk structured data such as
    /// matrices)
    Texture,
}

/// What to do with the persistent mapping when a write region is released
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnmapMode {
    /// Keep the buffer persistently mapped; only the flushed range is made
    /// visible to the device. The common case for streaming writes.
    KeepPersistent,
    /// Tear the mapping down entirely (teardown / backend switch).
    UnmapAll,
}

/// Capability limits reported by a provider
#[derive(Debug, Clone, Copy)]
pub struct ProviderLimits {
    /// Largest constant buffer the device supports, in bytes
    pub max_constant_buffer_size: usize,
    /// Largest texture buffer the device supports, in bytes
    pub max_texture_buffer_size: usize,
    /// Required start alignment for texture buffer binds, in bytes.
    /// Always a power of two.
    pub texture_buffer_alignment: usize,
}

/// GPU buffer provider trait
///
/// Implemented by backend-specific providers (e.g.,
/// HeadlessBufferProvider). Mapping hands out a raw CPU-visible pointer;
/// the streaming buffer manager wraps all writes through it in
/// bounds-checked cursor methods and guarantees at most one mapped region
/// per buffer line.
pub trait BufferProvider {
    /// Create a buffer of `size` bytes
    fn create(&mut self, size: usize, usage: StreamBufferUsage) -> Result<StreamBufferHandle>;

    /// Destroy a buffer, releasing its memory
    ///
    /// The buffer must not be mapped.
    fn destroy(&mut self, buffer: StreamBufferHandle) -> Result<()>;

    /// Map `len` bytes starting at `offset` for CPU writing
    ///
    /// The returned pointer stays valid until the matching [`unmap`]
    /// (persistent mapping). A buffer can hold at most one mapped range at
    /// a time.
    ///
    /// [`unmap`]: BufferProvider::unmap
    fn map(&mut self, buffer: StreamBufferHandle, offset: usize, len: usize) -> Result<NonNull<u8>>;

    /// Release the mapped range of `buffer`
    ///
    /// # Arguments
    ///
    /// * `mode` - Keep the persistent mapping alive or tear it down
    /// * `flushed` - Byte range actually written, relative to the start of
    ///   the mapped range; only this range must be made device-visible
    fn unmap(&mut self, buffer: StreamBufferHandle, mode: UnmapMode, flushed: Range<usize>) -> Result<()>;

    /// Capability limits of the underlying device
    fn limits(&self) -> ProviderLimits;
}
