//! StreamSegment - one physical GPU buffer within a buffer line
//!
//! A segment pairs the provider handle with its capacity and the
//! multi-buffering generation marker. The generation cycles so the CPU
//! only reuses a segment's memory once the backend is known to have
//! finished consuming the previous generation's contents.

use crate::backend::{StreamBufferHandle, StreamBufferUsage};

/// Number of multi-buffering generations a segment cycles through
pub const STREAM_GENERATION_COUNT: u32 = 3;

/// One physical GPU buffer within a buffer line
#[derive(Debug)]
pub struct StreamSegment {
    handle: StreamBufferHandle,
    capacity_bytes: usize,
    usage: StreamBufferUsage,
    generation: u32,
}

impl StreamSegment {
    pub(crate) fn new(handle: StreamBufferHandle, capacity_bytes: usize, usage: StreamBufferUsage) -> Self {
        Self {
            handle,
            capacity_bytes,
            usage,
            generation: 0,
        }
    }

    /// Provider handle of the underlying GPU buffer
    pub fn handle(&self) -> StreamBufferHandle {
        self.handle
    }

    /// Total byte capacity
    pub fn capacity_bytes(&self) -> usize {
        self.capacity_bytes
    }

    /// Usage the segment was created with
    pub fn usage(&self) -> StreamBufferUsage {
        self.usage
    }

    /// Current multi-buffering generation
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Signal that the backend may now read the region just released; the
    /// next CPU write must target the next generation.
    pub fn advance_generation(&mut self) {
        self.generation = (self.generation + 1) % STREAM_GENERATION_COUNT;
    }

    /// Mirror of [`advance_generation`], used when an execution is rolled
    /// back without having consumed the frame.
    ///
    /// [`advance_generation`]: StreamSegment::advance_generation
    pub fn regress_generation(&mut self) {
        self.generation = (self.generation + STREAM_GENERATION_COUNT - 1) % STREAM_GENERATION_COUNT;
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "segment_tests.rs"]
mod tests;
