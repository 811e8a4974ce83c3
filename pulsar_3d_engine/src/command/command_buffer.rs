//! CommandBuffer - append-only recording and sequential replay
//!
//! The buffer is a dense sequence of fixed-size command slots. Recording
//! returns a stable byte offset usable to re-locate and patch a command in
//! place (the open/patch/close pattern used by the streaming buffer
//! manager for deferred bind sizes).

use crate::error::Result;
use crate::backend::RenderBackend;
use crate::command::{Command, COMMAND_SLOT_SIZE};
use crate::command::dispatch::DISPATCH_TABLE;

/// Stable handle to a recorded command: its byte position in the buffer
///
/// Offsets remain valid until the buffer is cleared (by `execute` or
/// `clear`); looking up a stale offset yields `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandOffset(pub usize);

/// Append-only sequence of commands plus operations to record, locate,
/// patch, and execute them
///
/// One command buffer per backend; filled during a frame, consumed and
/// truncated to empty by execution, never persisted.
#[derive(Debug, Default)]
pub struct CommandBuffer {
    /// Dense command slots; logical length in bytes is always a multiple
    /// of [`COMMAND_SLOT_SIZE`]
    commands: Vec<Command>,
}

impl CommandBuffer {
    /// Create an empty command buffer
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
        }
    }

    /// Append one command slot, returning its stable offset
    ///
    /// The caller records a fully-formed command; fields that are only
    /// known later (e.g. a bind size) are recorded as placeholders and
    /// patched through [`command_at_mut`].
    ///
    /// [`command_at_mut`]: CommandBuffer::command_at_mut
    pub fn add(&mut self, command: Command) -> CommandOffset {
        let offset = CommandOffset(self.commands.len() * COMMAND_SLOT_SIZE);
        self.commands.push(command);
        offset
    }

    /// Look up a previously recorded command by offset
    ///
    /// Returns `None` if the offset is out of the buffer's current bounds
    /// (e.g. the buffer was cleared since) or does not sit on a slot
    /// boundary.
    pub fn command_at(&self, offset: CommandOffset) -> Option<&Command> {
        if offset.0 % COMMAND_SLOT_SIZE != 0 {
            return None;
        }
        self.commands.get(offset.0 / COMMAND_SLOT_SIZE)
    }

    /// Look up a previously recorded command by offset, for patching
    pub fn command_at_mut(&mut self, offset: CommandOffset) -> Option<&mut Command> {
        if offset.0 % COMMAND_SLOT_SIZE != 0 {
            return None;
        }
        self.commands.get_mut(offset.0 / COMMAND_SLOT_SIZE)
    }

    /// Execute every recorded command, in recording order, then clear
    ///
    /// Each command is dispatched to the handler for its tag. On success
    /// the buffer is emptied (storage retained for reuse). On failure the
    /// error propagates and the buffer is left intact.
    ///
    /// Execution is not reentrant: a handler cannot record into the buffer
    /// being executed (the exclusive borrow makes this unrepresentable).
    pub fn execute(&mut self, backend: &mut dyn RenderBackend) -> Result<()> {
        for command in &self.commands {
            DISPATCH_TABLE[command.command_type() as usize](command, backend)?;
        }
        self.commands.clear();
        Ok(())
    }

    /// Discard all recorded commands without executing them
    ///
    /// All-or-nothing; there is no partial cancel.
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Number of recorded commands
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Logical length in bytes (always a multiple of the slot size)
    pub fn len_bytes(&self) -> usize {
        self.commands.len() * COMMAND_SLOT_SIZE
    }

    /// Whether no commands are recorded
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "command_buffer_tests.rs"]
mod tests;
