use super::command::Command;
use super::error::GlError;
use super::handles::BufferHandle;

/// Executes commands forwarded by a [`Context`](super::Context).
///
/// The context validates calls and tracks bind state before forwarding, so a
/// backend may assume handles are live and draws are complete.
pub trait Backend {
    /// Applies one command.
    fn execute(&mut self, command: &Command) -> Result<(), GlError>;

    /// Reads back the full contents of a buffer.
    fn read_buffer(&mut self, buffer: BufferHandle) -> Result<Vec<u8>, GlError>;
}
