use std::collections::HashMap;

use super::backend::Backend;
use super::command::{Command, DrawCall};
use super::error::GlError;
use super::handles::BufferHandle;

/// Headless backend that records every command in order.
///
/// Buffer contents are kept so they can be read back. Useful for tests and
/// for running scenes without a surface.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    commands: Vec<Command>,
    buffers: HashMap<BufferHandle, Vec<u8>>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every command received so far.
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Drains the command log, leaving buffer contents intact.
    pub fn take_commands(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }

    /// Draw calls in submission order.
    pub fn draws(&self) -> impl Iterator<Item = &DrawCall> {
        self.commands.iter().filter_map(|c| match c {
            Command::Draw(call) => Some(call),
            _ => None,
        })
    }

    pub fn buffer_contents(&self, buffer: BufferHandle) -> Option<&[u8]> {
        self.buffers.get(&buffer).map(Vec::as_slice)
    }
}

impl Backend for RecordingBackend {
    fn execute(&mut self, command: &Command) -> Result<(), GlError> {
        match command {
            Command::BufferData { buffer, data, .. } => {
                self.buffers.insert(*buffer, data.clone());
            }
            Command::DeleteBuffer { buffer } => {
                self.buffers.remove(buffer);
            }
            Command::Draw(call) => {
                for attr in &call.attributes {
                    if !self.buffers.contains_key(&attr.pointer.buffer) {
                        return Err(GlError::UnknownBuffer(attr.pointer.buffer.id()));
                    }
                }
            }
            _ => {}
        }
        log::trace!("recorded {command:?}");
        self.commands.push(command.clone());
        Ok(())
    }

    fn read_buffer(&mut self, buffer: BufferHandle) -> Result<Vec<u8>, GlError> {
        self.buffers
            .get(&buffer)
            .cloned()
            .ok_or(GlError::UnknownBuffer(buffer.id()))
    }
}
