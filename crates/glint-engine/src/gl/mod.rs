//! WebGL-1-shaped rendering context over pluggable backends.
//!
//! [`Context`] is the state machine: it owns object tables and bind state
//! and forwards validated [`Command`]s to a [`Backend`]. Two backends exist:
//! [`WgpuBackend`] renders, [`RecordingBackend`] records for inspection.

mod backend;
mod command;
mod context;
mod error;
mod handles;
mod recording;
mod state;
mod types;
mod wgpu_backend;

pub mod compiler;
pub mod topology;

pub use backend::Backend;
pub use command::{AttribPointer, BoundAttribute, Command, DrawCall, DrawKind, StageSource, UniformData};
pub use context::Context;
pub use error::GlError;
pub use handles::{AttribLocation, BufferHandle, ProgramHandle, ShaderHandle, UniformLocation};
pub use recording::RecordingBackend;
pub use state::{MAX_VERTEX_ATTRIBS, RenderState, VertexAttrib};
pub use types::{
    BufferTarget, BufferUsage, Capability, ClearMask, IndexType, ShaderStage, Topology,
    UniformSlot, UniformValue, ViewportRect,
};
pub use wgpu_backend::WgpuBackend;
