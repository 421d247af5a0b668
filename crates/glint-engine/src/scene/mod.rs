//! Scene setup: geometry, program, attributes, uniforms and render state
//! for one renderable configuration.
//!
//! Every preset goes through the same [`initialize`]; they differ only in
//! the [`SceneDesc`] they hand it.

mod desc;
mod init;

pub mod presets;

use thiserror::Error;

use crate::binding::BindError;
use crate::gl::{GlError, ShaderStage};

pub use desc::{AttributeDesc, CameraDesc, SceneDesc, TopologyMode};
pub use init::{initialize, Scene, SceneAttribute, SceneUniforms};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    #[error("scene has no vertex attributes")]
    NoAttributes,

    #[error("attribute `{name}` has {len} floats, not a multiple of {components}")]
    RaggedAttribute {
        name: String,
        len: usize,
        components: u32,
    },

    #[error("attribute `{name}` has {got} vertices but `{first}` has {expected}")]
    VertexCountMismatch {
        name: String,
        first: String,
        expected: u32,
        got: u32,
    },

    #[error("index {index} is out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u16, vertex_count: u32 },

    #[error("{stage} shader failed to compile:\n{log}")]
    Compile { stage: ShaderStage, log: String },

    #[error("program failed to link:\n{log}")]
    Link { log: String },

    #[error(transparent)]
    Bind(#[from] BindError),

    #[error(transparent)]
    Gl(#[from] GlError),
}
