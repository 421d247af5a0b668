use thiserror::Error;

use super::types::{BufferTarget, ShaderStage};

/// Errors raised by [`Context`](super::Context) operations.
///
/// These correspond to the GL error codes a WebGL context would record
/// (`INVALID_OPERATION`, `INVALID_VALUE`, context loss), surfaced as values.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GlError {
    #[error("rendering context unavailable: {0}")]
    ContextUnavailable(String),

    #[error("no buffer bound to {0:?}")]
    NoBufferBound(BufferTarget),

    #[error("unknown buffer object {0}")]
    UnknownBuffer(u32),

    #[error("buffer {buffer} was created for {created:?} and cannot be bound to {requested:?}")]
    TargetMismatch {
        buffer: u32,
        created: BufferTarget,
        requested: BufferTarget,
    },

    #[error("unknown shader object {0}")]
    UnknownShader(u32),

    #[error("unknown program object {0}")]
    UnknownProgram(u32),

    #[error("program {program} already has a {stage} shader attached")]
    StageAlreadyAttached { program: u32, stage: ShaderStage },

    #[error("no program in use")]
    NoProgram,

    #[error("program {0} is not linked")]
    ProgramNotLinked(u32),

    #[error("vertex attribute `{name}` (location {location}) is not enabled")]
    AttributeNotEnabled { name: String, location: u32 },

    #[error("vertex attribute location {0} is out of range")]
    AttributeOutOfRange(u32),

    #[error("vertex attribute component count {0} is outside 1..=4")]
    InvalidComponentCount(u32),

    #[error("uniform location belongs to program {location_program}, but program {current} is in use")]
    UniformProgramMismatch { location_program: u32, current: u32 },

    #[error("uniform `{name}` expects {expected} bytes, got {got}")]
    UniformSize {
        name: String,
        expected: u32,
        got: usize,
    },

    #[error("index range {offset}+{count}x{size} exceeds element buffer of {len} bytes")]
    IndexRange {
        offset: usize,
        count: usize,
        size: usize,
        len: usize,
    },

    #[error("vertex range {first}+{count} exceeds the {available} vertices the enabled attributes hold")]
    VertexRange { first: u32, count: u32, available: u64 },

    #[error("backend failure: {0}")]
    Backend(String),
}
