use super::compiler::UniformInfo;
use super::handles::{BufferHandle, ProgramHandle};
use super::types::{
    BufferTarget, BufferUsage, Capability, ClearMask, IndexType, Topology, UniformSlot,
    UniformValue, ViewportRect,
};

/// Layout captured by `vertex_attrib_pointer`.
///
/// `buffer` is whatever was bound to ARRAY at the time of the call.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct AttribPointer {
    pub buffer: BufferHandle,
    pub components: u32,
    /// Bytes between consecutive vertices; `0` means tightly packed.
    pub stride: u32,
    /// Byte offset of the first component.
    pub offset: u32,
}

impl AttribPointer {
    /// Stride with the tightly-packed default resolved.
    #[inline]
    pub fn effective_stride(&self) -> u32 {
        if self.stride == 0 {
            self.components * 4
        } else {
            self.stride
        }
    }
}

/// Shader text plus entry point handed to the backend on a successful link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageSource {
    pub source: String,
    pub entry_point: String,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DrawKind {
    Arrays {
        first: u32,
        count: u32,
    },
    Elements {
        buffer: BufferHandle,
        count: u32,
        index_type: IndexType,
        /// Byte offset into the element buffer.
        offset: u32,
    },
}

/// Attribute feeding a draw.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct BoundAttribute {
    pub location: u32,
    pub pointer: AttribPointer,
}

/// Bytes of one uniform slot at draw time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformData {
    pub slot: UniformSlot,
    pub bytes: Vec<u8>,
}

/// Snapshot of everything a draw depends on.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall {
    pub topology: Topology,
    pub kind: DrawKind,
    pub program: ProgramHandle,
    /// Sorted by location.
    pub attributes: Vec<BoundAttribute>,
    /// Sorted by slot.
    pub uniforms: Vec<UniformData>,
    pub depth_test: bool,
    pub viewport: ViewportRect,
}

impl DrawCall {
    /// Number of vertices or indices consumed.
    pub fn count(&self) -> u32 {
        match self.kind {
            DrawKind::Arrays { count, .. } => count,
            DrawKind::Elements { count, .. } => count,
        }
    }
}

/// A state change or GPU operation forwarded from [`Context`](super::Context) to a backend.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    BindBuffer {
        target: BufferTarget,
        buffer: Option<BufferHandle>,
    },
    BufferData {
        buffer: BufferHandle,
        target: BufferTarget,
        data: Vec<u8>,
        usage: BufferUsage,
    },
    DeleteBuffer {
        buffer: BufferHandle,
    },
    /// Emitted only for links that succeeded.
    LinkProgram {
        program: ProgramHandle,
        vertex: StageSource,
        fragment: StageSource,
        uniforms: Vec<UniformInfo>,
    },
    UseProgram {
        program: Option<ProgramHandle>,
    },
    DeleteProgram {
        program: ProgramHandle,
    },
    VertexAttribPointer {
        location: u32,
        pointer: AttribPointer,
    },
    EnableVertexAttribArray {
        location: u32,
    },
    DisableVertexAttribArray {
        location: u32,
    },
    Uniform {
        program: ProgramHandle,
        slot: UniformSlot,
        value: UniformValue,
    },
    ClearColor([f32; 4]),
    Enable(Capability),
    Disable(Capability),
    Viewport(ViewportRect),
    Clear {
        mask: ClearMask,
        color: [f32; 4],
    },
    Draw(DrawCall),
}
